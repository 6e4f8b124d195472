use foodgram::domain::repository::RecipeRepository;
use foodgram::domain::types::{IngredientAmount, RecipeFilter};
use foodgram::error::FoodgramError;
use foodgram::usecase::recipe::{
    CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeUseCase, ListRecipesUseCase, RecipeInput,
    UpdateRecipeUseCase,
};
use foodgram_domain::pagination::PageRequest;

use crate::helpers::{MemStore, MockMedia, PNG_DATA_URI};

fn amount(ingredient_id: i32, amount: i32) -> IngredientAmount {
    IngredientAmount {
        ingredient_id,
        amount,
    }
}

fn soup(ingredient_id: i32, tag_id: i32) -> RecipeInput {
    RecipeInput {
        name: Some("Борщ".into()),
        text: Some("Варить два часа".into()),
        image: Some(PNG_DATA_URI.into()),
        cooking_time: Some(120),
        ingredients: Some(vec![amount(ingredient_id, 300)]),
        tags: Some(vec![tag_id]),
    }
}

fn fields(err: FoodgramError) -> foodgram_core::error::FieldErrors {
    match err {
        FoodgramError::Validation(fields) => fields,
        other => panic!("expected validation error, got {other:?}"),
    }
}

type Create = CreateRecipeUseCase<MemStore, MemStore, MemStore, MemStore, MemStore, MemStore, MockMedia>;
type Update = UpdateRecipeUseCase<MemStore, MemStore, MemStore, MemStore, MemStore, MemStore, MockMedia>;

fn create_usecase(store: &MemStore, media: &MockMedia) -> Create {
    CreateRecipeUseCase {
        reader: store.reader(),
        ingredients: store.clone(),
        tags: store.clone(),
        media: media.clone(),
    }
}

fn update_usecase(store: &MemStore, media: &MockMedia) -> Update {
    UpdateRecipeUseCase {
        reader: store.reader(),
        ingredients: store.clone(),
        tags: store.clone(),
        media: media.clone(),
    }
}

// ── CreateRecipe ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_recipe_with_links_and_stored_image() {
    let store = MemStore::new();
    let author = store.seed_user("chef");
    let beet = store.seed_ingredient("свёкла", "г");
    let lunch = store.seed_tag("lunch");
    let media = MockMedia::default();

    let view = create_usecase(&store, &media)
        .execute(author.id, soup(beet.id, lunch.id))
        .await
        .unwrap();

    assert_eq!(view.recipe.author_id, author.id);
    assert!(view.recipe.image.starts_with("recipes/images/"));
    assert_eq!(view.ingredients.len(), 1);
    assert_eq!(view.ingredients[0].amount, 300);
    assert_eq!(view.tags, vec![lunch]);
    assert_eq!(view.author.user.id, author.id);
    assert!(!view.is_favorited);
    assert!(!view.is_in_shopping_cart);
}

#[tokio::test]
async fn should_require_every_field_on_create() {
    let store = MemStore::new();
    let author = store.seed_user("chef");
    let media = MockMedia::default();

    let err = create_usecase(&store, &media)
        .execute(author.id, RecipeInput::default())
        .await
        .unwrap_err();

    let fields = fields(err);
    for field in ["name", "text", "image", "cooking_time", "ingredients"] {
        assert!(fields.get(field).is_some(), "missing error for {field}");
    }
    assert!(media.saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_duplicate_unknown_and_out_of_range_ingredients() {
    let store = MemStore::new();
    let author = store.seed_user("chef");
    let salt = store.seed_ingredient("соль", "г");
    let tag = store.seed_tag("lunch");
    let media = MockMedia::default();
    let mut input = soup(salt.id, tag.id);
    input.ingredients = Some(vec![
        amount(salt.id, 1),
        amount(salt.id, 2),
        amount(9999, 5),
        amount(salt.id, 0),
    ]);
    input.cooking_time = Some(32_001);
    input.tags = Some(vec![tag.id, tag.id, 777]);

    let fields = fields(
        create_usecase(&store, &media)
            .execute(author.id, input)
            .await
            .unwrap_err(),
    );

    let ingredient_errors = fields.get("ingredients").unwrap();
    assert!(ingredient_errors.iter().any(|m| m.contains("more than once")));
    assert!(ingredient_errors.iter().any(|m| m.contains("9999 does not exist")));
    assert!(ingredient_errors.iter().any(|m| m.contains("between 1 and 32000")));
    assert!(fields.get("cooking_time").is_some());
    assert_eq!(fields.get("tags").unwrap().len(), 2);
    assert!(store.with(|t| t.recipes.is_empty()));
}

#[tokio::test]
async fn should_remove_saved_image_when_write_fails() {
    let store = MemStore::new();
    let author = store.seed_user("chef");
    let beet = store.seed_ingredient("свёкла", "г");
    let lunch = store.seed_tag("lunch");
    store.with(|t| t.fail_recipe_writes = true);
    let media = MockMedia::default();

    let err = create_usecase(&store, &media)
        .execute(author.id, soup(beet.id, lunch.id))
        .await
        .unwrap_err();

    assert!(matches!(err, FoodgramError::Internal(_)));
    let saved = media.saved.lock().unwrap().clone();
    assert_eq!(saved.len(), 1);
    assert_eq!(*media.removed.lock().unwrap(), saved);
}

// ── UpdateRecipe ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_forbid_updates_by_non_author() {
    let store = MemStore::new();
    let author = store.seed_user("chef");
    let stranger = store.seed_user("stranger");
    let salt = store.seed_ingredient("соль", "г");
    let recipe = store.seed_recipe(author.id, "Суп", &[(salt.id, 5)], &[]);
    let media = MockMedia::default();

    let err = update_usecase(&store, &media)
        .execute(
            stranger.id,
            recipe.id,
            RecipeInput {
                name: Some("Чужой суп".into()),
                ingredients: Some(vec![amount(salt.id, 5)]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FoodgramError::Forbidden));
    assert_eq!(store.with(|t| t.recipes[0].name.clone()), "Суп");
}

#[tokio::test]
async fn should_return_not_found_before_checking_author() {
    let store = MemStore::new();
    let user = store.seed_user("chef");
    let media = MockMedia::default();

    let err = update_usecase(&store, &media)
        .execute(user.id, 12345, RecipeInput::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FoodgramError::RecipeNotFound));
}

#[tokio::test]
async fn should_require_ingredients_on_update() {
    let store = MemStore::new();
    let author = store.seed_user("chef");
    let salt = store.seed_ingredient("соль", "г");
    let recipe = store.seed_recipe(author.id, "Суп", &[(salt.id, 5)], &[]);
    let media = MockMedia::default();

    let err = update_usecase(&store, &media)
        .execute(
            author.id,
            recipe.id,
            RecipeInput {
                name: Some("Новый суп".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(fields(err).get("ingredients").is_some());
}

#[tokio::test]
async fn should_replace_ingredients_keep_tags_and_swap_image() {
    let store = MemStore::new();
    let author = store.seed_user("chef");
    let salt = store.seed_ingredient("соль", "г");
    let pepper = store.seed_ingredient("перец", "г");
    let lunch = store.seed_tag("lunch");
    let recipe = store.seed_recipe(author.id, "Суп", &[(salt.id, 5)], &[lunch.id]);
    let media = MockMedia::default();

    let view = update_usecase(&store, &media)
        .execute(
            author.id,
            recipe.id,
            RecipeInput {
                image: Some(PNG_DATA_URI.into()),
                ingredients: Some(vec![amount(pepper.id, 2)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(view.recipe.name, "Суп");
    assert_eq!(view.ingredients.len(), 1);
    assert_eq!(view.ingredients[0].ingredient.id, pepper.id);
    assert_eq!(view.tags, vec![lunch]);
    assert_ne!(view.recipe.image, recipe.image);
    assert_eq!(*media.removed.lock().unwrap(), vec![recipe.image]);
}

// ── Get / List / Delete ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_filter_by_tags_author_and_viewer_flags() {
    let store = MemStore::new();
    let alice = store.seed_user("alice");
    let bob = store.seed_user("bob");
    let lunch = store.seed_tag("lunch");
    let dinner = store.seed_tag("dinner");
    let soup = store.seed_recipe(alice.id, "soup", &[], &[lunch.id]);
    let steak = store.seed_recipe(bob.id, "steak", &[], &[dinner.id]);
    let cake = store.seed_recipe(bob.id, "cake", &[], &[]);
    store.with(|t| t.favorites.push((alice.id, steak.id)));
    let usecase = ListRecipesUseCase {
        reader: store.reader(),
    };
    let page = PageRequest::default();

    let (all, count) = usecase
        .execute(None, RecipeFilter::default(), page)
        .await
        .unwrap();
    assert_eq!(count, 3);
    let ids: Vec<i32> = all.iter().map(|v| v.recipe.id).collect();
    assert_eq!(ids, vec![cake.id, steak.id, soup.id]);

    let (tagged, _) = usecase
        .execute(
            None,
            RecipeFilter {
                tags: vec!["LUNCH".into(), "dinner".into()],
                ..Default::default()
            },
            page,
        )
        .await
        .unwrap();
    assert_eq!(tagged.len(), 2);

    let (by_bob, _) = usecase
        .execute(
            None,
            RecipeFilter {
                author: Some(bob.id),
                ..Default::default()
            },
            page,
        )
        .await
        .unwrap();
    assert!(by_bob.iter().all(|v| v.recipe.author_id == bob.id));

    let favorites_only = RecipeFilter {
        is_favorited: true,
        ..Default::default()
    };
    let (mine, _) = usecase
        .execute(Some(alice.id), favorites_only.clone(), page)
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert!(mine[0].is_favorited);

    // Anonymous viewers get the flag ignored.
    let (anon, _) = usecase.execute(None, favorites_only, page).await.unwrap();
    assert_eq!(anon.len(), 3);
}

#[tokio::test]
async fn should_show_viewer_flags_on_single_recipe() {
    let store = MemStore::new();
    let author = store.seed_user("chef");
    let fan = store.seed_user("fan");
    let recipe = store.seed_recipe(author.id, "pie", &[], &[]);
    store.with(|t| {
        t.cart.push((fan.id, recipe.id));
        t.subscriptions.push((fan.id, author.id));
    });

    let view = GetRecipeUseCase {
        reader: store.reader(),
    }
    .execute(Some(fan.id), recipe.id)
    .await
    .unwrap();

    assert!(view.is_in_shopping_cart);
    assert!(!view.is_favorited);
    assert!(view.author.is_subscribed);
}

#[tokio::test]
async fn should_delete_recipe_and_cascade_links() {
    let store = MemStore::new();
    let author = store.seed_user("chef");
    let salt = store.seed_ingredient("соль", "г");
    let tag = store.seed_tag("lunch");
    let recipe = store.seed_recipe(author.id, "pie", &[(salt.id, 1)], &[tag.id]);
    store.with(|t| {
        t.favorites.push((author.id, recipe.id));
        t.cart.push((author.id, recipe.id));
        t.links.push((recipe.id, "abc123".into()));
    });
    let media = MockMedia::default();

    DeleteRecipeUseCase {
        repo: store.clone(),
        media: media.clone(),
    }
    .execute(author.id, recipe.id)
    .await
    .unwrap();

    store.with(|t| {
        assert!(t.recipes.is_empty());
        assert!(t.recipe_ingredients.is_empty());
        assert!(t.recipe_tags.is_empty());
        assert!(t.favorites.is_empty());
        assert!(t.cart.is_empty());
        assert!(t.links.is_empty());
    });
    assert_eq!(*media.removed.lock().unwrap(), vec![recipe.image]);
    assert!(
        RecipeRepository::find_by_id(&store, recipe.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn should_forbid_delete_by_non_author() {
    let store = MemStore::new();
    let author = store.seed_user("chef");
    let other = store.seed_user("other");
    let recipe = store.seed_recipe(author.id, "pie", &[], &[]);

    let err = DeleteRecipeUseCase {
        repo: store.clone(),
        media: MockMedia::default(),
    }
    .execute(other.id, recipe.id)
    .await
    .unwrap_err();

    assert!(matches!(err, FoodgramError::Forbidden));
    assert_eq!(store.with(|t| t.recipes.len()), 1);
}
