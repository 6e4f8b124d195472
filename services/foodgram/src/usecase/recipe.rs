use std::collections::HashSet;

use foodgram_core::error::FieldErrors;
use foodgram_domain::image::DecodedImage;
use foodgram_domain::pagination::PageRequest;

use crate::domain::repository::{
    IngredientRepository, MediaFolder, MediaStore, RecipeListRepository, RecipeRepository,
    SubscriptionRepository, TagRepository, UserRepository,
};
use crate::domain::types::{
    IngredientAmount, MAX_RECIPE_NAME_LEN, MAX_SMALL_AMOUNT, NewRecipe, Recipe, RecipeChanges,
    RecipeFilter,
};
use crate::error::FoodgramError;
use crate::usecase::view::{RecipeReader, RecipeView};

const REQUIRED: &str = "this field is required";

/// Raw recipe fields as sent by the client. Every field is optional here;
/// which ones are required depends on the operation.
#[derive(Debug, Clone, Default)]
pub struct RecipeInput {
    pub name: Option<String>,
    pub text: Option<String>,
    /// `data:image/...;base64,...` URI.
    pub image: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub tags: Option<Vec<i32>>,
}

struct ValidatedRecipe {
    name: Option<String>,
    text: Option<String>,
    image: Option<DecodedImage>,
    cooking_time: Option<i32>,
    ingredients: Vec<IngredientAmount>,
    tag_ids: Option<Vec<i32>>,
}

fn in_amount_range(value: i32) -> bool {
    (1..=MAX_SMALL_AMOUNT).contains(&value)
}

/// Check every field, collecting all problems before failing.
/// `creating` makes name, text, image and cooking time mandatory.
async fn validate_recipe<I, T>(
    ingredients_repo: &I,
    tags_repo: &T,
    input: RecipeInput,
    creating: bool,
) -> Result<ValidatedRecipe, FoodgramError>
where
    I: IngredientRepository,
    T: TagRepository,
{
    let mut errors = FieldErrors::new();

    let name = input.name.map(|n| n.trim().to_owned());
    match &name {
        None if creating => errors.add("name", REQUIRED),
        Some(n) if n.is_empty() => errors.add("name", "this field may not be blank"),
        Some(n) if n.chars().count() > MAX_RECIPE_NAME_LEN => {
            errors.add("name", "ensure this field has no more than 256 characters")
        }
        _ => {}
    }

    let text = input.text.map(|t| t.trim().to_owned());
    match &text {
        None if creating => errors.add("text", REQUIRED),
        Some(t) if t.is_empty() => errors.add("text", "this field may not be blank"),
        _ => {}
    }

    match input.cooking_time {
        None if creating => errors.add("cooking_time", REQUIRED),
        Some(t) if !in_amount_range(t) => {
            errors.add("cooking_time", "must be between 1 and 32000")
        }
        _ => {}
    }

    let image = match input.image.as_deref() {
        Some(uri) => match uri.parse::<DecodedImage>() {
            Ok(image) => Some(image),
            Err(e) => {
                errors.add("image", e.to_string());
                None
            }
        },
        None => {
            if creating {
                errors.add("image", REQUIRED);
            }
            None
        }
    };

    let ingredients = input.ingredients.unwrap_or_default();
    if ingredients.is_empty() {
        errors.add("ingredients", "at least one ingredient is required");
    } else {
        let mut seen = HashSet::new();
        for item in &ingredients {
            if !seen.insert(item.ingredient_id) {
                errors.add(
                    "ingredients",
                    format!("ingredient {} is listed more than once", item.ingredient_id),
                );
            }
            if !in_amount_range(item.amount) {
                errors.add(
                    "ingredients",
                    format!(
                        "amount of ingredient {} must be between 1 and 32000",
                        item.ingredient_id
                    ),
                );
            }
        }
        let ids: Vec<i32> = seen.into_iter().collect();
        let known: HashSet<i32> = ingredients_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|i| i.id)
            .collect();
        let mut unknown: Vec<i32> = ids.into_iter().filter(|id| !known.contains(id)).collect();
        unknown.sort_unstable();
        for id in unknown {
            errors.add("ingredients", format!("ingredient {id} does not exist"));
        }
    }

    if let Some(tag_ids) = &input.tags {
        let mut seen = HashSet::new();
        for id in tag_ids {
            if !seen.insert(*id) {
                errors.add("tags", format!("tag {id} is listed more than once"));
            }
        }
        if !seen.is_empty() {
            let ids: Vec<i32> = seen.into_iter().collect();
            let known: HashSet<i32> = tags_repo
                .find_by_ids(&ids)
                .await?
                .into_iter()
                .map(|t| t.id)
                .collect();
            let mut unknown: Vec<i32> =
                ids.into_iter().filter(|id| !known.contains(id)).collect();
            unknown.sort_unstable();
            for id in unknown {
                errors.add("tags", format!("tag {id} does not exist"));
            }
        }
    }

    errors.into_result()?;
    Ok(ValidatedRecipe {
        name,
        text,
        image,
        cooking_time: input.cooking_time,
        ingredients,
        tag_ids: input.tags,
    })
}

/// Only the author may modify a recipe.
fn ensure_author(recipe: &Recipe, user_id: i32) -> Result<(), FoodgramError> {
    if recipe.author_id != user_id {
        return Err(FoodgramError::Forbidden);
    }
    Ok(())
}

// ── ListRecipes ──────────────────────────────────────────────────────────────

pub struct ListRecipesUseCase<R, U, L, S>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
{
    pub reader: RecipeReader<R, U, L, S>,
}

impl<R, U, L, S> ListRecipesUseCase<R, U, L, S>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
{
    pub async fn execute(
        &self,
        viewer: Option<i32>,
        filter: RecipeFilter,
        page: PageRequest,
    ) -> Result<(Vec<RecipeView>, u64), FoodgramError> {
        let scope = filter.scope(viewer);
        let (rows, count) = self.reader.recipes.list(&scope, page.clamped()).await?;
        let views = self.reader.views(viewer, rows).await?;
        Ok((views, count))
    }
}

// ── GetRecipe ────────────────────────────────────────────────────────────────

pub struct GetRecipeUseCase<R, U, L, S>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
{
    pub reader: RecipeReader<R, U, L, S>,
}

impl<R, U, L, S> GetRecipeUseCase<R, U, L, S>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
{
    pub async fn execute(
        &self,
        viewer: Option<i32>,
        recipe_id: i32,
    ) -> Result<RecipeView, FoodgramError> {
        let recipe = self
            .reader
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(FoodgramError::RecipeNotFound)?;
        self.reader.view(viewer, recipe).await
    }
}

// ── CreateRecipe ─────────────────────────────────────────────────────────────

pub struct CreateRecipeUseCase<R, U, L, S, I, T, M>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
    I: IngredientRepository,
    T: TagRepository,
    M: MediaStore,
{
    pub reader: RecipeReader<R, U, L, S>,
    pub ingredients: I,
    pub tags: T,
    pub media: M,
}

impl<R, U, L, S, I, T, M> CreateRecipeUseCase<R, U, L, S, I, T, M>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
    I: IngredientRepository,
    T: TagRepository,
    M: MediaStore,
{
    pub async fn execute(
        &self,
        author_id: i32,
        input: RecipeInput,
    ) -> Result<RecipeView, FoodgramError> {
        let valid = validate_recipe(&self.ingredients, &self.tags, input, true).await?;
        let (Some(name), Some(text), Some(image), Some(cooking_time)) =
            (valid.name, valid.text, valid.image, valid.cooking_time)
        else {
            return Err(anyhow::anyhow!("validated recipe is missing a required field").into());
        };

        let image = self.media.save(MediaFolder::RecipeImages, &image).await?;
        let new_recipe = NewRecipe {
            name,
            text,
            image,
            cooking_time,
            ingredients: valid.ingredients,
            tag_ids: valid.tag_ids.unwrap_or_default(),
        };
        let recipe = match self.reader.recipes.create(author_id, &new_recipe).await {
            Ok(recipe) => recipe,
            Err(e) => {
                self.media.remove(&new_recipe.image).await;
                return Err(e);
            }
        };
        tracing::info!(recipe_id = recipe.id, author_id, "recipe created");
        self.reader.view(Some(author_id), recipe).await
    }
}

// ── UpdateRecipe ─────────────────────────────────────────────────────────────

pub struct UpdateRecipeUseCase<R, U, L, S, I, T, M>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
    I: IngredientRepository,
    T: TagRepository,
    M: MediaStore,
{
    pub reader: RecipeReader<R, U, L, S>,
    pub ingredients: I,
    pub tags: T,
    pub media: M,
}

impl<R, U, L, S, I, T, M> UpdateRecipeUseCase<R, U, L, S, I, T, M>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RecipeListRepository,
    S: SubscriptionRepository,
    I: IngredientRepository,
    T: TagRepository,
    M: MediaStore,
{
    pub async fn execute(
        &self,
        user_id: i32,
        recipe_id: i32,
        input: RecipeInput,
    ) -> Result<RecipeView, FoodgramError> {
        let existing = self
            .reader
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(FoodgramError::RecipeNotFound)?;
        ensure_author(&existing, user_id)?;

        let valid = validate_recipe(&self.ingredients, &self.tags, input, false).await?;
        let new_image = match &valid.image {
            Some(image) => Some(self.media.save(MediaFolder::RecipeImages, image).await?),
            None => None,
        };
        let changes = RecipeChanges {
            name: valid.name,
            text: valid.text,
            image: new_image,
            cooking_time: valid.cooking_time,
            ingredients: valid.ingredients,
            tag_ids: valid.tag_ids,
        };
        let recipe = match self.reader.recipes.update(recipe_id, &changes).await {
            Ok(recipe) => recipe,
            Err(e) => {
                if let Some(path) = &changes.image {
                    self.media.remove(path).await;
                }
                return Err(e);
            }
        };
        if changes.image.is_some() {
            self.media.remove(&existing.image).await;
        }
        self.reader.view(Some(user_id), recipe).await
    }
}

// ── DeleteRecipe ─────────────────────────────────────────────────────────────

pub struct DeleteRecipeUseCase<R: RecipeRepository, M: MediaStore> {
    pub repo: R,
    pub media: M,
}

impl<R: RecipeRepository, M: MediaStore> DeleteRecipeUseCase<R, M> {
    pub async fn execute(&self, user_id: i32, recipe_id: i32) -> Result<(), FoodgramError> {
        let recipe = self
            .repo
            .find_by_id(recipe_id)
            .await?
            .ok_or(FoodgramError::RecipeNotFound)?;
        ensure_author(&recipe, user_id)?;
        if !self.repo.delete(recipe_id).await? {
            return Err(FoodgramError::RecipeNotFound);
        }
        self.media.remove(&recipe.image).await;
        tracing::info!(recipe_id, "recipe deleted");
        Ok(())
    }
}
