use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use foodgram::domain::repository::{
    AuthTokenRepository, IngredientRepository, MediaFolder, MediaStore, RecipeListRepository,
    RecipeRepository, ShortIdSource, ShortLinkRepository, SubscriptionRepository, TagRepository,
    UserRepository,
};
use foodgram::domain::types::{
    CartLine, Ingredient, IngredientAmount, NewIngredient, NewRecipe, NewTag, NewUser, Recipe,
    RecipeChanges, RecipeIngredient, RecipeList, RecipeScope, Tag, User,
};
use foodgram::error::FoodgramError;
use foodgram::usecase::view::RecipeReader;
use foodgram_domain::image::DecodedImage;
use foodgram_domain::pagination::PageRequest;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// 1x1 transparent PNG as a data URI.
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

// ── MemStore ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Tables {
    pub users: Vec<User>,
    pub tokens: Vec<(Uuid, i32)>,
    pub ingredients: Vec<Ingredient>,
    pub tags: Vec<Tag>,
    pub recipes: Vec<Recipe>,
    /// `(row id, recipe id, amount)`
    pub recipe_ingredients: Vec<(i32, i32, IngredientAmount)>,
    pub recipe_tags: Vec<(i32, i32)>,
    pub favorites: Vec<(i32, i32)>,
    pub cart: Vec<(i32, i32)>,
    /// `(user, author)` in insertion order.
    pub subscriptions: Vec<(i32, i32)>,
    pub links: Vec<(i32, String)>,
    next_id: i32,
    /// Makes the next recipe write fail, to exercise cleanup paths.
    pub fail_recipe_writes: bool,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn list_mut(&mut self, list: RecipeList) -> &mut Vec<(i32, i32)> {
        match list {
            RecipeList::Favorites => &mut self.favorites,
            RecipeList::ShoppingCart => &mut self.cart,
        }
    }

    fn link_recipe(&mut self, recipe_id: i32, ingredients: &[IngredientAmount], tags: &[i32]) {
        self.recipe_ingredients.retain(|(_, r, _)| *r != recipe_id);
        for item in ingredients {
            let row = self.next_id();
            self.recipe_ingredients.push((row, recipe_id, *item));
        }
        self.recipe_tags.retain(|(r, _)| *r != recipe_id);
        for tag in tags {
            self.recipe_tags.push((recipe_id, *tag));
        }
    }
}

/// Shared in-memory backing for every repository trait.
#[derive(Clone, Default)]
pub struct MemStore {
    pub tables: Arc<Mutex<Tables>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        f(&mut self.tables.lock().unwrap())
    }

    pub fn reader(&self) -> RecipeReader<MemStore, MemStore, MemStore, MemStore> {
        RecipeReader {
            recipes: self.clone(),
            users: self.clone(),
            lists: self.clone(),
            subscriptions: self.clone(),
        }
    }

    pub fn seed_user(&self, username: &str) -> User {
        self.with(|t| {
            let id = t.next_id();
            let user = User {
                id,
                email: format!("{username}@example.com"),
                username: username.to_owned(),
                first_name: "Test".to_owned(),
                last_name: "User".to_owned(),
                password_hash: String::new(),
                avatar: None,
                created_at: epoch(),
            };
            t.users.push(user.clone());
            user
        })
    }

    pub fn seed_ingredient(&self, name: &str, unit: &str) -> Ingredient {
        self.with(|t| {
            let ingredient = Ingredient {
                id: t.next_id(),
                name: name.to_owned(),
                measurement_unit: unit.to_owned(),
            };
            t.ingredients.push(ingredient.clone());
            ingredient
        })
    }

    pub fn seed_tag(&self, slug: &str) -> Tag {
        self.with(|t| {
            let tag = Tag {
                id: t.next_id(),
                name: slug.to_uppercase(),
                color: "#000000".to_owned(),
                slug: slug.to_owned(),
            };
            t.tags.push(tag.clone());
            tag
        })
    }

    /// Recipe whose ingredient rows follow `ingredients` order.
    pub fn seed_recipe(
        &self,
        author_id: i32,
        name: &str,
        ingredients: &[(i32, i32)],
        tags: &[i32],
    ) -> Recipe {
        self.with(|t| {
            let id = t.next_id();
            let recipe = Recipe {
                id,
                author_id,
                name: name.to_owned(),
                text: format!("How to cook {name}"),
                image: format!("recipes/images/{id}.png"),
                cooking_time: 10,
                created_at: epoch() + Duration::seconds(i64::from(id)),
            };
            t.recipes.push(recipe.clone());
            let amounts: Vec<IngredientAmount> = ingredients
                .iter()
                .map(|(ingredient_id, amount)| IngredientAmount {
                    ingredient_id: *ingredient_id,
                    amount: *amount,
                })
                .collect();
            t.link_recipe(id, &amounts, tags);
            recipe
        })
    }
}

impl UserRepository for MemStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, FoodgramError> {
        Ok(self.with(|t| t.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, FoodgramError> {
        Ok(self.with(|t| t.users.iter().find(|u| u.email == email).cloned()))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, FoodgramError> {
        Ok(self.with(|t| {
            t.users
                .iter()
                .filter(|u| ids.contains(&u.id))
                .cloned()
                .collect()
        }))
    }

    async fn email_taken(&self, email: &str) -> Result<bool, FoodgramError> {
        Ok(self.with(|t| t.users.iter().any(|u| u.email.eq_ignore_ascii_case(email))))
    }

    async fn username_taken(&self, username: &str) -> Result<bool, FoodgramError> {
        Ok(self.with(|t| t.users.iter().any(|u| u.username == username)))
    }

    async fn create(&self, user: &NewUser) -> Result<User, FoodgramError> {
        Ok(self.with(|t| {
            let created = User {
                id: t.next_id(),
                email: user.email.clone(),
                username: user.username.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                password_hash: user.password_hash.clone(),
                avatar: None,
                created_at: epoch(),
            };
            t.users.push(created.clone());
            created
        }))
    }

    async fn list(&self, page: PageRequest) -> Result<(Vec<User>, u64), FoodgramError> {
        Ok(self.with(|t| {
            let mut users = t.users.clone();
            users.sort_by_key(|u| u.id);
            let count = users.len() as u64;
            let rows = users
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit as usize)
                .collect();
            (rows, count)
        }))
    }

    async fn set_avatar(&self, id: i32, avatar: Option<&str>) -> Result<(), FoodgramError> {
        self.with(|t| {
            if let Some(user) = t.users.iter_mut().find(|u| u.id == id) {
                user.avatar = avatar.map(str::to_owned);
            }
        });
        Ok(())
    }

    async fn set_password_hash(&self, id: i32, hash: &str) -> Result<(), FoodgramError> {
        self.with(|t| {
            if let Some(user) = t.users.iter_mut().find(|u| u.id == id) {
                user.password_hash = hash.to_owned();
            }
        });
        Ok(())
    }
}

impl AuthTokenRepository for MemStore {
    async fn create(&self, jti: Uuid, user_id: i32) -> Result<(), FoodgramError> {
        self.with(|t| t.tokens.push((jti, user_id)));
        Ok(())
    }

    async fn exists(&self, jti: Uuid) -> Result<bool, FoodgramError> {
        Ok(self.with(|t| t.tokens.iter().any(|(j, _)| *j == jti)))
    }

    async fn delete(&self, jti: Uuid) -> Result<bool, FoodgramError> {
        Ok(self.with(|t| {
            let before = t.tokens.len();
            t.tokens.retain(|(j, _)| *j != jti);
            t.tokens.len() != before
        }))
    }
}

impl IngredientRepository for MemStore {
    async fn search(&self, prefix: Option<&str>) -> Result<Vec<Ingredient>, FoodgramError> {
        let prefix = prefix.map(str::to_lowercase);
        Ok(self.with(|t| {
            let mut found: Vec<Ingredient> = t
                .ingredients
                .iter()
                .filter(|i| {
                    prefix
                        .as_deref()
                        .is_none_or(|p| i.name.to_lowercase().starts_with(p))
                })
                .cloned()
                .collect();
            found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            found
        }))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, FoodgramError> {
        Ok(self.with(|t| t.ingredients.iter().find(|i| i.id == id).cloned()))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Ingredient>, FoodgramError> {
        Ok(self.with(|t| {
            t.ingredients
                .iter()
                .filter(|i| ids.contains(&i.id))
                .cloned()
                .collect()
        }))
    }

    async fn insert_missing(&self, ingredients: &[NewIngredient]) -> Result<u64, FoodgramError> {
        Ok(self.with(|t| {
            let mut inserted = 0;
            for new in ingredients {
                let exists = t.ingredients.iter().any(|i| {
                    i.name == new.name && i.measurement_unit == new.measurement_unit
                });
                if !exists {
                    let id = t.next_id();
                    t.ingredients.push(Ingredient {
                        id,
                        name: new.name.clone(),
                        measurement_unit: new.measurement_unit.clone(),
                    });
                    inserted += 1;
                }
            }
            inserted
        }))
    }
}

impl TagRepository for MemStore {
    async fn list(&self) -> Result<Vec<Tag>, FoodgramError> {
        Ok(self.with(|t| t.tags.clone()))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, FoodgramError> {
        Ok(self.with(|t| t.tags.iter().find(|tag| tag.id == id).cloned()))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>, FoodgramError> {
        Ok(self.with(|t| {
            t.tags
                .iter()
                .filter(|tag| ids.contains(&tag.id))
                .cloned()
                .collect()
        }))
    }

    async fn insert_missing(&self, tags: &[NewTag]) -> Result<u64, FoodgramError> {
        Ok(self.with(|t| {
            let mut inserted = 0;
            for new in tags {
                if !t.tags.iter().any(|tag| tag.slug == new.slug || tag.name == new.name) {
                    let id = t.next_id();
                    t.tags.push(Tag {
                        id,
                        name: new.name.clone(),
                        color: new.color.clone(),
                        slug: new.slug.clone(),
                    });
                    inserted += 1;
                }
            }
            inserted
        }))
    }
}

fn matches_scope(t: &Tables, recipe: &Recipe, scope: &RecipeScope) -> bool {
    if scope.author.is_some_and(|a| a != recipe.author_id) {
        return false;
    }
    if !scope.tags.is_empty() {
        let tagged = t.recipe_tags.iter().any(|(r, tag_id)| {
            *r == recipe.id
                && t.tags
                    .iter()
                    .any(|tag| tag.id == *tag_id && scope.tags.contains(&tag.slug.to_lowercase()))
        });
        if !tagged {
            return false;
        }
    }
    if let Some(user) = scope.favorited_by {
        if !t.favorites.contains(&(user, recipe.id)) {
            return false;
        }
    }
    if let Some(user) = scope.in_cart_of {
        if !t.cart.contains(&(user, recipe.id)) {
            return false;
        }
    }
    true
}

fn newest_first(recipes: &mut [Recipe]) {
    recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

impl RecipeRepository for MemStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, FoodgramError> {
        Ok(self.with(|t| t.recipes.iter().find(|r| r.id == id).cloned()))
    }

    async fn list(
        &self,
        scope: &RecipeScope,
        page: PageRequest,
    ) -> Result<(Vec<Recipe>, u64), FoodgramError> {
        Ok(self.with(|t| {
            let mut rows: Vec<Recipe> = t
                .recipes
                .iter()
                .filter(|r| matches_scope(t, r, scope))
                .cloned()
                .collect();
            newest_first(&mut rows);
            let count = rows.len() as u64;
            let rows = rows
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit as usize)
                .collect();
            (rows, count)
        }))
    }

    async fn list_by_author(
        &self,
        author_id: i32,
        limit: Option<u64>,
    ) -> Result<Vec<Recipe>, FoodgramError> {
        Ok(self.with(|t| {
            let mut rows: Vec<Recipe> = t
                .recipes
                .iter()
                .filter(|r| r.author_id == author_id)
                .cloned()
                .collect();
            newest_first(&mut rows);
            if let Some(limit) = limit {
                rows.truncate(limit as usize);
            }
            rows
        }))
    }

    async fn count_by_author(&self, author_id: i32) -> Result<u64, FoodgramError> {
        Ok(self.with(|t| t.recipes.iter().filter(|r| r.author_id == author_id).count() as u64))
    }

    async fn ingredients_of(
        &self,
        recipe_ids: &[i32],
    ) -> Result<Vec<(i32, RecipeIngredient)>, FoodgramError> {
        Ok(self.with(|t| {
            let mut rows: Vec<&(i32, i32, IngredientAmount)> = t
                .recipe_ingredients
                .iter()
                .filter(|(_, r, _)| recipe_ids.contains(r))
                .collect();
            rows.sort_by_key(|(row, _, _)| *row);
            rows.into_iter()
                .filter_map(|(_, recipe_id, item)| {
                    let ingredient = t
                        .ingredients
                        .iter()
                        .find(|i| i.id == item.ingredient_id)?
                        .clone();
                    Some((
                        *recipe_id,
                        RecipeIngredient {
                            ingredient,
                            amount: item.amount,
                        },
                    ))
                })
                .collect()
        }))
    }

    async fn tags_of(&self, recipe_ids: &[i32]) -> Result<Vec<(i32, Tag)>, FoodgramError> {
        Ok(self.with(|t| {
            let mut rows: Vec<(i32, Tag)> = t
                .recipe_tags
                .iter()
                .filter(|(r, _)| recipe_ids.contains(r))
                .filter_map(|(r, tag_id)| {
                    let tag = t.tags.iter().find(|tag| tag.id == *tag_id)?.clone();
                    Some((*r, tag))
                })
                .collect();
            rows.sort_by_key(|(_, tag)| tag.id);
            rows
        }))
    }

    async fn create(&self, author_id: i32, recipe: &NewRecipe) -> Result<Recipe, FoodgramError> {
        self.with(|t| {
            if t.fail_recipe_writes {
                return Err(anyhow::anyhow!("recipe write failed").into());
            }
            let id = t.next_id();
            let created = Recipe {
                id,
                author_id,
                name: recipe.name.clone(),
                text: recipe.text.clone(),
                image: recipe.image.clone(),
                cooking_time: recipe.cooking_time,
                created_at: epoch() + Duration::seconds(i64::from(id)),
            };
            t.recipes.push(created.clone());
            t.link_recipe(id, &recipe.ingredients, &recipe.tag_ids);
            Ok(created)
        })
    }

    async fn update(&self, id: i32, changes: &RecipeChanges) -> Result<Recipe, FoodgramError> {
        self.with(|t| {
            if t.fail_recipe_writes {
                return Err(anyhow::anyhow!("recipe write failed").into());
            }
            let recipe = t
                .recipes
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(FoodgramError::RecipeNotFound)?;
            if let Some(name) = &changes.name {
                recipe.name = name.clone();
            }
            if let Some(text) = &changes.text {
                recipe.text = text.clone();
            }
            if let Some(image) = &changes.image {
                recipe.image = image.clone();
            }
            if let Some(cooking_time) = changes.cooking_time {
                recipe.cooking_time = cooking_time;
            }
            let updated = recipe.clone();
            t.recipe_ingredients.retain(|(_, r, _)| *r != id);
            for item in &changes.ingredients {
                let row = t.next_id();
                t.recipe_ingredients.push((row, id, *item));
            }
            if let Some(tag_ids) = &changes.tag_ids {
                t.recipe_tags.retain(|(r, _)| *r != id);
                t.recipe_tags.extend(tag_ids.iter().map(|tag| (id, *tag)));
            }
            Ok(updated)
        })
    }

    async fn delete(&self, id: i32) -> Result<bool, FoodgramError> {
        Ok(self.with(|t| {
            let before = t.recipes.len();
            t.recipes.retain(|r| r.id != id);
            if t.recipes.len() == before {
                return false;
            }
            t.recipe_ingredients.retain(|(_, r, _)| *r != id);
            t.recipe_tags.retain(|(r, _)| *r != id);
            t.favorites.retain(|(_, r)| *r != id);
            t.cart.retain(|(_, r)| *r != id);
            t.links.retain(|(r, _)| *r != id);
            true
        }))
    }
}

impl RecipeListRepository for MemStore {
    async fn add(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, FoodgramError> {
        Ok(self.with(|t| {
            let rows = t.list_mut(list);
            if rows.contains(&(user_id, recipe_id)) {
                return false;
            }
            rows.push((user_id, recipe_id));
            true
        }))
    }

    async fn remove(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, FoodgramError> {
        Ok(self.with(|t| {
            let rows = t.list_mut(list);
            let before = rows.len();
            rows.retain(|pair| *pair != (user_id, recipe_id));
            rows.len() != before
        }))
    }

    async fn marked(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_ids: &[i32],
    ) -> Result<Vec<i32>, FoodgramError> {
        Ok(self.with(|t| {
            t.list_mut(list)
                .iter()
                .filter(|(u, r)| *u == user_id && recipe_ids.contains(r))
                .map(|(_, r)| *r)
                .collect()
        }))
    }

    async fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLine>, FoodgramError> {
        Ok(self.with(|t| {
            let mut lines = Vec::new();
            for (_, recipe_id) in t.cart.iter().filter(|(u, _)| *u == user_id) {
                let mut rows: Vec<&(i32, i32, IngredientAmount)> = t
                    .recipe_ingredients
                    .iter()
                    .filter(|(_, r, _)| r == recipe_id)
                    .collect();
                rows.sort_by_key(|(row, _, _)| *row);
                for (_, _, item) in rows {
                    if let Some(ingredient) =
                        t.ingredients.iter().find(|i| i.id == item.ingredient_id)
                    {
                        lines.push(CartLine {
                            name: ingredient.name.clone(),
                            measurement_unit: ingredient.measurement_unit.clone(),
                            amount: item.amount,
                        });
                    }
                }
            }
            lines
        }))
    }
}

impl SubscriptionRepository for MemStore {
    async fn add(&self, user_id: i32, author_id: i32) -> Result<bool, FoodgramError> {
        Ok(self.with(|t| {
            if t.subscriptions.contains(&(user_id, author_id)) {
                return false;
            }
            t.subscriptions.push((user_id, author_id));
            true
        }))
    }

    async fn remove(&self, user_id: i32, author_id: i32) -> Result<bool, FoodgramError> {
        Ok(self.with(|t| {
            let before = t.subscriptions.len();
            t.subscriptions.retain(|pair| *pair != (user_id, author_id));
            t.subscriptions.len() != before
        }))
    }

    async fn subscribed_among(
        &self,
        user_id: i32,
        author_ids: &[i32],
    ) -> Result<Vec<i32>, FoodgramError> {
        Ok(self.with(|t| {
            t.subscriptions
                .iter()
                .filter(|(u, a)| *u == user_id && author_ids.contains(a))
                .map(|(_, a)| *a)
                .collect()
        }))
    }

    async fn list_authors(
        &self,
        user_id: i32,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), FoodgramError> {
        Ok(self.with(|t| {
            let authors: Vec<User> = t
                .subscriptions
                .iter()
                .rev()
                .filter(|(u, _)| *u == user_id)
                .filter_map(|(_, a)| t.users.iter().find(|u| u.id == *a).cloned())
                .collect();
            let count = authors.len() as u64;
            let rows = authors
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit as usize)
                .collect();
            (rows, count)
        }))
    }
}

impl ShortLinkRepository for MemStore {
    async fn find_by_recipe(&self, recipe_id: i32) -> Result<Option<String>, FoodgramError> {
        Ok(self.with(|t| {
            t.links
                .iter()
                .find(|(r, _)| *r == recipe_id)
                .map(|(_, s)| s.clone())
        }))
    }

    async fn find_recipe(&self, short_id: &str) -> Result<Option<i32>, FoodgramError> {
        Ok(self.with(|t| t.links.iter().find(|(_, s)| s == short_id).map(|(r, _)| *r)))
    }

    async fn insert(&self, recipe_id: i32, short_id: &str) -> Result<bool, FoodgramError> {
        Ok(self.with(|t| {
            if t.links.iter().any(|(r, s)| *r == recipe_id || s == short_id) {
                return false;
            }
            t.links.push((recipe_id, short_id.to_owned()));
            true
        }))
    }
}

// ── MockMedia ────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockMedia {
    pub saved: Arc<Mutex<Vec<String>>>,
    pub removed: Arc<Mutex<Vec<String>>>,
}

impl MediaStore for MockMedia {
    async fn save(
        &self,
        folder: MediaFolder,
        image: &DecodedImage,
    ) -> Result<String, FoodgramError> {
        let mut saved = self.saved.lock().unwrap();
        let path = format!(
            "{}/upload-{}.{}",
            folder.as_path(),
            saved.len() + 1,
            image.extension
        );
        saved.push(path.clone());
        Ok(path)
    }

    async fn remove(&self, path: &str) {
        self.removed.lock().unwrap().push(path.to_owned());
    }
}

// ── ScriptedShortIds ─────────────────────────────────────────────────────────

/// Hands out queued ids, then falls back to a unique counter-based id of the
/// requested length.
#[derive(Default)]
pub struct ScriptedShortIds {
    queue: Mutex<VecDeque<String>>,
    counter: Mutex<usize>,
    pub requested_lengths: Mutex<Vec<usize>>,
}

impl ScriptedShortIds {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            queue: Mutex::new(ids.iter().map(|s| (*s).to_owned()).collect()),
            ..Default::default()
        }
    }
}

impl ShortIdSource for ScriptedShortIds {
    fn generate(&self, len: usize) -> String {
        self.requested_lengths.lock().unwrap().push(len);
        if let Some(id) = self.queue.lock().unwrap().pop_front() {
            return id;
        }
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        format!("{:0>len$}", *counter)
    }
}

/// Always returns the same id, so every insert after the first collides.
pub struct ConstantShortId(pub &'static str);

impl ShortIdSource for ConstantShortId {
    fn generate(&self, _len: usize) -> String {
        self.0.to_owned()
    }
}
