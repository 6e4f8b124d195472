#![allow(async_fn_in_trait)]

use uuid::Uuid;

use foodgram_domain::image::DecodedImage;
use foodgram_domain::pagination::PageRequest;

use crate::domain::types::{
    CartLine, Ingredient, NewIngredient, NewRecipe, NewTag, NewUser, Recipe, RecipeChanges,
    RecipeIngredient, RecipeList, RecipeScope, Tag, User,
};
use crate::error::FoodgramError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, FoodgramError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, FoodgramError>;
    /// Users with the given ids, in no particular order. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, FoodgramError>;
    async fn email_taken(&self, email: &str) -> Result<bool, FoodgramError>;
    async fn username_taken(&self, username: &str) -> Result<bool, FoodgramError>;
    async fn create(&self, user: &NewUser) -> Result<User, FoodgramError>;
    /// One page ordered by id, plus the total count.
    async fn list(&self, page: PageRequest) -> Result<(Vec<User>, u64), FoodgramError>;
    async fn set_avatar(&self, id: i32, avatar: Option<&str>) -> Result<(), FoodgramError>;
    async fn set_password_hash(&self, id: i32, hash: &str) -> Result<(), FoodgramError>;
}

/// Live login tokens, keyed by the JWT `jti`.
pub trait AuthTokenRepository: Send + Sync {
    async fn create(&self, jti: Uuid, user_id: i32) -> Result<(), FoodgramError>;
    async fn exists(&self, jti: Uuid) -> Result<bool, FoodgramError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, jti: Uuid) -> Result<bool, FoodgramError>;
}

pub trait IngredientRepository: Send + Sync {
    /// Case-insensitive name prefix search ordered by name, then id.
    /// `None` lists everything.
    async fn search(&self, prefix: Option<&str>) -> Result<Vec<Ingredient>, FoodgramError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, FoodgramError>;
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Ingredient>, FoodgramError>;
    /// Insert rows whose `(name, unit)` pair is new. Returns how many were inserted.
    async fn insert_missing(&self, ingredients: &[NewIngredient]) -> Result<u64, FoodgramError>;
}

pub trait TagRepository: Send + Sync {
    /// All tags ordered by id.
    async fn list(&self) -> Result<Vec<Tag>, FoodgramError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, FoodgramError>;
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>, FoodgramError>;
    /// Insert tags whose slug and name are new. Returns how many were inserted.
    async fn insert_missing(&self, tags: &[NewTag]) -> Result<u64, FoodgramError>;
}

pub trait RecipeRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, FoodgramError>;

    /// One page of recipes matching `scope`, newest first, plus the total count.
    async fn list(
        &self,
        scope: &RecipeScope,
        page: PageRequest,
    ) -> Result<(Vec<Recipe>, u64), FoodgramError>;

    /// Newest-first recipes of one author, optionally truncated.
    async fn list_by_author(
        &self,
        author_id: i32,
        limit: Option<u64>,
    ) -> Result<Vec<Recipe>, FoodgramError>;

    async fn count_by_author(&self, author_id: i32) -> Result<u64, FoodgramError>;

    /// Ingredient rows of the given recipes, ordered by row id.
    async fn ingredients_of(
        &self,
        recipe_ids: &[i32],
    ) -> Result<Vec<(i32, RecipeIngredient)>, FoodgramError>;

    /// Tags of the given recipes, ordered by tag id.
    async fn tags_of(&self, recipe_ids: &[i32]) -> Result<Vec<(i32, Tag)>, FoodgramError>;

    /// Insert the recipe with its ingredient and tag links atomically.
    async fn create(&self, author_id: i32, recipe: &NewRecipe) -> Result<Recipe, FoodgramError>;

    /// Apply `changes` atomically and return the updated row.
    /// `RecipeNotFound` when the row is gone by the time of the write.
    async fn update(&self, id: i32, changes: &RecipeChanges) -> Result<Recipe, FoodgramError>;

    /// Returns `true` if a row was deleted. Links cascade.
    async fn delete(&self, id: i32) -> Result<bool, FoodgramError>;
}

/// Favorites and shopping cart.
pub trait RecipeListRepository: Send + Sync {
    /// Returns `false` when the pair already existed.
    async fn add(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, FoodgramError>;

    /// Returns `false` when the pair did not exist.
    async fn remove(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, FoodgramError>;

    /// Subset of `recipe_ids` present in the user's list.
    async fn marked(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_ids: &[i32],
    ) -> Result<Vec<i32>, FoodgramError>;

    /// Ingredient rows of every cart recipe: cart entries in insertion order,
    /// then recipe ingredient rows by id.
    async fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLine>, FoodgramError>;
}

pub trait SubscriptionRepository: Send + Sync {
    /// Returns `false` when the subscription already existed.
    async fn add(&self, user_id: i32, author_id: i32) -> Result<bool, FoodgramError>;
    /// Returns `false` when there was nothing to delete.
    async fn remove(&self, user_id: i32, author_id: i32) -> Result<bool, FoodgramError>;
    /// Subset of `author_ids` the user follows.
    async fn subscribed_among(
        &self,
        user_id: i32,
        author_ids: &[i32],
    ) -> Result<Vec<i32>, FoodgramError>;
    /// Followed authors, newest subscription first, plus the total count.
    async fn list_authors(
        &self,
        user_id: i32,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), FoodgramError>;
}

pub trait ShortLinkRepository: Send + Sync {
    async fn find_by_recipe(&self, recipe_id: i32) -> Result<Option<String>, FoodgramError>;
    async fn find_recipe(&self, short_id: &str) -> Result<Option<i32>, FoodgramError>;
    /// Insert unless either the recipe or the short id is already mapped.
    /// Returns `false` on conflict.
    async fn insert(&self, recipe_id: i32, short_id: &str) -> Result<bool, FoodgramError>;
}

/// Upload destinations under the media root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFolder {
    RecipeImages,
    Avatars,
}

impl MediaFolder {
    pub fn as_path(self) -> &'static str {
        match self {
            Self::RecipeImages => "recipes/images",
            Self::Avatars => "users/avatars",
        }
    }
}

/// Storage for uploaded images.
pub trait MediaStore: Send + Sync {
    /// Persist the image and return its path relative to the media root.
    async fn save(
        &self,
        folder: MediaFolder,
        image: &DecodedImage,
    ) -> Result<String, FoodgramError>;
    /// Best-effort removal; failures are logged, not returned.
    async fn remove(&self, path: &str);
}

/// Source of candidate short identifiers.
pub trait ShortIdSource: Send + Sync {
    fn generate(&self, len: usize) -> String;
}
