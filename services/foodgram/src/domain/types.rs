use chrono::{DateTime, Utc};

/// Upper bound shared by cooking time and ingredient amounts.
pub const MAX_SMALL_AMOUNT: i32 = 32_000;
pub const MAX_RECIPE_NAME_LEN: usize = 256;
pub const MAX_USER_NAME_LEN: usize = 150;
pub const MAX_EMAIL_LEN: usize = 254;

/// Registered account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    /// Media path of the avatar image, if one was uploaded.
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// Recipe row without its ingredient and tag links.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: i32,
    pub author_id: i32,
    pub name: String,
    pub text: String,
    /// Media path of the recipe image.
    pub image: String,
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
}

/// Ingredient as it appears inside a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub ingredient: Ingredient,
    pub amount: i32,
}

/// `(ingredient id, amount)` pair sent by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: i32,
    pub amount: i32,
}

/// Validated recipe ready to be written. `image` is an already-stored media path.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub ingredients: Vec<IngredientAmount>,
    pub tag_ids: Vec<i32>,
}

/// Validated partial update. `ingredients` always replaces the stored set;
/// `tag_ids` replaces only when present.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Vec<IngredientAmount>,
    pub tag_ids: Option<Vec<i32>>,
}

/// Per-user recipe collections sharing the same toggle semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

/// Recipe list criteria as sent by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<i32>,
    /// Tag slugs; a recipe matches when it carries any of them.
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Resolved filter: flags bound to a concrete user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeScope {
    pub author: Option<i32>,
    /// Lower-cased slugs.
    pub tags: Vec<String>,
    pub favorited_by: Option<i32>,
    pub in_cart_of: Option<i32>,
}

impl RecipeFilter {
    /// Bind the flags to `viewer`. Anonymous viewers get the flags dropped.
    pub fn scope(self, viewer: Option<i32>) -> RecipeScope {
        let mut tags: Vec<String> = self
            .tags
            .into_iter()
            .map(|slug| slug.trim().to_lowercase())
            .filter(|slug| !slug.is_empty())
            .collect();
        tags.sort();
        tags.dedup();
        RecipeScope {
            author: self.author,
            tags,
            favorited_by: viewer.filter(|_| self.is_favorited),
            in_cart_of: viewer.filter(|_| self.is_in_shopping_cart),
        }
    }
}

/// Parse a boolean filter flag: `1`/`true` filter, `0`/`false` don't.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// One ingredient row of one cart recipe, in cart order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Usernames: 1-150 chars of letters, digits and `.@+-_`.
pub fn validate_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= MAX_USER_NAME_LEN
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'))
}

/// Loose shape check: one `@`, non-empty local part, dotted domain, no spaces.
pub fn validate_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}
