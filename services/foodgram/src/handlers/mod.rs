pub mod auth;
pub mod catalog;
pub mod identity;
pub mod recipe;
pub mod short_link;
pub mod subscription;
pub mod user;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts};
use axum_extra::extract::QueryRejection;
use serde::Serialize;

use crate::domain::types::{Recipe, RecipeIngredient, Tag};
use crate::error::FoodgramError;
use crate::state::AppState;
use crate::usecase::view::{AuthorView, RecipeView, UserView};

// ── Extractors ───────────────────────────────────────────────────────────────

/// JSON body whose rejections use the service error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(FoodgramError))]
pub struct JsonBody<T>(pub T);

/// Query string (repeated keys allowed) whose rejections use the service error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum_extra::extract::Query), rejection(FoodgramError))]
pub struct QueryParams<T>(pub T);

impl From<JsonRejection> for FoodgramError {
    fn from(rejection: JsonRejection) -> Self {
        FoodgramError::field("non_field_errors", rejection.body_text())
    }
}

impl From<QueryRejection> for FoodgramError {
    fn from(rejection: QueryRejection) -> Self {
        FoodgramError::field("query", rejection.to_string())
    }
}

// ── Shared response types ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

impl UserResponse {
    pub fn from_view(view: UserView, state: &AppState) -> Self {
        let user = view.user;
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed: view.is_subscribed,
            avatar: user.avatar.map(|path| state.media_url(&path)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(item: RecipeIngredient) -> Self {
        Self {
            id: item.ingredient.id,
            name: item.ingredient.name,
            measurement_unit: item.ingredient.measurement_unit,
            amount: item.amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeResponse {
    pub fn from_view(view: RecipeView, state: &AppState) -> Self {
        let recipe = view.recipe;
        Self {
            id: recipe.id,
            tags: view.tags.into_iter().map(TagResponse::from).collect(),
            author: UserResponse::from_view(view.author, state),
            ingredients: view
                .ingredients
                .into_iter()
                .map(RecipeIngredientResponse::from)
                .collect(),
            is_favorited: view.is_favorited,
            is_in_shopping_cart: view.is_in_shopping_cart,
            name: recipe.name,
            image: state.media_url(&recipe.image),
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Short recipe form used by toggles and subscription previews.
#[derive(Debug, Serialize)]
pub struct RecipeMinifiedResponse {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeMinifiedResponse {
    pub fn from_recipe(recipe: Recipe, state: &AppState) -> Self {
        Self {
            id: recipe.id,
            image: state.media_url(&recipe.image),
            name: recipe.name,
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeMinifiedResponse>,
    pub recipes_count: u64,
}

impl AuthorResponse {
    pub fn from_view(view: AuthorView, state: &AppState) -> Self {
        Self {
            user: UserResponse::from_view(view.author, state),
            recipes: view
                .recipes
                .into_iter()
                .map(|r| RecipeMinifiedResponse::from_recipe(r, state))
                .collect(),
            recipes_count: view.recipes_count,
        }
    }
}
