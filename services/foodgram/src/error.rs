use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use foodgram_core::error::{FieldErrors, error_response};

/// Foodgram service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum FoodgramError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("unable to log in with provided credentials")]
    InvalidCredentials,
    #[error("recipe is already in favorites")]
    AlreadyFavorited,
    #[error("recipe is not in favorites")]
    NotFavorited,
    #[error("recipe is already in the shopping cart")]
    AlreadyInCart,
    #[error("recipe is not in the shopping cart")]
    NotInCart,
    #[error("already subscribed to this author")]
    AlreadySubscribed,
    #[error("not subscribed to this author")]
    NotSubscribed,
    #[error("cannot subscribe to yourself")]
    SelfSubscription,
    #[error("shopping cart is empty")]
    CartEmpty,
    #[error("authentication credentials were not provided")]
    Unauthenticated,
    #[error("invalid token")]
    InvalidToken,
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("recipe not found")]
    RecipeNotFound,
    #[error("tag not found")]
    TagNotFound,
    #[error("ingredient not found")]
    IngredientNotFound,
    #[error("short link not found")]
    ShortLinkNotFound,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl FoodgramError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AlreadyFavorited => "ALREADY_FAVORITED",
            Self::NotFavorited => "NOT_FAVORITED",
            Self::AlreadyInCart => "ALREADY_IN_CART",
            Self::NotInCart => "NOT_IN_CART",
            Self::AlreadySubscribed => "ALREADY_SUBSCRIBED",
            Self::NotSubscribed => "NOT_SUBSCRIBED",
            Self::SelfSubscription => "SELF_SUBSCRIPTION",
            Self::CartEmpty => "CART_EMPTY",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::RecipeNotFound => "RECIPE_NOT_FOUND",
            Self::TagNotFound => "TAG_NOT_FOUND",
            Self::IngredientNotFound => "INGREDIENT_NOT_FOUND",
            Self::ShortLinkNotFound => "SHORT_LINK_NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Field-level validation shorthand.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }
}

impl From<FieldErrors> for FoodgramError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for FoodgramError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_)
            | Self::InvalidCredentials
            | Self::AlreadyFavorited
            | Self::NotFavorited
            | Self::AlreadyInCart
            | Self::NotInCart
            | Self::AlreadySubscribed
            | Self::NotSubscribed
            | Self::SelfSubscription
            | Self::CartEmpty => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::RecipeNotFound
            | Self::TagNotFound
            | Self::IngredientNotFound
            | Self::ShortLinkNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let fields = match &self {
            Self::Validation(fields) => Some(fields),
            _ => None,
        };
        error_response(status, self.kind(), self.to_string(), fields)
    }
}
