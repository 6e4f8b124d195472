use std::path::PathBuf;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use crate::config::FoodgramConfig;
use crate::infra::db::{
    DbAuthTokenRepository, DbIngredientRepository, DbRecipeListRepository, DbRecipeRepository,
    DbShortLinkRepository, DbSubscriptionRepository, DbTagRepository, DbUserRepository,
};
use crate::infra::media::FsMediaStore;
use crate::usecase::view::RecipeReader;

pub type DbRecipeReader = RecipeReader<
    DbRecipeRepository,
    DbUserRepository,
    DbRecipeListRepository,
    DbSubscriptionRepository,
>;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    /// Origin without a trailing slash.
    pub public_base_url: String,
    pub media_root: PathBuf,
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &FoodgramConfig) -> Self {
        Self {
            db,
            jwt_secret: config.jwt_secret.clone(),
            token_ttl_secs: config.token_ttl_secs,
            public_base_url: config.base_url().to_owned(),
            media_root: config.media_root.clone(),
        }
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn auth_token_repo(&self) -> DbAuthTokenRepository {
        DbAuthTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn ingredient_repo(&self) -> DbIngredientRepository {
        DbIngredientRepository {
            db: self.db.clone(),
        }
    }

    pub fn tag_repo(&self) -> DbTagRepository {
        DbTagRepository {
            db: self.db.clone(),
        }
    }

    pub fn recipe_repo(&self) -> DbRecipeRepository {
        DbRecipeRepository {
            db: self.db.clone(),
        }
    }

    pub fn recipe_list_repo(&self) -> DbRecipeListRepository {
        DbRecipeListRepository {
            db: self.db.clone(),
        }
    }

    pub fn subscription_repo(&self) -> DbSubscriptionRepository {
        DbSubscriptionRepository {
            db: self.db.clone(),
        }
    }

    pub fn short_link_repo(&self) -> DbShortLinkRepository {
        DbShortLinkRepository {
            db: self.db.clone(),
        }
    }

    pub fn media_store(&self) -> FsMediaStore {
        FsMediaStore {
            root: self.media_root.clone(),
        }
    }

    pub fn recipe_reader(&self) -> DbRecipeReader {
        RecipeReader {
            recipes: self.recipe_repo(),
            users: self.user_repo(),
            lists: self.recipe_list_repo(),
            subscriptions: self.subscription_repo(),
        }
    }

    /// Absolute URL of a stored media path.
    pub fn media_url(&self, path: &str) -> String {
        format!("{}/media/{}", self.public_base_url, path)
    }

    /// Absolute URL of an API path such as `/api/recipes/`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.public_base_url, path)
    }
}
