//! Requester identity resolved from the `Authorization` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use foodgram_auth_types::identity::{Credentials, credentials};

use crate::error::FoodgramError;
use crate::state::AppState;
use crate::usecase::auth::AuthenticateUseCase;

/// Authenticated caller. Rejects with 401 when the token is missing,
/// malformed, expired or revoked.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: i32,
    pub jti: Uuid,
}

/// Optional caller for public reads. A missing header yields `None`;
/// a present but invalid token is still rejected with 401.
#[derive(Debug, Clone, Copy)]
pub struct Viewer(pub Option<i32>);

fn bearer(parts: &Parts) -> Result<Option<String>, FoodgramError> {
    match credentials(&parts.headers) {
        Credentials::Anonymous => Ok(None),
        Credentials::Token(token) => Ok(Some(token.to_owned())),
        Credentials::Invalid => Err(FoodgramError::InvalidToken),
    }
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = FoodgramError;

    // Extract synchronously, then return a 'static async block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = bearer(parts);
        let usecase = AuthenticateUseCase {
            tokens: state.auth_token_repo(),
            jwt_secret: state.jwt_secret.clone(),
        };
        async move {
            let token = token?.ok_or(FoodgramError::Unauthenticated)?;
            let auth = usecase.execute(&token).await?;
            Ok(Self {
                user_id: auth.user_id,
                jti: auth.jti,
            })
        }
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = FoodgramError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = bearer(parts);
        let usecase = AuthenticateUseCase {
            tokens: state.auth_token_repo(),
            jwt_secret: state.jwt_secret.clone(),
        };
        async move {
            match token? {
                Some(token) => Ok(Self(Some(usecase.execute(&token).await?.user_id))),
                None => Ok(Self(None)),
            }
        }
    }
}
