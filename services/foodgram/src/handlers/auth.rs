use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::FoodgramError;
use crate::handlers::JsonBody;
use crate::handlers::identity::Identity;
use crate::state::AppState;
use crate::usecase::auth::{LoginInput, LoginUseCase, LogoutUseCase};

// ── POST /api/auth/token/login/ ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub auth_token: String,
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, FoodgramError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        tokens: state.auth_token_repo(),
        jwt_secret: state.jwt_secret.clone(),
        token_ttl_secs: state.token_ttl_secs,
    };
    let auth_token = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(LoginResponse { auth_token }))
}

// ── POST /api/auth/token/logout/ ─────────────────────────────────────────────

pub async fn logout(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<StatusCode, FoodgramError> {
    let usecase = LogoutUseCase {
        tokens: state.auth_token_repo(),
    };
    usecase.execute(identity.jti).await?;
    Ok(StatusCode::NO_CONTENT)
}
