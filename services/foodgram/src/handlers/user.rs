use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use foodgram_domain::pagination::{Page, PageRequest};

use crate::error::FoodgramError;
use crate::handlers::identity::{Identity, Viewer};
use crate::handlers::{JsonBody, QueryParams, UserResponse};
use crate::state::AppState;
use crate::usecase::user::{
    DeleteAvatarUseCase, GetUserUseCase, ListUsersUseCase, RegisterUserInput,
    RegisterUserUseCase, SetAvatarUseCase, SetPasswordInput, SetPasswordUseCase,
};

// ── POST /api/users/ ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), FoodgramError> {
    let usecase = RegisterUserUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(RegisterUserInput {
            email: body.email,
            username: body.username,
            first_name: body.first_name,
            last_name: body.last_name,
            password: body.password,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }),
    ))
}

// ── GET /api/users/ ──────────────────────────────────────────────────────────

pub async fn list_users(
    viewer: Viewer,
    State(state): State<AppState>,
    QueryParams(page): QueryParams<PageRequest>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<UserResponse>>, FoodgramError> {
    let usecase = ListUsersUseCase {
        repo: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    let (users, count) = usecase.execute(viewer.0, page).await?;
    let results = users
        .into_iter()
        .map(|u| UserResponse::from_view(u, &state))
        .collect();
    Ok(Json(Page::new(
        results,
        count,
        page,
        &state.api_url("/api/users/"),
        raw_query.as_deref(),
    )))
}

// ── GET /api/users/{id}/ ─────────────────────────────────────────────────────

pub async fn get_user(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<UserResponse>, FoodgramError> {
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    let view = usecase.execute(viewer.0, user_id).await?;
    Ok(Json(UserResponse::from_view(view, &state)))
}

// ── GET /api/users/me/ ───────────────────────────────────────────────────────

pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, FoodgramError> {
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    let view = usecase
        .execute(Some(identity.user_id), identity.user_id)
        .await?;
    Ok(Json(UserResponse::from_view(view, &state)))
}

// ── PUT /api/users/me/avatar/ ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AvatarRequest {
    pub avatar: Option<String>,
}

#[derive(Serialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

pub async fn set_avatar(
    identity: Identity,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<AvatarRequest>,
) -> Result<Json<AvatarResponse>, FoodgramError> {
    let avatar = body
        .avatar
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| FoodgramError::field("avatar", "This field is required."))?;
    let usecase = SetAvatarUseCase {
        repo: state.user_repo(),
        media: state.media_store(),
    };
    let path = usecase.execute(identity.user_id, &avatar).await?;
    Ok(Json(AvatarResponse {
        avatar: state.media_url(&path),
    }))
}

// ── DELETE /api/users/me/avatar/ ─────────────────────────────────────────────

pub async fn delete_avatar(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<StatusCode, FoodgramError> {
    let usecase = DeleteAvatarUseCase {
        repo: state.user_repo(),
        media: state.media_store(),
    };
    usecase.execute(identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /api/users/set_password/ ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetPasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

pub async fn set_password(
    identity: Identity,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SetPasswordRequest>,
) -> Result<StatusCode, FoodgramError> {
    let usecase = SetPasswordUseCase {
        repo: state.user_repo(),
    };
    usecase
        .execute(
            identity.user_id,
            SetPasswordInput {
                current_password: body.current_password,
                new_password: body.new_password,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
