use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::Deserialize;

use foodgram_domain::pagination::{Page, PageRequest};

use crate::error::FoodgramError;
use crate::handlers::identity::Identity;
use crate::handlers::{AuthorResponse, QueryParams};
use crate::state::AppState;
use crate::usecase::subscription::{
    ListSubscriptionsUseCase, SubscribeUseCase, UnsubscribeUseCase,
};

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Caps the embedded recipe preview; absent means all recipes.
    pub recipes_limit: Option<u32>,
}

impl SubscriptionQuery {
    fn recipes_limit(&self) -> Option<u64> {
        self.recipes_limit.map(u64::from)
    }
}

// ── GET /api/users/subscriptions/ ────────────────────────────────────────────

pub async fn list_subscriptions(
    identity: Identity,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SubscriptionQuery>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<AuthorResponse>>, FoodgramError> {
    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        limit: query.limit.unwrap_or(defaults.limit),
    }
    .clamped();
    let usecase = ListSubscriptionsUseCase {
        reader: state.recipe_reader(),
    };
    let (authors, count) = usecase
        .execute(identity.user_id, page, query.recipes_limit())
        .await?;
    let results = authors
        .into_iter()
        .map(|a| AuthorResponse::from_view(a, &state))
        .collect();
    Ok(Json(Page::new(
        results,
        count,
        page,
        &state.api_url("/api/users/subscriptions/"),
        raw_query.as_deref(),
    )))
}

// ── POST /api/users/{id}/subscribe/ ──────────────────────────────────────────

pub async fn subscribe(
    identity: Identity,
    State(state): State<AppState>,
    Path(author_id): Path<i32>,
    QueryParams(query): QueryParams<SubscriptionQuery>,
) -> Result<(StatusCode, Json<AuthorResponse>), FoodgramError> {
    let usecase = SubscribeUseCase {
        reader: state.recipe_reader(),
    };
    let view = usecase
        .execute(identity.user_id, author_id, query.recipes_limit())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthorResponse::from_view(view, &state)),
    ))
}

// ── DELETE /api/users/{id}/subscribe/ ────────────────────────────────────────

pub async fn unsubscribe(
    identity: Identity,
    State(state): State<AppState>,
    Path(author_id): Path<i32>,
) -> Result<StatusCode, FoodgramError> {
    let usecase = UnsubscribeUseCase {
        users: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    usecase.execute(identity.user_id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
