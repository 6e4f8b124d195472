use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Serialize;

use crate::error::FoodgramError;
use crate::state::AppState;
use crate::usecase::short_link::{GetShortLinkUseCase, RandomShortIds, ResolveShortLinkUseCase};

// ── GET /api/recipes/{id}/get-link/ ──────────────────────────────────────────

#[derive(Serialize)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

pub async fn get_link(
    State(state): State<AppState>,
    Path(recipe_id): Path<i32>,
) -> Result<Json<ShortLinkResponse>, FoodgramError> {
    let usecase = GetShortLinkUseCase {
        recipes: state.recipe_repo(),
        links: state.short_link_repo(),
        ids: RandomShortIds,
    };
    let short_id = usecase.execute(recipe_id).await?;
    Ok(Json(ShortLinkResponse {
        short_link: short_link_url(&state, &short_id),
    }))
}

/// Public URL served by [`follow_link`].
pub fn short_link_url(state: &AppState, short_id: &str) -> String {
    state.api_url(&format!("/s/{short_id}/"))
}

// ── GET /s/{short_id}/ ───────────────────────────────────────────────────────

pub async fn follow_link(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
) -> Result<impl IntoResponse, FoodgramError> {
    let usecase = ResolveShortLinkUseCase {
        links: state.short_link_repo(),
    };
    let recipe_id = usecase.execute(&short_id).await?;
    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, format!("/recipes/{recipe_id}/"))],
    ))
}
