use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::domain::types::Ingredient;
use crate::error::FoodgramError;
use crate::handlers::{QueryParams, TagResponse};
use crate::state::AppState;
use crate::usecase::catalog::{
    GetIngredientUseCase, GetTagUseCase, ListTagsUseCase, SearchIngredientsUseCase,
};

// ── GET /api/tags/ ───────────────────────────────────────────────────────────

pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<Vec<TagResponse>>, FoodgramError> {
    let usecase = ListTagsUseCase {
        repo: state.tag_repo(),
    };
    let tags = usecase.execute().await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

// ── GET /api/tags/{id}/ ──────────────────────────────────────────────────────

pub async fn get_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<i32>,
) -> Result<Json<TagResponse>, FoodgramError> {
    let usecase = GetTagUseCase {
        repo: state.tag_repo(),
    };
    Ok(Json(usecase.execute(tag_id).await?.into()))
}

// ── GET /api/ingredients/ ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IngredientSearchQuery {
    pub name: Option<String>,
}

#[derive(Serialize)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

pub async fn search_ingredients(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IngredientSearchQuery>,
) -> Result<Json<Vec<IngredientResponse>>, FoodgramError> {
    let usecase = SearchIngredientsUseCase {
        repo: state.ingredient_repo(),
    };
    let found = usecase.execute(query.name.as_deref()).await?;
    Ok(Json(found.into_iter().map(IngredientResponse::from).collect()))
}

// ── GET /api/ingredients/{id}/ ───────────────────────────────────────────────

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(ingredient_id): Path<i32>,
) -> Result<Json<IngredientResponse>, FoodgramError> {
    let usecase = GetIngredientUseCase {
        repo: state.ingredient_repo(),
    };
    Ok(Json(usecase.execute(ingredient_id).await?.into()))
}
