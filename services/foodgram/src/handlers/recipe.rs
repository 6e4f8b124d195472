use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;

use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::shopping_list::SHOPPING_LIST_FILENAME;
use crate::domain::types::{IngredientAmount, RecipeFilter, RecipeList, parse_flag};
use crate::error::FoodgramError;
use crate::handlers::identity::{Identity, Viewer};
use crate::handlers::{JsonBody, QueryParams, RecipeMinifiedResponse, RecipeResponse};
use crate::state::AppState;
use crate::usecase::recipe::{
    CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeUseCase, ListRecipesUseCase,
    RecipeInput, UpdateRecipeUseCase,
};
use crate::usecase::recipe_list::{AddToListUseCase, RemoveFromListUseCase};
use crate::usecase::shopping_list::DownloadShoppingListUseCase;

// ── GET /api/recipes/ ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub author: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

fn flag(field: &str, value: Option<&str>) -> Result<bool, FoodgramError> {
    match value {
        None => Ok(false),
        Some(raw) => parse_flag(raw)
            .ok_or_else(|| FoodgramError::field(field, "Expected one of 0, 1, true, false.")),
    }
}

impl RecipeListQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            limit: self.limit.unwrap_or(defaults.limit),
        }
        .clamped()
    }

    fn filter(self) -> Result<RecipeFilter, FoodgramError> {
        Ok(RecipeFilter {
            is_favorited: flag("is_favorited", self.is_favorited.as_deref())?,
            is_in_shopping_cart: flag("is_in_shopping_cart", self.is_in_shopping_cart.as_deref())?,
            author: self.author,
            tags: self.tags,
        })
    }
}

pub async fn list_recipes(
    viewer: Viewer,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<RecipeListQuery>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<RecipeResponse>>, FoodgramError> {
    let page = query.page_request();
    let filter = query.filter()?;
    let usecase = ListRecipesUseCase {
        reader: state.recipe_reader(),
    };
    let (views, count) = usecase.execute(viewer.0, filter, page).await?;
    let results = views
        .into_iter()
        .map(|v| RecipeResponse::from_view(v, &state))
        .collect();
    Ok(Json(Page::new(
        results,
        count,
        page,
        &state.api_url("/api/recipes/"),
        raw_query.as_deref(),
    )))
}

// ── GET /api/recipes/{id}/ ───────────────────────────────────────────────────

pub async fn get_recipe(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(recipe_id): Path<i32>,
) -> Result<Json<RecipeResponse>, FoodgramError> {
    let usecase = GetRecipeUseCase {
        reader: state.recipe_reader(),
    };
    let view = usecase.execute(viewer.0, recipe_id).await?;
    Ok(Json(RecipeResponse::from_view(view, &state)))
}

// ── POST /api/recipes/ ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IngredientAmountRequest {
    pub id: i32,
    pub amount: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipeRequest {
    pub name: Option<String>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
    pub tags: Option<Vec<i32>>,
}

impl From<RecipeRequest> for RecipeInput {
    fn from(body: RecipeRequest) -> Self {
        Self {
            name: body.name,
            text: body.text,
            image: body.image,
            cooking_time: body.cooking_time,
            ingredients: body.ingredients.map(|items| {
                items
                    .into_iter()
                    .map(|i| IngredientAmount {
                        ingredient_id: i.id,
                        amount: i.amount,
                    })
                    .collect()
            }),
            tags: body.tags,
        }
    }
}

pub async fn create_recipe(
    identity: Identity,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), FoodgramError> {
    let usecase = CreateRecipeUseCase {
        reader: state.recipe_reader(),
        ingredients: state.ingredient_repo(),
        tags: state.tag_repo(),
        media: state.media_store(),
    };
    let view = usecase.execute(identity.user_id, body.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecipeResponse::from_view(view, &state)),
    ))
}

// ── PATCH /api/recipes/{id}/ ─────────────────────────────────────────────────

pub async fn update_recipe(
    identity: Identity,
    State(state): State<AppState>,
    Path(recipe_id): Path<i32>,
    JsonBody(body): JsonBody<RecipeRequest>,
) -> Result<Json<RecipeResponse>, FoodgramError> {
    let usecase = UpdateRecipeUseCase {
        reader: state.recipe_reader(),
        ingredients: state.ingredient_repo(),
        tags: state.tag_repo(),
        media: state.media_store(),
    };
    let view = usecase
        .execute(identity.user_id, recipe_id, body.into())
        .await?;
    Ok(Json(RecipeResponse::from_view(view, &state)))
}

// ── DELETE /api/recipes/{id}/ ────────────────────────────────────────────────

pub async fn delete_recipe(
    identity: Identity,
    State(state): State<AppState>,
    Path(recipe_id): Path<i32>,
) -> Result<StatusCode, FoodgramError> {
    let usecase = DeleteRecipeUseCase {
        repo: state.recipe_repo(),
        media: state.media_store(),
    };
    usecase.execute(identity.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST|DELETE /api/recipes/{id}/favorite/ and /shopping_cart/ ──────────────

async fn add_to(
    list: RecipeList,
    identity: Identity,
    state: AppState,
    recipe_id: i32,
) -> Result<(StatusCode, Json<RecipeMinifiedResponse>), FoodgramError> {
    let usecase = AddToListUseCase {
        recipes: state.recipe_repo(),
        lists: state.recipe_list_repo(),
    };
    let recipe = usecase.execute(list, identity.user_id, recipe_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecipeMinifiedResponse::from_recipe(recipe, &state)),
    ))
}

async fn remove_from(
    list: RecipeList,
    identity: Identity,
    state: AppState,
    recipe_id: i32,
) -> Result<StatusCode, FoodgramError> {
    let usecase = RemoveFromListUseCase {
        recipes: state.recipe_repo(),
        lists: state.recipe_list_repo(),
    };
    usecase.execute(list, identity.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_favorite(
    identity: Identity,
    State(state): State<AppState>,
    Path(recipe_id): Path<i32>,
) -> Result<(StatusCode, Json<RecipeMinifiedResponse>), FoodgramError> {
    add_to(RecipeList::Favorites, identity, state, recipe_id).await
}

pub async fn remove_favorite(
    identity: Identity,
    State(state): State<AppState>,
    Path(recipe_id): Path<i32>,
) -> Result<StatusCode, FoodgramError> {
    remove_from(RecipeList::Favorites, identity, state, recipe_id).await
}

pub async fn add_to_cart(
    identity: Identity,
    State(state): State<AppState>,
    Path(recipe_id): Path<i32>,
) -> Result<(StatusCode, Json<RecipeMinifiedResponse>), FoodgramError> {
    add_to(RecipeList::ShoppingCart, identity, state, recipe_id).await
}

pub async fn remove_from_cart(
    identity: Identity,
    State(state): State<AppState>,
    Path(recipe_id): Path<i32>,
) -> Result<StatusCode, FoodgramError> {
    remove_from(RecipeList::ShoppingCart, identity, state, recipe_id).await
}

// ── GET /api/recipes/download_shopping_cart/ ─────────────────────────────────

pub async fn download_shopping_cart(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, FoodgramError> {
    let usecase = DownloadShoppingListUseCase {
        lists: state.recipe_list_repo(),
    };
    let body = usecase.execute(identity.user_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
            ),
        ],
        body,
    ))
}
