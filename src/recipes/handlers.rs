use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument};

use super::dto::{RecipeItemResponse, RecipeListResponse, RecipeQuery};
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipes/:id", get(get_recipe))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(q): Query<RecipeQuery>,
) -> Json<RecipeListResponse> {
    let (total, items) = state.catalog.search(&q);
    debug!(total, returned = items.len(), "recipes listed");
    Json(RecipeListResponse {
        total,
        items: items.into_iter().cloned().collect(),
    })
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Json<RecipeItemResponse> {
    let item = state.catalog.get(id).cloned();
    if item.is_none() {
        debug!(id, "recipe not found");
    }
    Json(RecipeItemResponse { item })
}
