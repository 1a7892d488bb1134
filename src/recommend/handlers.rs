use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use super::dto::{PredictionIn, PredictionOut};
use crate::state::AppState;

pub fn predict_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict))
        .route("/predict/", post(predict))
}

#[instrument(skip(state, body))]
pub async fn predict(
    State(state): State<AppState>,
    Json(body): Json<PredictionIn>,
) -> Result<Json<PredictionOut>, (StatusCode, String)> {
    let params = body.params.unwrap_or_default();
    let policy = body
        .ingredient_match
        .unwrap_or_else(|| state.recommender.default_match());

    let output = state
        .recommender
        .recommend_with(&body.nutrition_input, &body.ingredients, params, policy)
        .map_err(|e| {
            warn!(error = %e, "prediction rejected");
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        })?;

    info!(
        ingredients = body.ingredients.len(),
        n_neighbors = params.n_neighbors,
        returned = output.as_ref().map_or(0, Vec::len),
        "prediction served"
    );
    Ok(Json(PredictionOut { output }))
}
