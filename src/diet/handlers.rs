use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use super::dto::{DietPlanResponse, DietProfile};
use super::services;
use crate::state::AppState;

pub fn diet_routes() -> Router<AppState> {
    Router::new().route("/diet/recommendations", post(recommend_diet))
}

#[instrument(skip(state))]
pub async fn recommend_diet(
    State(state): State<AppState>,
    Json(profile): Json<DietProfile>,
) -> Result<Json<DietPlanResponse>, (StatusCode, String)> {
    let result = {
        let mut rng = rand::thread_rng();
        services::plan(&profile, &state.recommender, &mut rng)
    };
    let plan = result.map_err(|e| {
        warn!(error = %e, "diet plan rejected");
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;
    info!(
        target_calories = plan.target_calories,
        meals = plan.meals.len(),
        "diet plan generated"
    );
    Ok(Json(plan))
}
