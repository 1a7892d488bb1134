use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};

use super::dto::{ActivityEntry, ActivityList, ActivityQuery};
use crate::{planner::dto::Ack, state::AppState};

pub fn activity_routes() -> Router<AppState> {
    Router::new().route("/activities", get(list_activities).post(add_activity))
}

/// Newest first, at most `limit` entries.
#[instrument(skip(state))]
pub async fn list_activities(
    State(state): State<AppState>,
    Query(q): Query<ActivityQuery>,
) -> Result<Json<ActivityList>, (StatusCode, String)> {
    let items = state
        .store
        .activities()
        .await
        .map_err(internal)?
        .into_iter()
        .rev()
        .take(q.limit)
        .collect();
    Ok(Json(ActivityList { items }))
}

#[instrument(skip(state, activity))]
pub async fn add_activity(
    State(state): State<AppState>,
    Json(activity): Json<ActivityEntry>,
) -> Result<Json<Ack>, (StatusCode, String)> {
    state
        .store
        .append_activity(activity)
        .await
        .map_err(internal)?;
    Ok(Json(Ack { ok: true }))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "activity storage failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
