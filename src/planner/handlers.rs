use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument};

use super::dto::{Ack, PlannerEntry, PlannerList, PlannerRange, RemovePlannerQuery};
use crate::{activities::dto::ActivityEntry, state::AppState};

pub fn planner_routes() -> Router<AppState> {
    Router::new().route(
        "/planner",
        get(get_planner).post(add_planner).delete(remove_planner),
    )
}

#[instrument(skip(state))]
pub async fn get_planner(
    State(state): State<AppState>,
    Query(range): Query<PlannerRange>,
) -> Result<Json<PlannerList>, (StatusCode, String)> {
    let items = state
        .store
        .planner_entries()
        .await
        .map_err(internal)?
        .into_iter()
        .filter(|e| range.contains(e.date))
        .collect();
    Ok(Json(PlannerList { items }))
}

#[instrument(skip(state))]
pub async fn add_planner(
    State(state): State<AppState>,
    Json(entry): Json<PlannerEntry>,
) -> Result<Json<Ack>, (StatusCode, String)> {
    let meta = entry.meta();
    state
        .store
        .add_planner_entry(entry)
        .await
        .map_err(internal)?;
    state
        .store
        .append_activity(ActivityEntry::now("planner_add", meta))
        .await
        .map_err(internal)?;
    info!("planner entry added");
    Ok(Json(Ack { ok: true }))
}

#[instrument(skip(state))]
pub async fn remove_planner(
    State(state): State<AppState>,
    Query(q): Query<RemovePlannerQuery>,
) -> Result<Json<Ack>, (StatusCode, String)> {
    let entry = PlannerEntry::from(q);
    let removed = state
        .store
        .remove_planner_entries(&entry)
        .await
        .map_err(internal)?;
    state
        .store
        .append_activity(ActivityEntry::now("planner_remove", entry.meta()))
        .await
        .map_err(internal)?;
    info!(removed, "planner entries removed");
    Ok(Json(Ack { ok: true }))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "planner storage failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
