pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use repo::RecipeCatalog;
pub use repo_types::{Nutrition, RecipeRecord, NUTRITION_DIM};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::read_routes())
}
