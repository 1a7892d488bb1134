pub mod dto;
pub mod error;
pub mod handlers;
pub mod index;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use error::RecommendError;
pub use services::{IngredientMatch, Recommender, SearchParams};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::predict_routes())
}
