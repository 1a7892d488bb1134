use serde::{Deserialize, Serialize};

use super::repo_types::RecipeRecord;

#[derive(Debug, Deserialize)]
pub struct RecipeQuery {
    pub search: Option<String>,
    pub ingredient: Option<String>,
    pub min_calories: Option<f64>,
    pub max_calories: Option<f64>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}
fn default_limit() -> usize { 100 }

impl Default for RecipeQuery {
    fn default() -> Self {
        Self {
            search: None,
            ingredient: None,
            min_calories: None,
            max_calories: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeListResponse {
    pub total: usize,
    pub items: Vec<RecipeRecord>,
}

#[derive(Debug, Serialize)]
pub struct RecipeItemResponse {
    pub item: Option<RecipeRecord>,
}
