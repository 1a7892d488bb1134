use serde::{Deserialize, Serialize};

use super::services::{IngredientMatch, SearchParams};
use crate::recipes::{Nutrition, RecipeRecord};

#[derive(Debug, Deserialize)]
pub struct PredictionIn {
    pub nutrition_input: Vec<f64>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub params: Option<SearchParams>,
    /// Overrides the configured multi-keyword policy for this request.
    #[serde(default)]
    pub ingredient_match: Option<IngredientMatch>,
}

#[derive(Debug, Serialize)]
pub struct PredictionOut {
    /// `null` when the ingredient filter left nothing to search.
    pub output: Option<Vec<OutputRecord>>,
}

/// Recipe shape returned by recommendations. `distance` is omitted entirely unless requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "CookTime")]
    pub cook_time: String,
    #[serde(rename = "PrepTime")]
    pub prep_time: String,
    #[serde(rename = "TotalTime")]
    pub total_time: String,
    #[serde(rename = "RecipeIngredientParts")]
    pub ingredients: Vec<String>,
    #[serde(flatten)]
    pub nutrition: Nutrition,
    #[serde(rename = "RecipeInstructions")]
    pub instructions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl OutputRecord {
    pub fn from_record(r: &RecipeRecord, distance: Option<f64>) -> Self {
        Self {
            name: r.name.clone(),
            cook_time: r.cook_time.clone(),
            prep_time: r.prep_time.clone(),
            total_time: r.total_time.clone(),
            ingredients: r.ingredients.clone(),
            nutrition: r.nutrition,
            instructions: r.instructions.clone(),
            distance,
        }
    }
}
