use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

use crate::recommend::services::IngredientMatch;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub dataset_path: PathBuf,
    pub storage_dir: PathBuf,
    pub ingredient_match: IngredientMatch,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let dataset_path = std::env::var("DATASET_PATH")
            .unwrap_or_else(|_| "data/dataset.csv".into())
            .into();
        let storage_dir = std::env::var("STORAGE_DIR")
            .unwrap_or_else(|_| "storage".into())
            .into();
        let ingredient_match = match std::env::var("INGREDIENT_MATCH") {
            Ok(v) => v
                .parse::<IngredientMatch>()
                .with_context(|| format!("INGREDIENT_MATCH={}", v))?,
            Err(_) => IngredientMatch::default(),
        };
        Ok(Self {
            dataset_path,
            storage_dir,
            ingredient_match,
        })
    }
}
