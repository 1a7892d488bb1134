use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::recipes::RecipeCatalog;
use crate::recommend::{IngredientMatch, Recommender};
use crate::storage::{FileLogStore, LogStore};

/// Shared, read-only after startup. The log store serialises its own writes.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RecipeCatalog>,
    pub recommender: Arc<Recommender>,
    pub store: Arc<dyn LogStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let path = config.dataset_path.clone();
        let catalog = tokio::task::spawn_blocking(move || RecipeCatalog::load(path))
            .await
            .context("dataset loader task")??;

        let store = Arc::new(FileLogStore::open(&config.storage_dir).await?) as Arc<dyn LogStore>;

        Ok(Self::from_parts(
            Arc::new(catalog),
            store,
            config.ingredient_match,
        ))
    }

    pub fn from_parts(
        catalog: Arc<RecipeCatalog>,
        store: Arc<dyn LogStore>,
        ingredient_match: IngredientMatch,
    ) -> Self {
        let recommender = Arc::new(Recommender::new(catalog.clone(), ingredient_match));
        Self {
            catalog,
            recommender,
            store,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::recipes::{Nutrition, RecipeRecord};
        use crate::storage::MemoryLogStore;

        let rows: [(&str, &[&str], f64); 6] = [
            ("Roast Chicken", &["Chicken", "garlic", "lemon"], 450.0),
            ("Tofu Stir Fry", &["tofu", "soy sauce", "rice"], 310.0),
            ("Chicken Fried Rice", &["chicken breast", "rice", "egg"], 330.0),
            ("Green Salad", &["lettuce", "cucumber"], 120.0),
            ("Garlic Bread", &["bread", "garlic", "butter"], 295.0),
            ("Ribeye", &["beef", "salt"], 800.0),
        ];
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, (name, ingredients, calories))| {
                let mut v = [300.0, 10.0, 2.0, 30.0, 400.0, 40.0, 5.0, 10.0, 20.0];
                v[0] = *calories;
                RecipeRecord::new(
                    i as i64,
                    *name,
                    ingredients.iter().map(|s| s.to_string()).collect(),
                    Nutrition::from_vector(v),
                )
                .with_times("PT20M", "PT10M", "PT30M")
                .with_instructions(vec!["Prepare.".into(), "Serve.".into()])
            })
            .collect();

        Self::from_parts(
            Arc::new(RecipeCatalog::new(records)),
            Arc::new(MemoryLogStore::default()) as Arc<dyn LogStore>,
            IngredientMatch::All,
        )
    }
}
