use std::{collections::HashSet, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dto::OutputRecord;
use super::error::RecommendError;
use super::index::{validate_vector, FeatureIndex};
use crate::recipes::RecipeCatalog;

/// How several ingredient keywords combine when pre-filtering rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientMatch {
    /// Every keyword must appear.
    #[default]
    All,
    /// At least one keyword must appear.
    Any,
}

impl FromStr for IngredientMatch {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "and" => Ok(Self::All),
            "any" | "or" => Ok(Self::Any),
            other => anyhow::bail!("unknown ingredient match policy {:?} (expected all|any)", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SearchParams {
    #[serde(default = "default_neighbors")]
    pub n_neighbors: usize,
    #[serde(default)]
    pub return_distance: bool,
}
fn default_neighbors() -> usize { 5 }

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            n_neighbors: default_neighbors(),
            return_distance: false,
        }
    }
}

impl SearchParams {
    pub fn validate(&self) -> Result<(), RecommendError> {
        if self.n_neighbors == 0 {
            return Err(RecommendError::InvalidNeighbors);
        }
        Ok(())
    }
}

/// Ingredient pre-filter plus nearest-neighbour search over an immutable catalog.
pub struct Recommender {
    catalog: Arc<RecipeCatalog>,
    index: FeatureIndex,
    default_match: IngredientMatch,
}

impl Recommender {
    pub fn new(catalog: Arc<RecipeCatalog>, default_match: IngredientMatch) -> Self {
        let index = FeatureIndex::build(catalog.records());
        Self {
            catalog,
            index,
            default_match,
        }
    }

    pub fn default_match(&self) -> IngredientMatch {
        self.default_match
    }

    pub fn recommend(
        &self,
        nutrition: &[f64],
        ingredients: &[String],
        params: SearchParams,
    ) -> Result<Option<Vec<OutputRecord>>, RecommendError> {
        self.recommend_with(nutrition, ingredients, params, self.default_match)
    }

    /// Returns `Ok(None)` when no row survives the ingredient filter.
    pub fn recommend_with(
        &self,
        nutrition: &[f64],
        ingredients: &[String],
        params: SearchParams,
        policy: IngredientMatch,
    ) -> Result<Option<Vec<OutputRecord>>, RecommendError> {
        let vector = validate_vector(nutrition)?;
        params.validate()?;

        let keywords: Vec<String> = ingredients
            .iter()
            .map(|i| i.trim().to_lowercase())
            .filter(|i| !i.is_empty())
            .collect();

        let neighbors = if keywords.is_empty() {
            if self.index.is_empty() {
                return Ok(None);
            }
            self.index
                .query(&vector, params.n_neighbors, params.return_distance)?
        } else {
            let candidates = self.filter_rows(&keywords, policy);
            debug!(?keywords, ?policy, candidates = candidates.len(), "ingredient pre-filter");
            if candidates.is_empty() {
                return Ok(None);
            }
            self.index.query_within(
                &candidates,
                &vector,
                params.n_neighbors,
                params.return_distance,
            )?
        };

        let records = self.catalog.records();
        let mut seen = HashSet::with_capacity(neighbors.indices.len());
        let mut out = Vec::with_capacity(neighbors.indices.len());
        for (i, &row) in neighbors.indices.iter().enumerate() {
            let record = &records[row];
            if !seen.insert(record.id) {
                continue;
            }
            let distance = neighbors.distances.as_ref().map(|d| d[i]);
            out.push(OutputRecord::from_record(record, distance));
        }
        Ok(Some(out))
    }

    fn filter_rows(&self, keywords: &[String], policy: IngredientMatch) -> Vec<usize> {
        self.catalog
            .records()
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                let text = r.ingredient_text();
                match policy {
                    IngredientMatch::All => keywords.iter().all(|k| text.contains(k.as_str())),
                    IngredientMatch::Any => keywords.iter().any(|k| text.contains(k.as_str())),
                }
            })
            .map(|(row, _)| row)
            .collect()
    }
}
