//! Exact nearest-neighbour search over recipe nutrition vectors.
//!
//! Distances are plain Euclidean over raw units (kcal, grams, milligrams) with no
//! scaling, so high-magnitude columns such as sodium and calories dominate.

use std::cmp::Ordering;

use super::error::RecommendError;
use crate::recipes::{RecipeRecord, NUTRITION_DIM};

pub type FeatureVector = [f64; NUTRITION_DIM];

#[derive(Debug, Clone, PartialEq)]
pub struct Neighbors {
    /// Row positions in the indexed dataset, nearest first.
    pub indices: Vec<usize>,
    /// Parallel to `indices` when distances were requested.
    pub distances: Option<Vec<f64>>,
}

impl Neighbors {
    fn empty(return_distance: bool) -> Self {
        Self {
            indices: Vec::new(),
            distances: return_distance.then(Vec::new),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    rows: Vec<FeatureVector>,
}

impl FeatureIndex {
    pub fn build(records: &[RecipeRecord]) -> Self {
        Self {
            rows: records.iter().map(|r| r.nutrition.to_vector()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The `k` nearest rows of the whole dataset. `k` is clamped to the row count.
    pub fn query(
        &self,
        vector: &[f64],
        k: usize,
        return_distance: bool,
    ) -> Result<Neighbors, RecommendError> {
        let vector = validate_vector(vector)?;
        Ok(self.search(0..self.rows.len(), &vector, k, return_distance))
    }

    /// Like [`FeatureIndex::query`] restricted to `candidates`. Equal distances keep
    /// candidate order; out-of-range positions are ignored.
    pub fn query_within(
        &self,
        candidates: &[usize],
        vector: &[f64],
        k: usize,
        return_distance: bool,
    ) -> Result<Neighbors, RecommendError> {
        let vector = validate_vector(vector)?;
        Ok(self.search(candidates.iter().copied(), &vector, k, return_distance))
    }

    fn search(
        &self,
        candidates: impl Iterator<Item = usize>,
        vector: &FeatureVector,
        k: usize,
        return_distance: bool,
    ) -> Neighbors {
        // (distance, candidate order, row)
        let mut scored: Vec<(f64, usize, usize)> = candidates
            .filter_map(|row| self.rows.get(row).map(|feat| (row, feat)))
            .enumerate()
            .map(|(order, (row, feat))| (euclidean(feat, vector), order, row))
            .collect();

        let k = k.min(scored.len());
        if k == 0 {
            return Neighbors::empty(return_distance);
        }

        let cmp = |a: &(f64, usize, usize), b: &(f64, usize, usize)| -> Ordering {
            a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
        };
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, cmp);
            scored.truncate(k);
        }
        scored.sort_unstable_by(cmp);

        Neighbors {
            indices: scored.iter().map(|s| s.2).collect(),
            distances: return_distance.then(|| scored.iter().map(|s| s.0).collect()),
        }
    }
}

/// Checks length and finiteness of a caller-supplied nutrition vector.
pub fn validate_vector(vector: &[f64]) -> Result<FeatureVector, RecommendError> {
    let out = FeatureVector::try_from(vector).map_err(|_| RecommendError::InvalidDimension {
        expected: NUTRITION_DIM,
        actual: vector.len(),
    })?;
    if let Some(position) = out.iter().position(|v| !v.is_finite()) {
        return Err(RecommendError::NonFiniteComponent { position });
    }
    Ok(out)
}

#[inline]
fn euclidean(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::Nutrition;

    fn record(id: i64, calories: f64) -> RecipeRecord {
        let mut v = [0.0; NUTRITION_DIM];
        v[0] = calories;
        RecipeRecord::new(id, format!("r{}", id), vec![], Nutrition::from_vector(v))
    }

    fn query_at(calories: f64) -> Vec<f64> {
        let mut q = vec![0.0; NUTRITION_DIM];
        q[0] = calories;
        q
    }

    #[test]
    fn euclidean_known_value() {
        let a = [0.0; NUTRITION_DIM];
        let mut b = [0.0; NUTRITION_DIM];
        b[0] = 3.0;
        b[4] = 4.0;
        assert_eq!(euclidean(&a, &b), 5.0);
        assert_eq!(euclidean(&b, &b), 0.0);
    }

    #[test]
    fn returns_nearest_in_ascending_order() {
        let idx = FeatureIndex::build(&[record(0, 100.0), record(1, 500.0), record(2, 290.0), record(3, 330.0)]);
        let n = idx.query(&query_at(300.0), 3, true).unwrap();
        assert_eq!(n.indices, vec![2, 3, 0]);
        assert_eq!(n.distances, Some(vec![10.0, 30.0, 200.0]));
    }

    #[test]
    fn distances_absent_unless_requested() {
        let idx = FeatureIndex::build(&[record(0, 1.0)]);
        let n = idx.query(&query_at(0.0), 1, false).unwrap();
        assert_eq!(n.indices, vec![0]);
        assert!(n.distances.is_none());
    }

    #[test]
    fn ties_keep_row_order() {
        let idx = FeatureIndex::build(&[
            record(0, 90.0),
            record(1, 110.0),
            record(2, 110.0),
            record(3, 90.0),
            record(4, 500.0),
        ]);
        let n = idx.query(&query_at(100.0), 4, false).unwrap();
        assert_eq!(n.indices, vec![0, 1, 2, 3]);
        let n = idx.query(&query_at(100.0), 2, false).unwrap();
        assert_eq!(n.indices, vec![0, 1]);
    }

    #[test]
    fn k_is_clamped_to_rows() {
        let idx = FeatureIndex::build(&[record(0, 1.0), record(1, 2.0)]);
        let n = idx.query(&query_at(0.0), 50, true).unwrap();
        assert_eq!(n.indices, vec![0, 1]);
        assert_eq!(n.distances.unwrap().len(), 2);
    }

    #[test]
    fn empty_index_yields_no_neighbors() {
        let idx = FeatureIndex::default();
        let n = idx.query(&query_at(0.0), 5, true).unwrap();
        assert!(n.indices.is_empty());
        assert_eq!(n.distances, Some(vec![]));
    }

    #[test]
    fn rejects_wrong_dimension() {
        let idx = FeatureIndex::build(&[record(0, 1.0)]);
        assert_eq!(
            idx.query(&[1.0, 2.0], 1, false).unwrap_err(),
            RecommendError::InvalidDimension { expected: 9, actual: 2 }
        );
        assert!(matches!(
            idx.query(&vec![0.0; 10], 1, false),
            Err(RecommendError::InvalidDimension { actual: 10, .. })
        ));
    }

    #[test]
    fn rejects_non_finite_components() {
        let mut q = query_at(0.0);
        q[3] = f64::NAN;
        assert_eq!(
            validate_vector(&q).unwrap_err(),
            RecommendError::NonFiniteComponent { position: 3 }
        );
    }

    #[test]
    fn query_within_restricts_candidates() {
        let idx = FeatureIndex::build(&[record(0, 300.0), record(1, 310.0), record(2, 1000.0)]);
        let n = idx.query_within(&[1, 2, 99], &query_at(300.0), 5, false).unwrap();
        assert_eq!(n.indices, vec![1, 2]);
        let n = idx.query_within(&[], &query_at(300.0), 5, false).unwrap();
        assert!(n.indices.is_empty());
    }

    #[test]
    fn query_within_ties_keep_candidate_order() {
        let idx = FeatureIndex::build(&[
            record(0, 90.0),
            record(1, 500.0),
            record(2, 110.0),
            record(3, 110.0),
        ]);
        let n = idx.query_within(&[3, 1, 0, 2], &query_at(100.0), 3, true).unwrap();
        assert_eq!(n.indices, vec![3, 0, 2]);
        assert_eq!(n.distances.unwrap(), vec![10.0, 10.0, 10.0]);

        let n = idx.query_within(&[2, 0], &query_at(100.0), 1, false).unwrap();
        assert_eq!(n.indices, vec![2]);
    }
}
