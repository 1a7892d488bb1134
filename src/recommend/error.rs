use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecommendError {
    #[error("nutrition_input must have {expected} values, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },
    #[error("nutrition_input[{position}] is not a finite number")]
    NonFiniteComponent { position: usize },
    #[error("n_neighbors must be a positive integer")]
    InvalidNeighbors,
}
