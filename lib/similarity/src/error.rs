use crate::weights::SchemaError;
use thiserror::Error;

/// Failures while building a recommender context; these abort startup
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] hostelrank_core::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Failures rejected at the request boundary
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Invalid hostel type '{0}': expected Gents, Ladies or Mixed")]
    InvalidCategory(String),

    #[error("Invalid weight override: {0}")]
    InvalidWeights(#[from] SchemaError),

    #[error(transparent)]
    Core(#[from] hostelrank_core::Error),
}
