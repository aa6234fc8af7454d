//! # HostelRank
//!
//! A preference-driven hostel recommender.
//!
//! HostelRank fits a candidate table once (KNN imputation, min-max scaling,
//! direction reflection) and then answers preference queries with a
//! weighted Euclidean ranking, a hostel type filter and a per-result
//! explanation of which features matched and which fell short.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! hostelrank serve --data hostels.json --http-port 8080
//! curl -X POST localhost:8080/recommend \
//!   -H 'content-type: application/json' \
//!   -d '{"preferences": {"distance_km": 1.0, "monthly_rent": 4000}, "hostel_type": "Ladies", "k": 3}'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use hostelrank::prelude::*;
//!
//! let records = load_records("hostels.json").unwrap();
//! let recommender =
//!     Recommender::from_records(records, WeightTable::default(), EngineConfig::default()).unwrap();
//!
//! let request = RecommendRequest::new()
//!     .with_preference("distance_km", 1.0)
//!     .with_preference("monthly_rent", 4000)
//!     .with_hostel_type("Ladies")
//!     .with_k(3);
//! for result in recommender.recommend(&request).unwrap().results() {
//!     println!("{} ({:.3})", result.record.name, result.match_score);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - `hostelrank-core` - records, feature catalog, imputation, scaling
//! - `hostelrank-similarity` - weights, scoring, filtering, ranking, explanations
//! - `hostelrank-api` - REST API

// Re-export core types
pub use hostelrank_core::{
    load_json, load_records, Attribute, CandidateRecord, DataPreprocessor, Direction, Error,
    FeatureCatalog, FeatureScaler, FeatureSpec, FeatureVector, HostelType, KnnImputer,
    PreprocessedTable, Result,
};

// Re-export the ranking engine
pub use hostelrank_similarity::{
    EngineConfig, EngineError, Explanation, Recommendation, RecommendRequest, Recommender,
    RecommenderContext, RequestError, SchemaError, ScoredCandidate, WeightTable,
};

// Re-export API
pub use hostelrank_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        load_records, CandidateRecord, EngineConfig, Error, HostelType, Recommendation,
        RecommendRequest, Recommender, Result, RestApi, WeightTable,
    };
}
