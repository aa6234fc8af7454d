//! # HostelRank Similarity
//!
//! Weighted-distance ranking over a fitted candidate table.
//!
//! ## Features
//!
//! - **Weight tables**: per-feature importance, re-normalized against the
//!   columns a dataset actually carries
//! - **Weighted Euclidean scoring**: one batched pass over the scaled matrix
//! - **Type filtering**: Gents / Ladies / Mixed gate applied before ranking
//! - **Explainability**: per-feature contributions, top matches and shortfalls
//!
//! ## Example
//!
//! ```rust
//! use hostelrank_core::CandidateRecord;
//! use hostelrank_similarity::{EngineConfig, RecommendRequest, Recommender, WeightTable};
//! use std::collections::BTreeMap;
//!
//! let mut near = CandidateRecord::new("Near");
//! near.distance_km = Some(0.5);
//! near.monthly_rent = Some(4500.0);
//! near.hostel_type = Some("Gents".to_string());
//! let mut cheap = CandidateRecord::new("Cheap");
//! cheap.distance_km = Some(3.0);
//! cheap.monthly_rent = Some(2500.0);
//! cheap.hostel_type = Some("Mixed".to_string());
//!
//! let weights = WeightTable::new(BTreeMap::from([
//!     ("distance_km".to_string(), 0.6),
//!     ("monthly_rent".to_string(), 0.4),
//! ]));
//! let recommender =
//!     Recommender::from_records(vec![near, cheap], weights, EngineConfig::default()).unwrap();
//!
//! let request = RecommendRequest::new()
//!     .with_preference("distance_km", 0.5)
//!     .with_hostel_type("Gents")
//!     .with_k(1);
//! let recommendation = recommender.recommend(&request).unwrap();
//! assert_eq!(recommendation.results()[0].record.name, "Near");
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Request   │────>│ QueryVector │────>│   Scaler    │
//! │ (prefs, k)  │     │  (medians)  │     │ (clip, 0-1) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │ TypeFilter  │<────│   Scorer    │
//!                     │             │     │ (weighted)  │
//!                     └─────────────┘     └─────────────┘
//!                            │
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │   Ranker    │────>│  Explainer  │
//!                     │   (top K)   │     │             │
//!                     └─────────────┘     └─────────────┘
//! ```

pub mod config;
pub mod distance;
pub mod engine;
pub mod error;
pub mod explain;
pub mod filter;
pub mod query;
pub mod rank;
pub mod weights;

// Re-export main types for convenience
pub use config::EngineConfig;
pub use distance::{match_score, WeightedDistanceScorer};
pub use engine::{FeatureSummary, Recommender, RecommenderContext};
pub use error::{EngineError, RequestError};
pub use explain::{
    Explainer, Explanation, FeatureContribution, Recommendation, RecommendationStats,
    ScoredCandidate,
};
pub use filter::{Filter, TypeFilter};
pub use query::{QueryVector, RecommendRequest};
pub use rank::Ranker;
pub use weights::{NormalizedWeights, SchemaError, WeightTable, DEFAULT_UNLISTED_WEIGHT};
