//! # HostelRank Core
//!
//! Core data structures for the HostelRank recommender.
//!
//! - [`CandidateRecord`] - a raw hostel row with optional attributes
//! - [`FeatureCatalog`] - ordered feature columns with kind and direction
//! - [`DataPreprocessor`] - KNN imputation, flag coercion, one-hot encoding
//! - [`FeatureScaler`] - min-max scaling with clipping and reflection
//!
//! ## Example
//!
//! ```rust
//! use hostelrank_core::{CandidateRecord, DataPreprocessor, FeatureScaler};
//!
//! let mut near = CandidateRecord::new("Near");
//! near.distance_km = Some(0.5);
//! near.monthly_rent = Some(4000.0);
//! let mut far = CandidateRecord::new("Far");
//! far.distance_km = Some(4.0);
//!
//! let table = DataPreprocessor::default().process(vec![near, far]).unwrap();
//! let scaler = FeatureScaler::fit(&table).unwrap();
//! let scaled = scaler.transform_table(&table).unwrap();
//! assert_eq!(scaled.n_rows(), 2);
//! ```

pub mod catalog;
pub mod dataset;
pub mod error;
pub mod impute;
pub mod preprocess;
pub mod record;
pub mod scaler;
pub mod vector;

pub use catalog::{Attribute, Direction, FeatureCatalog, FeatureKind, FeatureSpec, UnknownAttribute};
pub use dataset::{load_json, load_records};
pub use error::{Error, Result};
pub use impute::KnnImputer;
pub use preprocess::{Candidate, DataPreprocessor, PreprocessedTable};
pub use record::{CandidateRecord, HostelType};
pub use scaler::{FeatureScaler, ScaledMatrix};
pub use vector::FeatureVector;
