//! Weight tables
//!
//! A [`WeightTable`] maps feature names to non-negative importance weights.
//! It is re-normalized against the catalog of a fitted table: every catalog
//! column receives either its listed weight or the default weight for
//! unlisted features, and the resulting vector is divided by its sum.

use hostelrank_core::{Attribute, FeatureCatalog};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weight given to catalog features absent from the table before normalization
pub const DEFAULT_UNLISTED_WEIGHT: f32 = 0.01;

fn default_unlisted_weight() -> f32 {
    DEFAULT_UNLISTED_WEIGHT
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightTable {
    /// Explicit weights keyed by feature name
    pub weights: BTreeMap<String, f32>,

    /// Weight for catalog features not listed in `weights`
    #[serde(default = "default_unlisted_weight")]
    pub default_weight: f32,
}

impl Default for WeightTable {
    /// distance 0.25, rent 0.20, safety 0.15, rating 0.10, food quality 0.08,
    /// then the amenity flags
    fn default() -> Self {
        let weights = Attribute::ALL
            .iter()
            .filter_map(|a| a.default_weight().map(|w| (a.key().to_string(), w)))
            .collect();
        Self::new(weights)
    }
}

impl WeightTable {
    pub fn new(weights: BTreeMap<String, f32>) -> Self {
        Self {
            weights,
            default_weight: DEFAULT_UNLISTED_WEIGHT,
        }
    }

    pub fn with_default_weight(mut self, weight: f32) -> Self {
        self.default_weight = weight;
        self
    }

    /// Copy of this table with some weights replaced or added
    ///
    /// Keys are canonicalized the same way as in [`normalize_for`](Self::normalize_for),
    /// so an override addressed by source column name replaces the listed key.
    pub fn with_overrides(&self, overrides: &BTreeMap<String, f32>) -> WeightTable {
        let mut weights: BTreeMap<String, f32> = self
            .weights
            .iter()
            .map(|(k, w)| (canonical_key(k), *w))
            .collect();
        for (name, weight) in overrides {
            weights.insert(canonical_key(name), *weight);
        }
        Self {
            weights,
            default_weight: self.default_weight,
        }
    }

    /// Validate against a catalog and normalize to sum to 1.0
    pub fn normalize_for(&self, catalog: &FeatureCatalog) -> Result<NormalizedWeights, SchemaError> {
        if catalog.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        if self.default_weight < 0.0 || !self.default_weight.is_finite() {
            return Err(SchemaError::NegativeWeight("<default>".to_string()));
        }

        let mut listed: BTreeMap<String, f32> = BTreeMap::new();
        for (name, &weight) in &self.weights {
            if weight < 0.0 || !weight.is_finite() {
                return Err(SchemaError::NegativeWeight(name.clone()));
            }
            let key = canonical_key(name);
            if !catalog.contains(&key) {
                return Err(SchemaError::MissingFeature(name.clone()));
            }
            listed.insert(key, weight);
        }

        let raw: Vec<f32> = catalog
            .names()
            .map(|name| listed.get(name).copied().unwrap_or(self.default_weight))
            .collect();

        let weight_sum: f32 = raw.iter().sum();
        if weight_sum <= 0.0 {
            return Err(SchemaError::ZeroTotalWeight);
        }

        Ok(NormalizedWeights {
            names: catalog.names().map(str::to_string).collect(),
            values: raw.into_iter().map(|w| w / weight_sum).collect(),
        })
    }
}

fn canonical_key(name: &str) -> String {
    FeatureCatalog::canonical_name(name)
}

/// Weights aligned with a catalog, summing to 1.0
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NormalizedWeights {
    names: Vec<String>,
    values: Vec<f32>,
}

impl NormalizedWeights {
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn sum(&self) -> f32 {
        self.values.iter().sum()
    }
}

/// Errors that can occur during weight validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Feature catalog cannot be empty")]
    EmptySchema,

    #[error("Feature '{0}' has negative weight")]
    NegativeWeight(String),

    #[error("Total weight cannot be zero")]
    ZeroTotalWeight,

    #[error("Weighted feature '{0}' is not present in the candidate table")]
    MissingFeature(String),
}
