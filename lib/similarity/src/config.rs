use crate::explain::{DEFAULT_SHORTFALL_THRESHOLD, DEFAULT_TOP_MATCHES};
use hostelrank_core::impute::DEFAULT_NEIGHBORS;
use hostelrank_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tunables for fitting and serving a recommender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Donors averaged by the KNN imputer
    pub imputation_neighbors: usize,
    /// Result count when a request does not ask for one
    pub default_k: usize,
    pub top_matches: usize,
    pub shortfall_threshold: f32,
    /// Pre-normalization weight for features absent from the weight table;
    /// when unset the table's own `default_weight` applies
    pub default_weight: Option<f32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            imputation_neighbors: DEFAULT_NEIGHBORS,
            default_k: 5,
            top_matches: DEFAULT_TOP_MATCHES,
            shortfall_threshold: DEFAULT_SHORTFALL_THRESHOLD,
            default_weight: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.imputation_neighbors == 0 {
            return Err(Error::InvalidConfig(
                "imputation_neighbors must be at least 1".to_string(),
            ));
        }
        if self.default_k == 0 {
            return Err(Error::InvalidConfig("default_k must be at least 1".to_string()));
        }
        if !(self.shortfall_threshold.is_finite() && self.shortfall_threshold >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "shortfall_threshold must be a non-negative number, got {}",
                self.shortfall_threshold
            )));
        }
        if let Some(weight) = self.default_weight {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "default_weight must be a non-negative number, got {}",
                    weight
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.imputation_neighbors, 5);
        assert_eq!(config.default_k, 5);
        assert_eq!(config.top_matches, 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"default_k": 10}"#).unwrap();
        assert_eq!(config.default_k, 10);
        assert_eq!(config.shortfall_threshold, 0.5);
        assert_eq!(config.default_weight, None);

        let config: EngineConfig = serde_json::from_str(r#"{"default_weight": 0.05}"#).unwrap();
        assert_eq!(config.default_weight, Some(0.05));
    }

    #[test]
    fn test_invalid_values() {
        let zero_k = EngineConfig {
            default_k: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(zero_k.validate(), Err(Error::InvalidConfig(_))));

        let negative = EngineConfig {
            default_weight: Some(-1.0),
            ..EngineConfig::default()
        };
        assert!(matches!(negative.validate(), Err(Error::InvalidConfig(_))));
    }
}
