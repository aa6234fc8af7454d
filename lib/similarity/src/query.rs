//! Recommendation requests and query vector construction

use crate::error::RequestError;
use hostelrank_core::vector::saturating_f32;
use hostelrank_core::{FeatureCatalog, FeatureVector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Preference keys that carry the hostel type rather than a feature value
const TYPE_KEYS: [&str; 2] = ["hostel_type", "Hostel_Type"];

/// One recommendation request
///
/// `preferences` maps feature names (snake_case keys or source column
/// names) to desired values. The hostel type may be given either as
/// `hostel_type` or inside `preferences`; the top-level field wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecommendRequest {
    #[serde(default)]
    pub preferences: BTreeMap<String, Value>,
    #[serde(default)]
    pub hostel_type: Option<String>,
    #[serde(default)]
    pub k: Option<usize>,
    /// Per-request weight overrides, merged over the configured table
    #[serde(default)]
    pub weights: Option<BTreeMap<String, f32>>,
}

impl RecommendRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preference(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.preferences.insert(key.into(), value.into());
        self
    }

    pub fn with_hostel_type(mut self, hostel_type: impl Into<String>) -> Self {
        self.hostel_type = Some(hostel_type.into());
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    pub fn with_weight(mut self, feature: impl Into<String>, weight: f32) -> Self {
        self.weights
            .get_or_insert_with(BTreeMap::new)
            .insert(feature.into(), weight);
        self
    }

    /// Requested hostel type, falling back to the preference mapping
    pub fn requested_type(&self) -> Option<&str> {
        self.hostel_type.as_deref().or_else(|| {
            TYPE_KEYS
                .iter()
                .find_map(|key| self.preferences.get(*key).and_then(Value::as_str))
        })
    }
}

/// Raw (unscaled) query values in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct QueryVector {
    values: FeatureVector,
    /// Catalog columns the caller actually supplied
    supplied: Vec<String>,
}

impl QueryVector {
    /// Build a query from a request's preferences
    ///
    /// Missing features take the table median; unrecognized keys and
    /// unreadable values are ignored.
    pub fn from_request(
        request: &RecommendRequest,
        catalog: &FeatureCatalog,
        medians: &FeatureVector,
    ) -> Result<Self, RequestError> {
        if medians.dim() != catalog.len() {
            return Err(hostelrank_core::Error::DimensionMismatch {
                expected: catalog.len(),
                actual: medians.dim(),
            }
            .into());
        }

        let mut values = medians.clone();
        let mut supplied = Vec::new();

        for (key, raw) in &request.preferences {
            if TYPE_KEYS.contains(&key.as_str()) {
                continue;
            }

            let Some(position) = resolve(key, catalog) else {
                debug!("Ignoring unrecognized preference '{}'", key);
                continue;
            };

            match preference_value(raw) {
                Some(v) => {
                    values.as_mut_slice()[position] = v;
                    if let Some(spec) = catalog.get(position) {
                        supplied.push(spec.name.clone());
                    }
                }
                None => debug!("Preference '{}' has no usable value, using median", key),
            }
        }

        Ok(Self { values, supplied })
    }

    pub fn values(&self) -> &FeatureVector {
        &self.values
    }

    pub fn supplied(&self) -> &[String] {
        &self.supplied
    }

    pub fn into_inner(self) -> FeatureVector {
        self.values
    }
}

/// Catalog position for a preference key: an attribute alias or a column name
fn resolve(key: &str, catalog: &FeatureCatalog) -> Option<usize> {
    catalog.position(&FeatureCatalog::canonical_name(key))
}

/// Numbers beyond the f32 range saturate so the scaler clips them
fn preference_value(raw: &Value) -> Option<f32> {
    match raw {
        Value::Number(n) => n.as_f64().and_then(saturating_f32),
        Value::Bool(b) => Some(f32::from(u8::from(*b))),
        Value::String(s) => {
            let s = s.trim();
            match s.to_lowercase().as_str() {
                "yes" | "true" | "y" => Some(1.0),
                "no" | "false" | "n" => Some(0.0),
                _ => s.parse::<f64>().ok().and_then(saturating_f32),
            }
        }
        _ => None,
    }
}
