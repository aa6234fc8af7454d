use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Dense feature values in catalog order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    data: Vec<f32>,
}

impl FeatureVector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    /// Weighted Euclidean distance: `sqrt(sum(w_i * (a_i - b_i)^2))`
    #[inline]
    pub fn weighted_distance(&self, other: &[f32], weights: &[f32]) -> f64 {
        if self.dim() != other.len() || self.dim() != weights.len() {
            return f64::INFINITY;
        }
        weighted_squared_sum(&self.data, other, weights).sqrt()
    }

    /// True if every component lies in `[0, 1]`
    pub fn is_unit_bounded(&self) -> bool {
        self.data.iter().all(|v| (0.0..=1.0).contains(v))
    }
}

impl Index<usize> for FeatureVector {
    type Output = f32;

    #[inline]
    fn index(&self, index: usize) -> &f32 {
        &self.data[index]
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

/// `sum(w_i * (a_i - b_i)^2)` over three equal-length slices
///
/// Accumulates in f64, so any differing component with a positive weight
/// yields a positive sum.
#[inline]
pub fn weighted_squared_sum(a: &[f32], b: &[f32], weights: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .zip(weights)
        .map(|((&x, &y), &w)| {
            let d = f64::from(x) - f64::from(y);
            f64::from(w) * d * d
        })
        .sum()
}

/// Narrow a finite f64 to f32, saturating at the f32 range
///
/// Non-finite input is `None`.
#[inline]
pub fn saturating_f32(value: f64) -> Option<f32> {
    value
        .is_finite()
        .then(|| value.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32)
}
