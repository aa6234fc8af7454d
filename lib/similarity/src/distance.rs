//! Weighted Euclidean distance over the scaled feature space
//!
//! `distance(x, q) = sqrt(sum_i w_i * (x_i - q_i)^2)` with weights that sum to
//! 1.0 and features scaled into `[0, 1]`, so distances lie in `[0, 1]`.

use crate::weights::NormalizedWeights;
use hostelrank_core::vector::weighted_squared_sum;
use hostelrank_core::{Error, FeatureVector, ScaledMatrix};

/// Largest f64 below 1.0
const MAX_INEXACT_SCORE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Inverse-distance similarity in `(0, 1]`, equal to 1 only at distance 0
///
/// Distances too small to move `1 / (1 + d)` off 1.0 still score below 1.
#[inline]
pub fn match_score(distance: f64) -> f64 {
    let score = 1.0 / (1.0 + distance);
    if distance > 0.0 {
        score.min(MAX_INEXACT_SCORE)
    } else {
        score
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WeightedDistanceScorer<'a> {
    weights: &'a NormalizedWeights,
}

impl<'a> WeightedDistanceScorer<'a> {
    pub fn new(weights: &'a NormalizedWeights) -> Self {
        Self { weights }
    }

    /// Distance from the query to every row of the matrix, in row order
    pub fn score_all(&self, matrix: &ScaledMatrix, query: &FeatureVector) -> Result<Vec<f64>, Error> {
        self.check_dim(query.dim())?;
        self.check_dim(matrix.dim())?;

        let q = query.as_slice();
        let w = self.weights.as_slice();
        Ok(matrix
            .rows()
            .map(|row| weighted_squared_sum(row, q, w).sqrt())
            .collect())
    }

    /// Distance from the query to a single scaled row
    pub fn distance(&self, row: &[f32], query: &FeatureVector) -> f64 {
        query.weighted_distance(row, self.weights.as_slice())
    }

    fn check_dim(&self, actual: usize) -> Result<(), Error> {
        if actual != self.weights.len() {
            return Err(Error::DimensionMismatch {
                expected: self.weights.len(),
                actual,
            });
        }
        Ok(())
    }
}
