//! Min-max feature scaling with direction reflection
//!
//! The scaler is fitted once on the preprocessed table and then reused for
//! every query. Query values outside the fitted range are clipped, so every
//! scaled component lies in `[0, 1]`. Columns flagged
//! [`Direction::LowerIsBetter`] are reflected (`v <- 1 - v`) after scaling.

use crate::catalog::{Direction, FeatureCatalog};
use crate::preprocess::PreprocessedTable;
use crate::vector::FeatureVector;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ranges below this are treated as constant columns
const RANGE_EPSILON: f32 = 1e-10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureScaler {
    names: Vec<String>,
    data_min: Vec<f32>,
    data_max: Vec<f32>,
    directions: Vec<Direction>,
}

impl FeatureScaler {
    /// Fit per-column min/max over a preprocessed table
    pub fn fit(table: &PreprocessedTable) -> Result<Self> {
        Self::fit_rows(table.rows(), table.catalog())
    }

    pub fn fit_rows(rows: &[FeatureVector], catalog: &FeatureCatalog) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let dim = catalog.len();
        let mut data_min = vec![f32::INFINITY; dim];
        let mut data_max = vec![f32::NEG_INFINITY; dim];

        for row in rows {
            if row.dim() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: row.dim(),
                });
            }
            for (j, &val) in row.as_slice().iter().enumerate() {
                if val < data_min[j] {
                    data_min[j] = val;
                }
                if val > data_max[j] {
                    data_max[j] = val;
                }
            }
        }

        Ok(Self {
            names: catalog.names().map(str::to_string).collect(),
            data_min,
            data_max,
            directions: catalog.iter().map(|f| f.direction).collect(),
        })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.data_min.len()
    }

    pub fn data_min(&self) -> &[f32] {
        &self.data_min
    }

    pub fn data_max(&self) -> &[f32] {
        &self.data_max
    }

    /// Clip, scale to `[0, 1]` and reflect one vector
    pub fn transform(&self, vector: &FeatureVector) -> Result<FeatureVector> {
        if vector.dim() != self.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                actual: vector.dim(),
            });
        }

        let scaled = vector
            .as_slice()
            .iter()
            .enumerate()
            .map(|(j, &val)| {
                let clipped = val.clamp(self.data_min[j], self.data_max[j]);
                if clipped != val {
                    debug!(
                        feature = %self.names[j],
                        value = val,
                        clipped,
                        "query value outside fitted range"
                    );
                }
                self.scale(j, clipped)
            })
            .collect();

        Ok(FeatureVector::new(scaled))
    }

    /// Scale every row of the fitted table into a contiguous matrix
    pub fn transform_table(&self, table: &PreprocessedTable) -> Result<ScaledMatrix> {
        let mut data = Vec::with_capacity(table.len() * self.dim());
        for row in table.rows() {
            data.extend(self.transform(row)?.into_inner());
        }
        Ok(ScaledMatrix {
            data,
            n_rows: table.len(),
            dim: self.dim(),
        })
    }

    #[inline]
    fn scale(&self, j: usize, val: f32) -> f32 {
        let range = self.data_max[j] - self.data_min[j];
        let scaled = if range.abs() > RANGE_EPSILON {
            ((val - self.data_min[j]) / range).clamp(0.0, 1.0)
        } else {
            0.0
        };
        match self.directions[j] {
            Direction::HigherIsBetter => scaled,
            Direction::LowerIsBetter => 1.0 - scaled,
        }
    }
}

/// Row-major matrix of scaled candidate features
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledMatrix {
    data: Vec<f32>,
    n_rows: usize,
    dim: usize,
}

impl ScaledMatrix {
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dim.max(1)).take(self.n_rows)
    }
}
