//! K-nearest-neighbor imputation
//!
//! Missing cells are filled with the uniform mean of the `k` nearest donor
//! rows that observe the column. Distances use the NaN-aware Euclidean
//! metric: only coordinates observed in both rows are compared, and the
//! partial sum is scaled up by `n_columns / n_shared` so rows with few
//! shared coordinates are not artificially close.

use tracing::trace;

/// Default neighbor count
pub const DEFAULT_NEIGHBORS: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct KnnImputer {
    n_neighbors: usize,
}

impl Default for KnnImputer {
    fn default() -> Self {
        Self::new(DEFAULT_NEIGHBORS)
    }
}

impl KnnImputer {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors: n_neighbors.max(1),
        }
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    /// Fill every `None` cell of a row-major table.
    ///
    /// Every column must have at least one observed value. A row that shares
    /// no observed coordinate with any donor falls back to the observed
    /// column mean.
    pub fn impute(&self, rows: &[Vec<Option<f32>>]) -> Vec<Vec<f32>> {
        let n_cols = rows.first().map_or(0, Vec::len);
        let means = column_means(rows, n_cols);

        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                if row.iter().all(Option::is_some) {
                    return row.iter().map(|v| v.unwrap_or_default()).collect();
                }

                let distances: Vec<(usize, f32)> = rows
                    .iter()
                    .enumerate()
                    .filter(|&(r, _)| r != i)
                    .filter_map(|(r, other)| nan_euclidean(row, other).map(|d| (r, d)))
                    .collect();

                row.iter()
                    .enumerate()
                    .map(|(j, cell)| match cell {
                        Some(v) => *v,
                        None => self
                            .donor_mean(rows, &distances, j)
                            .or(means[j])
                            .unwrap_or_default(),
                    })
                    .collect()
            })
            .collect()
    }

    fn donor_mean(&self, rows: &[Vec<Option<f32>>], distances: &[(usize, f32)], col: usize) -> Option<f32> {
        let mut donors: Vec<(usize, f32, f32)> = distances
            .iter()
            .filter_map(|&(r, d)| rows[r][col].map(|v| (r, d, v)))
            .collect();
        if donors.is_empty() {
            return None;
        }

        donors.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        let k = self.n_neighbors.min(donors.len());
        let sum: f32 = donors[..k].iter().map(|&(_, _, v)| v).sum();
        trace!(col, k, "imputed from nearest donors");
        Some(sum / k as f32)
    }
}

/// NaN-aware Euclidean distance; `None` when no coordinate is shared
pub fn nan_euclidean(a: &[Option<f32>], b: &[Option<f32>]) -> Option<f32> {
    let mut shared = 0usize;
    let mut sum = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        if let (Some(x), Some(y)) = (x, y) {
            let d = x - y;
            sum += d * d;
            shared += 1;
        }
    }
    if shared == 0 {
        return None;
    }
    let scale = a.len() as f32 / shared as f32;
    Some((scale * sum).sqrt())
}

fn column_means(rows: &[Vec<Option<f32>>], n_cols: usize) -> Vec<Option<f32>> {
    (0..n_cols)
        .map(|j| {
            let observed: Vec<f32> = rows.iter().filter_map(|r| r[j]).collect();
            if observed.is_empty() {
                None
            } else {
                Some(observed.iter().sum::<f32>() / observed.len() as f32)
            }
        })
        .collect()
}
