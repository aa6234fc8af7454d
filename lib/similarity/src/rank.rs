//! Top-K selection over the filtered pool

use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;

/// Selects the `k` smallest-distance candidates.
///
/// Equal distances are ordered by table index, so results are deterministic
/// regardless of how the pool was assembled.
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    k: usize,
}

impl Ranker {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    /// Returns `(index, distance)` pairs in ascending distance order.
    ///
    /// `distances` covers the full table; `eligible` lists the indices that
    /// passed the type filter. At most `min(k, eligible.len())` pairs are
    /// returned.
    pub fn top_k(&self, distances: &[f64], eligible: &[usize]) -> Vec<(usize, f64)> {
        let k = self.k.min(eligible.len());
        if k == 0 {
            return Vec::new();
        }

        // Max-heap on (distance, index): the worst kept candidate sits on top
        let mut heap: BinaryHeap<(OrderedFloat<f64>, usize)> = BinaryHeap::with_capacity(k + 1);
        for &idx in eligible {
            let Some(&dist) = distances.get(idx) else {
                continue;
            };
            heap.push((OrderedFloat(dist), idx));
            if heap.len() > k {
                heap.pop();
            }
        }

        heap.into_sorted_vec()
            .into_iter()
            .map(|(dist, idx)| (idx, dist.into_inner()))
            .collect()
    }
}
