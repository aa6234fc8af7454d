//! Explainability for ranked recommendations
//!
//! Every selected candidate gets a per-feature breakdown computed from the
//! already-scaled row and query:
//!
//! `contribution_i = (1 - |x_i - q_i|) * w_i`
//!
//! using the same normalized weights as the scorer. Higher means better
//! alignment on that feature.

use crate::weights::NormalizedWeights;
use hostelrank_core::{CandidateRecord, FeatureCatalog, HostelType};
use serde::Serialize;

/// Number of features reported as top matches
pub const DEFAULT_TOP_MATCHES: usize = 3;

/// Contributions below this value are reported as shortfalls
pub const DEFAULT_SHORTFALL_THRESHOLD: f32 = 0.5;

/// One feature's share of the match
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeatureContribution {
    /// Catalog feature name
    pub feature: String,
    /// Human-readable label
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Explanation {
    /// Highest contributions, best first
    pub top_matches: Vec<FeatureContribution>,
    /// Every contribution below the threshold, in catalog order
    pub shortfalls: Vec<FeatureContribution>,
}

#[derive(Debug, Clone, Copy)]
pub struct Explainer {
    top_n: usize,
    threshold: f32,
}

impl Default for Explainer {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_MATCHES, DEFAULT_SHORTFALL_THRESHOLD)
    }
}

impl Explainer {
    pub fn new(top_n: usize, threshold: f32) -> Self {
        Self { top_n, threshold }
    }

    /// Per-feature contributions in catalog order
    pub fn contributions(&self, row: &[f32], query: &[f32], weights: &NormalizedWeights) -> Vec<f32> {
        row.iter()
            .zip(query)
            .zip(weights.as_slice())
            .map(|((x, q), w)| (1.0 - (x - q).abs()) * w)
            .collect()
    }

    pub fn explain(
        &self,
        row: &[f32],
        query: &[f32],
        weights: &NormalizedWeights,
        catalog: &FeatureCatalog,
    ) -> Explanation {
        let scores = self.contributions(row, query, weights);
        let entry = |i: usize| {
            let spec = catalog.get(i);
            FeatureContribution {
                feature: spec.map(|s| s.name.clone()).unwrap_or_default(),
                label: spec.map(|s| s.label.clone()).unwrap_or_default(),
                score: scores[i],
            }
        };

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        Explanation {
            top_matches: order.iter().take(self.top_n).map(|&i| entry(i)).collect(),
            shortfalls: (0..scores.len())
                .filter(|&i| scores[i] < self.threshold)
                .map(entry)
                .collect(),
        }
    }
}

/// A ranked candidate with its score and explanation
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    /// Row index in the candidate table
    pub index: usize,
    #[serde(flatten)]
    pub record: CandidateRecord,
    pub distance: f64,
    pub match_score: f64,
    pub explanation: Explanation,
}

/// Summary statistics for one recommendation request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationStats {
    /// Candidates left after the type filter
    pub pool_size: usize,
    pub results_count: usize,
    pub best_score: f64,
    pub avg_score: f64,
    /// Feature that contributed most to the best result
    pub top_contributing_feature: Option<String>,
}

impl RecommendationStats {
    pub fn compute(results: &[ScoredCandidate], pool_size: usize) -> Self {
        if results.is_empty() {
            return Self {
                pool_size,
                results_count: 0,
                best_score: 0.0,
                avg_score: 0.0,
                top_contributing_feature: None,
            };
        }

        let avg_score = results.iter().map(|r| r.match_score).sum::<f64>() / results.len() as f64;
        // Results are sorted
        let best = &results[0];

        Self {
            pool_size,
            results_count: results.len(),
            best_score: best.match_score,
            avg_score,
            top_contributing_feature: best.explanation.top_matches.first().map(|c| c.feature.clone()),
        }
    }
}

/// Response for one recommendation request
///
/// `FilterEmpty` is a normal outcome: the type filter excluded every
/// candidate. It is distinct from an empty dataset, which cannot be fitted.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Recommendation {
    Ranked {
        results: Vec<ScoredCandidate>,
        stats: RecommendationStats,
    },
    FilterEmpty {
        filter: HostelType,
    },
}

impl Recommendation {
    pub fn results(&self) -> &[ScoredCandidate] {
        match self {
            Recommendation::Ranked { results, .. } => results,
            Recommendation::FilterEmpty { .. } => &[],
        }
    }

    pub fn is_filter_empty(&self) -> bool {
        matches!(self, Recommendation::FilterEmpty { .. })
    }

    pub fn stats(&self) -> Option<&RecommendationStats> {
        match self {
            Recommendation::Ranked { stats, .. } => Some(stats),
            Recommendation::FilterEmpty { .. } => None,
        }
    }
}
