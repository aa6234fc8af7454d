//! Fitted recommender state and the request pipeline
//!
//! [`RecommenderContext`] is produced by a single fit step and never mutated
//! afterwards. [`Recommender`] wraps it so that a refit can be swapped in
//! without readers ever observing a half-built context.

use crate::config::EngineConfig;
use crate::distance::{match_score, WeightedDistanceScorer};
use crate::error::{EngineError, RequestError};
use crate::explain::{Explainer, Recommendation, RecommendationStats, ScoredCandidate};
use crate::filter::TypeFilter;
use crate::query::{QueryVector, RecommendRequest};
use crate::rank::Ranker;
use crate::weights::{NormalizedWeights, WeightTable};
use hostelrank_core::{
    CandidateRecord, DataPreprocessor, Direction, FeatureCatalog, FeatureKind, FeatureScaler,
    FeatureVector, PreprocessedTable, ScaledMatrix,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info};

/// Description of one fitted feature column
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeatureSummary {
    pub name: String,
    pub label: String,
    pub kind: FeatureKind,
    pub direction: Direction,
    pub min: f32,
    pub max: f32,
    pub median: f32,
    pub weight: f32,
}

/// Everything fitted from one candidate dataset
#[derive(Debug, Clone)]
pub struct RecommenderContext {
    table: PreprocessedTable,
    scaler: FeatureScaler,
    matrix: ScaledMatrix,
    medians: FeatureVector,
    weight_table: WeightTable,
    weights: NormalizedWeights,
    config: EngineConfig,
}

impl RecommenderContext {
    /// Preprocess, fit the scaler and normalize weights
    ///
    /// A default weight set in `config` replaces the one carried by `weights`.
    pub fn fit(
        records: Vec<CandidateRecord>,
        weights: WeightTable,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let table = DataPreprocessor::new(config.imputation_neighbors).process(records)?;
        let scaler = FeatureScaler::fit(&table)?;
        let matrix = scaler.transform_table(&table)?;
        let medians = table.medians();

        let weight_table = match config.default_weight {
            Some(weight) => weights.with_default_weight(weight),
            None => weights,
        };
        let normalized = weight_table.normalize_for(table.catalog())?;

        info!(
            "Fitted recommender: {} candidates, {} features",
            table.len(),
            table.catalog().len()
        );

        Ok(Self {
            table,
            scaler,
            matrix,
            medians,
            weight_table,
            weights: normalized,
            config,
        })
    }

    pub fn table(&self) -> &PreprocessedTable {
        &self.table
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        self.table.catalog()
    }

    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    pub fn matrix(&self) -> &ScaledMatrix {
        &self.matrix
    }

    pub fn medians(&self) -> &FeatureVector {
        &self.medians
    }

    pub fn weight_table(&self) -> &WeightTable {
        &self.weight_table
    }

    pub fn weights(&self) -> &NormalizedWeights {
        &self.weights
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn feature_summaries(&self) -> Vec<FeatureSummary> {
        self.catalog()
            .iter()
            .enumerate()
            .map(|(j, spec)| FeatureSummary {
                name: spec.name.clone(),
                label: spec.label.clone(),
                kind: spec.kind,
                direction: spec.direction,
                min: self.scaler.data_min()[j],
                max: self.scaler.data_max()[j],
                median: self.medians[j],
                weight: self.weights.as_slice()[j],
            })
            .collect()
    }

    /// Score, filter, rank and explain one request
    pub fn recommend(&self, request: &RecommendRequest) -> Result<Recommendation, RequestError> {
        let filter = TypeFilter::parse(request.requested_type())?;

        let query = QueryVector::from_request(request, self.catalog(), &self.medians)?;
        debug!(
            "Query supplies {} of {} features, medians fill the rest",
            query.supplied().len(),
            self.catalog().len()
        );
        let scaled_query = self.scaler.transform(query.values())?;

        let weights = match &request.weights {
            Some(overrides) if !overrides.is_empty() => Cow::Owned(
                self.weight_table
                    .with_overrides(overrides)
                    .normalize_for(self.catalog())?,
            ),
            _ => Cow::Borrowed(&self.weights),
        };

        let distances = WeightedDistanceScorer::new(&weights).score_all(&self.matrix, &scaled_query)?;

        let eligible = filter.apply(self.table.candidates());
        if eligible.is_empty() {
            if let Some(requested) = filter.requested() {
                debug!("No candidates match hostel type {}", requested);
                return Ok(Recommendation::FilterEmpty { filter: requested });
            }
        }

        let k = request.k.unwrap_or(self.config.default_k);
        let ranked = Ranker::new(k).top_k(&distances, &eligible);

        let explainer = Explainer::new(self.config.top_matches, self.config.shortfall_threshold);
        let candidates = self.table.candidates();
        let results: Vec<ScoredCandidate> = ranked
            .into_iter()
            .map(|(index, distance)| ScoredCandidate {
                index,
                record: candidates[index].record.clone(),
                distance,
                match_score: match_score(distance),
                explanation: explainer.explain(
                    self.matrix.row(index),
                    scaled_query.as_slice(),
                    &weights,
                    self.catalog(),
                ),
            })
            .collect();

        debug!(
            "Ranked {} of {} eligible candidates (k={})",
            results.len(),
            eligible.len(),
            k
        );

        let stats = RecommendationStats::compute(&results, eligible.len());
        Ok(Recommendation::Ranked { results, stats })
    }
}

/// Shared handle to the current fitted context
pub struct Recommender {
    context: RwLock<Arc<RecommenderContext>>,
}

impl Recommender {
    pub fn new(context: RecommenderContext) -> Self {
        Self {
            context: RwLock::new(Arc::new(context)),
        }
    }

    pub fn from_records(
        records: Vec<CandidateRecord>,
        weights: WeightTable,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        Ok(Self::new(RecommenderContext::fit(records, weights, config)?))
    }

    /// The context current at the time of the call
    pub fn snapshot(&self) -> Arc<RecommenderContext> {
        self.context.read().clone()
    }

    pub fn recommend(&self, request: &RecommendRequest) -> Result<Recommendation, RequestError> {
        self.snapshot().recommend(request)
    }

    /// Refit on a new dataset with the current weights and config
    ///
    /// On failure the current context stays in place.
    pub fn refresh(&self, records: Vec<CandidateRecord>) -> Result<(), EngineError> {
        let current = self.snapshot();
        let next = RecommenderContext::fit(
            records,
            current.weight_table().clone(),
            current.config().clone(),
        )?;
        self.replace(next);
        Ok(())
    }

    /// Swap in a fitted context, returning the previous one
    pub fn replace(&self, context: RecommenderContext) -> Arc<RecommenderContext> {
        let next = Arc::new(context);
        let previous = std::mem::replace(&mut *self.context.write(), next);
        info!("Recommender context replaced ({} candidates)", self.snapshot().len());
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostelrank_core::HostelType;
    use std::collections::BTreeMap;

    fn record(name: &str, distance: f32, rent: f32, hostel_type: &str) -> CandidateRecord {
        let mut r = CandidateRecord::new(name);
        r.distance_km = Some(distance);
        r.monthly_rent = Some(rent);
        r.hostel_type = Some(hostel_type.to_string());
        r
    }

    fn three_records() -> Vec<CandidateRecord> {
        vec![
            record("R1", 1.0, 3000.0, "Gents"),
            record("R2", 5.0, 8000.0, "Ladies"),
            record("R3", 2.0, 4000.0, "Gents"),
        ]
    }

    fn distance_and_rent() -> WeightTable {
        WeightTable::new(BTreeMap::from([
            ("distance_km".to_string(), 10.0),
            ("monthly_rent".to_string(), 10.0),
        ]))
    }

    fn context() -> RecommenderContext {
        RecommenderContext::fit(three_records(), distance_and_rent(), EngineConfig::default()).unwrap()
    }

    fn names(recommendation: &Recommendation) -> Vec<&str> {
        recommendation
            .results()
            .iter()
            .map(|r| r.record.name.as_str())
            .collect()
    }

    #[test]
    fn test_end_to_end_ranking() {
        let request = RecommendRequest::new()
            .with_preference("distance_km", 1.0)
            .with_preference("monthly_rent", 3000.0)
            .with_hostel_type("Gents")
            .with_k(2);
        let recommendation = context().recommend(&request).unwrap();

        assert_eq!(names(&recommendation), vec!["R1", "R3"]);
        let best = &recommendation.results()[0];
        assert_eq!(best.distance, 0.0);
        assert_eq!(best.match_score, 1.0);
        assert!(recommendation.results()[1].distance > 0.0);

        let stats = recommendation.stats().unwrap();
        assert_eq!(stats.pool_size, 2);
        assert_eq!(stats.results_count, 2);
    }

    #[test]
    fn test_k_larger_than_pool() {
        let request = RecommendRequest::new().with_k(50);
        let recommendation = context().recommend(&request).unwrap();
        let results = recommendation.results();

        assert_eq!(results.len(), 3);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_filter_empty() {
        let records = vec![record("A", 1.0, 3000.0, "Gents"), record("B", 2.0, 4000.0, "Gents")];
        let ctx = RecommenderContext::fit(records, distance_and_rent(), EngineConfig::default()).unwrap();

        let recommendation = ctx
            .recommend(&RecommendRequest::new().with_hostel_type("Ladies"))
            .unwrap();
        assert!(matches!(
            recommendation,
            Recommendation::FilterEmpty {
                filter: HostelType::Ladies
            }
        ));
    }

    #[test]
    fn test_mixed_returns_whole_pool() {
        let mut records = three_records();
        records.push(record("R4", 3.0, 5000.0, "Dormitory"));
        let ctx = RecommenderContext::fit(records, distance_and_rent(), EngineConfig::default()).unwrap();

        let request = RecommendRequest::new().with_hostel_type("Mixed").with_k(10);
        assert_eq!(ctx.recommend(&request).unwrap().results().len(), 4);

        let gents = RecommendRequest::new().with_hostel_type("Gents").with_k(10);
        let gents_names = names(&ctx.recommend(&gents).unwrap())
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        assert!(!gents_names.contains(&"R2".to_string()));
        assert!(!gents_names.contains(&"R4".to_string()));
    }

    #[test]
    fn test_invalid_category() {
        let err = context()
            .recommend(&RecommendRequest::new().with_hostel_type("family"))
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidCategory(_)));
    }

    #[test]
    fn test_weight_overrides() {
        let ctx = context();
        let request = RecommendRequest::new()
            .with_preference("distance_km", 5.0)
            .with_preference("monthly_rent", 3000.0)
            .with_k(1);

        // With rent dominating, the cheapest hostel wins
        let rent_heavy = request.clone().with_weight("distance_km", 0.0);
        assert_eq!(names(&ctx.recommend(&rent_heavy).unwrap()), vec!["R1"]);

        // With distance dominating, the farthest one matches a far preference
        let distance_heavy = request.with_weight("monthly_rent", 0.0);
        assert_eq!(names(&ctx.recommend(&distance_heavy).unwrap()), vec!["R2"]);

        let bad = RecommendRequest::new().with_weight("swimming_pool", 1.0);
        assert!(matches!(
            ctx.recommend(&bad),
            Err(RequestError::InvalidWeights(_))
        ));
    }

    #[test]
    fn test_same_query_is_deterministic() {
        let ctx = context();
        let request = RecommendRequest::new()
            .with_preference("distance_km", 100.0)
            .with_preference("monthly_rent", -5.0);
        let first = ctx.recommend(&request).unwrap();
        let second = ctx.recommend(&request).unwrap();

        let d1: Vec<f64> = first.results().iter().map(|r| r.distance).collect();
        let d2: Vec<f64> = second.results().iter().map(|r| r.distance).collect();
        assert_eq!(d1, d2);
        assert!(first
            .results()
            .iter()
            .all(|r| r.match_score > 0.0 && r.match_score <= 1.0));
    }

    /// Candidates A, B, ... weighted on rating alone
    fn rating_only(ratings: &[f32]) -> RecommenderContext {
        let records = ratings
            .iter()
            .zip('A'..)
            .map(|(&rating, name)| {
                let mut r = CandidateRecord::new(name.to_string());
                r.rating = Some(rating);
                r
            })
            .collect();
        let weights = WeightTable::new(BTreeMap::from([("rating".to_string(), 1.0)])).with_default_weight(0.0);
        RecommenderContext::fit(records, weights, EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_nonzero_distance_never_scores_one() {
        let ctx = rating_only(&[1.0, 5.0]);
        let request = RecommendRequest::new()
            .with_preference("rating", 1.000_000_1)
            .with_k(1);
        let recommendation = ctx.recommend(&request).unwrap();

        let best = &recommendation.results()[0];
        assert_eq!(best.record.name, "A");
        assert!(best.distance > 0.0);
        assert!(best.match_score < 1.0);
    }

    #[test]
    fn test_huge_preference_is_clipped_to_fitted_max() {
        let ctx = rating_only(&[1.0, 2.0, 5.0]);
        let request = RecommendRequest::new().with_preference("rating", 1e39).with_k(1);
        let recommendation = ctx.recommend(&request).unwrap();

        assert_eq!(names(&recommendation), vec!["C"]);
        assert_eq!(recommendation.results()[0].distance, 0.0);
    }

    #[test]
    fn test_table_default_weight_kept_unless_configured() {
        let weights = distance_and_rent().with_default_weight(0.0);
        let ctx = RecommenderContext::fit(three_records(), weights.clone(), EngineConfig::default()).unwrap();
        assert_eq!(ctx.weights().get("wifi"), Some(0.0));

        let config = EngineConfig {
            default_weight: Some(0.5),
            ..EngineConfig::default()
        };
        let ctx = RecommenderContext::fit(three_records(), weights, config).unwrap();
        assert!(ctx.weights().get("wifi").unwrap() > 0.0);
        assert!((ctx.weights().sum() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_missing_weighted_feature_fails_fit() {
        let weights = WeightTable::new(BTreeMap::from([("rating".to_string(), 1.0)]));
        let err = RecommenderContext::fit(three_records(), weights, EngineConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::Schema(_)));
    }

    #[test]
    fn test_empty_dataset_fails_fit() {
        let err = RecommenderContext::fit(Vec::new(), WeightTable::default(), EngineConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(hostelrank_core::Error::EmptyDataset)
        ));
    }

    #[test]
    fn test_feature_summaries() {
        let ctx = context();
        let summaries = ctx.feature_summaries();
        assert_eq!(summaries.len(), ctx.catalog().len());

        let distance = summaries.iter().find(|s| s.name == "distance_km").unwrap();
        assert_eq!(distance.min, 1.0);
        assert_eq!(distance.max, 5.0);
        assert_eq!(distance.median, 2.0);
        assert_eq!(distance.direction, Direction::LowerIsBetter);
        assert!((summaries.iter().map(|s| s.weight).sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_refresh_swaps_context() {
        let recommender =
            Recommender::from_records(three_records(), distance_and_rent(), EngineConfig::default()).unwrap();
        let before = recommender.snapshot();
        assert_eq!(before.len(), 3);

        let mut records = three_records();
        records.push(record("R4", 0.5, 2500.0, "Mixed"));
        recommender.refresh(records).unwrap();
        assert_eq!(recommender.snapshot().len(), 4);
        // Old snapshots stay usable
        assert_eq!(before.len(), 3);

        assert!(recommender.refresh(Vec::new()).is_err());
        assert_eq!(recommender.snapshot().len(), 4);
    }
}
