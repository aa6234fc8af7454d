//! Candidate table preprocessing
//!
//! Turns raw [`CandidateRecord`]s into a fully numeric table:
//!
//! 1. numeric attributes are KNN-imputed over the columns the dataset
//!    actually carries
//! 2. amenity flags are coerced to {0, 1}
//! 3. hostel type labels are trimmed and normalized
//! 4. the observed hostel types are one-hot encoded, dropping the first
//!    one as the reference category
//!
//! A record without a single usable numeric value aborts preprocessing.

use crate::catalog::{Attribute, FeatureCatalog, FeatureKind, FeatureSpec};
use crate::impute::{KnnImputer, DEFAULT_NEIGHBORS};
use crate::record::{CandidateRecord, HostelType};
use crate::vector::FeatureVector;
use crate::{Error, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// A cleaned candidate with its stable row index
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Candidate {
    /// Position in the preprocessed table, used as the ranking tie-break
    pub index: usize,
    /// Record with imputed numerics, coerced flags and normalized type label
    pub record: CandidateRecord,
    /// Normalized category, `None` when the label was missing or unknown
    #[serde(skip)]
    pub hostel_type: Option<HostelType>,
}

/// Output of [`DataPreprocessor::process`]
#[derive(Debug, Clone)]
pub struct PreprocessedTable {
    candidates: Vec<Candidate>,
    catalog: FeatureCatalog,
    rows: Vec<FeatureVector>,
}

impl PreprocessedTable {
    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Raw (unscaled) feature rows in catalog order
    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    /// Per-column median over the preprocessed values
    pub fn medians(&self) -> FeatureVector {
        let medians = (0..self.catalog.len())
            .map(|j| {
                let mut column: Vec<f32> = self.rows.iter().map(|r| r[j]).collect();
                median(&mut column)
            })
            .collect::<Vec<_>>();
        FeatureVector::new(medians)
    }
}

/// Median of a column; the mean of the two middle values for even lengths
pub fn median(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[derive(Debug, Clone)]
pub struct DataPreprocessor {
    imputer: KnnImputer,
}

impl Default for DataPreprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_NEIGHBORS)
    }
}

impl DataPreprocessor {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            imputer: KnnImputer::new(n_neighbors),
        }
    }

    pub fn process(&self, records: Vec<CandidateRecord>) -> Result<PreprocessedTable> {
        if records.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let numeric = present_numeric_attributes(&records);
        for attr in Attribute::NUMERIC.iter().filter(|a| !numeric.contains(a)) {
            warn!(feature = %attr, "numeric column has no observed values; dropping it");
        }

        for (row, record) in records.iter().enumerate() {
            if numeric.iter().all(|&a| record.numeric(a).is_none()) {
                return Err(Error::Imputation {
                    row,
                    name: record.name.clone(),
                });
            }
        }

        let raw: Vec<Vec<Option<f32>>> = records
            .iter()
            .map(|r| numeric.iter().map(|&a| r.numeric(a)).collect())
            .collect();
        let missing = raw.iter().flatten().filter(|v| v.is_none()).count();
        let imputed = self.imputer.impute(&raw);
        debug!(
            missing,
            neighbors = self.imputer.n_neighbors(),
            "KNN imputation applied"
        );

        let mut candidates = Vec::with_capacity(records.len());
        for (index, (mut record, values)) in records.into_iter().zip(imputed).enumerate() {
            for (&attr, value) in numeric.iter().zip(values) {
                record.set_numeric(attr, value);
            }
            for attr in Attribute::BINARY {
                let on = record.flag(attr) == 1;
                record.set_flag(attr, on);
            }

            let hostel_type = record.hostel_type.as_deref().and_then(HostelType::normalize);
            if let Some(t) = hostel_type {
                record.hostel_type = Some(t.to_string());
            } else if let Some(label) = record.hostel_type.take() {
                warn!(name = %record.name, label = %label, "unrecognized hostel type");
                record.hostel_type = Some(label.trim().to_string());
            }

            candidates.push(Candidate {
                index,
                record,
                hostel_type,
            });
        }

        let observed: Vec<HostelType> = HostelType::ALL
            .into_iter()
            .filter(|t| candidates.iter().any(|c| c.hostel_type == Some(*t)))
            .collect();
        let indicators: Vec<HostelType> = observed.iter().skip(1).copied().collect();

        let mut specs: Vec<FeatureSpec> = Attribute::ALL
            .into_iter()
            .filter(|a| numeric.contains(a) || Attribute::BINARY.contains(a))
            .map(FeatureSpec::attribute)
            .collect();
        specs.extend(indicators.iter().copied().map(FeatureSpec::indicator));
        let catalog = FeatureCatalog::new(specs);

        let rows = candidates
            .iter()
            .map(|c| feature_row(c, &catalog, &indicators))
            .collect();

        info!(
            candidates = candidates.len(),
            features = catalog.len(),
            "preprocessing complete"
        );

        Ok(PreprocessedTable {
            candidates,
            catalog,
            rows,
        })
    }
}

fn present_numeric_attributes(records: &[CandidateRecord]) -> Vec<Attribute> {
    Attribute::NUMERIC
        .into_iter()
        .filter(|&a| records.iter().any(|r| r.numeric(a).is_some()))
        .collect()
}

fn feature_row(candidate: &Candidate, catalog: &FeatureCatalog, indicators: &[HostelType]) -> FeatureVector {
    let record = &candidate.record;
    let mut values: Vec<f32> = catalog
        .iter()
        .filter_map(|spec| spec.attribute)
        .map(|attr| match attr.kind() {
            FeatureKind::Numeric => record.numeric(attr).unwrap_or_default(),
            _ => f32::from(record.flag(attr)),
        })
        .collect();
    values.extend(
        indicators
            .iter()
            .map(|t| if candidate.hostel_type == Some(*t) { 1.0 } else { 0.0 }),
    );
    FeatureVector::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> CandidateRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_empty_table_is_rejected() {
        assert!(matches!(
            DataPreprocessor::default().process(vec![]),
            Err(Error::EmptyDataset)
        ));
    }

    #[test]
    fn test_record_without_numeric_values_fails() {
        let records = vec![
            record(json!({"name": "a", "distance_km": 1.0, "rating": 4.0})),
            record(json!({"name": "b", "wifi": 1})),
        ];
        let err = DataPreprocessor::default().process(records).unwrap_err();
        assert!(matches!(err, Error::Imputation { row: 1, ref name } if name == "b"));
    }

    #[test]
    fn test_missing_columns_are_dropped_from_catalog() {
        let records = vec![
            record(json!({"name": "a", "distance_km": 1.0, "monthly_rent": 3000})),
            record(json!({"name": "b", "distance_km": 2.0, "monthly_rent": 4000})),
        ];
        let table = DataPreprocessor::default().process(records).unwrap();
        let catalog = table.catalog();

        assert!(catalog.contains("distance_km"));
        assert!(catalog.contains("monthly_rent"));
        assert!(!catalog.contains("rating"));
        // all eight amenity flags are always present
        assert_eq!(catalog.iter().filter(|f| f.kind == FeatureKind::Binary).count(), 8);
        assert_eq!(catalog.len(), 10);
    }

    #[test]
    fn test_imputation_fills_gaps() {
        let records = vec![
            record(json!({"name": "a", "distance_km": 1.0, "rating": 4.0})),
            record(json!({"name": "b", "distance_km": 1.2, "rating": 4.4})),
            record(json!({"name": "c", "distance_km": 1.1})),
        ];
        let table = DataPreprocessor::new(2).process(records).unwrap();
        let rating = table.catalog().position_of(Attribute::Rating).unwrap();

        assert!((table.rows()[2][rating] - 4.2).abs() < 1e-4);
        assert_eq!(table.candidates()[2].record.rating, Some(table.rows()[2][rating]));
    }

    #[test]
    fn test_one_hot_drops_reference_category() {
        let records = vec![
            record(json!({"name": "a", "rating": 4.0, "hostel_type": " gents "})),
            record(json!({"name": "b", "rating": 3.0, "hostel_type": "Ladies"})),
            record(json!({"name": "c", "rating": 3.5, "hostel_type": "MIXED"})),
            record(json!({"name": "d", "rating": 3.5, "hostel_type": "family"})),
        ];
        let table = DataPreprocessor::default().process(records).unwrap();
        let catalog = table.catalog();

        assert!(!catalog.contains("type_gents"));
        let ladies = catalog.position("type_ladies").unwrap();
        let mixed = catalog.position("type_mixed").unwrap();

        let rows = table.rows();
        assert_eq!((rows[0][ladies], rows[0][mixed]), (0.0, 0.0));
        assert_eq!((rows[1][ladies], rows[1][mixed]), (1.0, 0.0));
        assert_eq!((rows[2][ladies], rows[2][mixed]), (0.0, 1.0));
        assert_eq!((rows[3][ladies], rows[3][mixed]), (0.0, 0.0));

        let candidates = table.candidates();
        assert_eq!(candidates[0].hostel_type, Some(HostelType::Gents));
        assert_eq!(candidates[0].record.hostel_type.as_deref(), Some("Gents"));
        assert_eq!(candidates[3].hostel_type, None);
        assert_eq!(candidates[3].record.hostel_type.as_deref(), Some("family"));
    }

    #[test]
    fn test_flags_are_coerced() {
        let records = vec![record(json!({
            "name": "a", "rating": 4.0, "wifi": "yes", "ac": 0, "parking": true
        }))];
        let table = DataPreprocessor::default().process(records).unwrap();
        let catalog = table.catalog();
        let row = &table.rows()[0];

        assert_eq!(row[catalog.position_of(Attribute::Wifi).unwrap()], 1.0);
        assert_eq!(row[catalog.position_of(Attribute::Ac).unwrap()], 0.0);
        assert_eq!(row[catalog.position_of(Attribute::Parking).unwrap()], 1.0);
        assert_eq!(row[catalog.position_of(Attribute::Laundry).unwrap()], 0.0);
        assert_eq!(table.candidates()[0].record.wifi, Some(json!(1)));
    }

    #[test]
    fn test_medians_use_imputed_values() {
        let records = vec![
            record(json!({"name": "a", "monthly_rent": 3000})),
            record(json!({"name": "b", "monthly_rent": 5000})),
            record(json!({"name": "c", "monthly_rent": 4000})),
            record(json!({"name": "d", "monthly_rent": 9000})),
        ];
        let table = DataPreprocessor::default().process(records).unwrap();
        let rent = table.catalog().position_of(Attribute::MonthlyRent).unwrap();
        assert_eq!(table.medians()[rent], 4500.0);
    }
}
