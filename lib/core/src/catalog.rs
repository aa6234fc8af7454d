//! Feature catalog
//!
//! Declares every recognized feature: its key, the column name used by the
//! source dataset, its kind, its direction and the label shown in
//! explanations. The catalog built for a fitted table is the single source
//! of column ordering for the raw matrix, the scaler and the scorer.

use crate::record::HostelType;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A recognized hostel attribute.
///
/// Query preferences and weight tables are keyed by these names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    DistanceKm,
    Rating,
    RatingCount,
    MonthlyRent,
    SafetyScore,
    FoodQualityScore,
    Wifi,
    Food,
    Ac,
    Parking,
    Laundry,
    Cctv,
    Clean,
    #[serde(rename = "open_24x7")]
    Open24x7,
}

impl Attribute {
    /// All attributes in catalog order
    pub const ALL: [Attribute; 14] = [
        Attribute::DistanceKm,
        Attribute::Rating,
        Attribute::RatingCount,
        Attribute::MonthlyRent,
        Attribute::SafetyScore,
        Attribute::FoodQualityScore,
        Attribute::Wifi,
        Attribute::Food,
        Attribute::Ac,
        Attribute::Parking,
        Attribute::Laundry,
        Attribute::Cctv,
        Attribute::Clean,
        Attribute::Open24x7,
    ];

    /// Attributes filled by KNN imputation
    pub const NUMERIC: [Attribute; 6] = [
        Attribute::DistanceKm,
        Attribute::Rating,
        Attribute::RatingCount,
        Attribute::MonthlyRent,
        Attribute::SafetyScore,
        Attribute::FoodQualityScore,
    ];

    /// Amenity flags coerced to {0, 1}
    pub const BINARY: [Attribute; 8] = [
        Attribute::Wifi,
        Attribute::Food,
        Attribute::Ac,
        Attribute::Parking,
        Attribute::Laundry,
        Attribute::Cctv,
        Attribute::Clean,
        Attribute::Open24x7,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Attribute::DistanceKm => "distance_km",
            Attribute::Rating => "rating",
            Attribute::RatingCount => "rating_count",
            Attribute::MonthlyRent => "monthly_rent",
            Attribute::SafetyScore => "safety_score",
            Attribute::FoodQualityScore => "food_quality_score",
            Attribute::Wifi => "wifi",
            Attribute::Food => "food",
            Attribute::Ac => "ac",
            Attribute::Parking => "parking",
            Attribute::Laundry => "laundry",
            Attribute::Cctv => "cctv",
            Attribute::Clean => "clean",
            Attribute::Open24x7 => "open_24x7",
        }
    }

    /// Column name in the source spreadsheet export
    pub fn column_name(self) -> &'static str {
        match self {
            Attribute::DistanceKm => "Distance_from_CUSAT_km",
            Attribute::Rating => "Rating",
            Attribute::RatingCount => "Rating_Count",
            Attribute::MonthlyRent => "Estimated_Monthly_Rent",
            Attribute::SafetyScore => "Safety_Score",
            Attribute::FoodQualityScore => "Food_Quality_Score",
            Attribute::Wifi => "WiFi_Available",
            Attribute::Food => "Food_Available",
            Attribute::Ac => "AC_Available",
            Attribute::Parking => "Parking_Available",
            Attribute::Laundry => "Laundry_Available",
            Attribute::Cctv => "CCTV_Security",
            Attribute::Clean => "Is_Clean",
            Attribute::Open24x7 => "Open_24x7",
        }
    }

    pub fn kind(self) -> FeatureKind {
        if Self::NUMERIC.contains(&self) {
            FeatureKind::Numeric
        } else {
            FeatureKind::Binary
        }
    }

    /// Distance and rent are the only "lower is better" dimensions
    pub fn direction(self) -> Direction {
        match self {
            Attribute::DistanceKm | Attribute::MonthlyRent => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }

    /// Weight used by the default weight table
    pub fn default_weight(self) -> Option<f32> {
        match self {
            Attribute::DistanceKm => Some(0.25),
            Attribute::MonthlyRent => Some(0.20),
            Attribute::SafetyScore => Some(0.15),
            Attribute::Rating => Some(0.10),
            Attribute::FoodQualityScore => Some(0.08),
            Attribute::Wifi => Some(0.05),
            Attribute::Food => Some(0.05),
            Attribute::Ac => Some(0.03),
            Attribute::Parking => Some(0.03),
            Attribute::Laundry => Some(0.02),
            Attribute::Cctv => Some(0.02),
            Attribute::Clean => Some(0.01),
            Attribute::Open24x7 => Some(0.01),
            Attribute::RatingCount => None,
        }
    }

    /// Human-readable label for explanations
    pub fn label(self) -> &'static str {
        match self {
            Attribute::DistanceKm => "Within distance limit",
            Attribute::MonthlyRent => "Matches your budget",
            Attribute::SafetyScore => "High safety score",
            Attribute::Rating => "Well rated",
            Attribute::RatingCount => "Number of reviews",
            Attribute::FoodQualityScore => "Good food quality",
            Attribute::Wifi => "Has WiFi",
            Attribute::Food => "Food provided",
            Attribute::Ac => "Has AC",
            Attribute::Parking => "Has parking",
            Attribute::Laundry => "Has laundry",
            Attribute::Cctv => "Has CCTV security",
            Attribute::Clean => "Clean facility",
            Attribute::Open24x7 => "Open 24/7",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Attribute {
    type Err = UnknownAttribute;

    /// Accepts the snake_case key or the source column name, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.key().eq_ignore_ascii_case(s) || a.column_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownAttribute(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown attribute '{0}'")]
pub struct UnknownAttribute(pub String);

/// Kind of a catalog column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Continuous attribute, KNN-imputed
    Numeric,
    /// Amenity flag in {0, 1}
    Binary,
    /// One-hot hostel type column
    Indicator,
}

/// Which end of a dimension is preferable
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    HigherIsBetter,
    /// Reflected after scaling so that every dimension points the same way
    LowerIsBetter,
}

/// One column of the feature matrix
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
    pub direction: Direction,
    pub label: String,
    /// The recognized attribute behind this column, `None` for indicators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<Attribute>,
}

impl FeatureSpec {
    pub fn attribute(attribute: Attribute) -> Self {
        Self {
            name: attribute.key().to_string(),
            kind: attribute.kind(),
            direction: attribute.direction(),
            label: attribute.label().to_string(),
            attribute: Some(attribute),
        }
    }

    pub fn indicator(hostel_type: HostelType) -> Self {
        Self {
            name: format!("{}{}", INDICATOR_PREFIX, hostel_type.key()),
            kind: FeatureKind::Indicator,
            direction: Direction::HigherIsBetter,
            label: format!("{} hostel", hostel_type),
            attribute: None,
        }
    }
}

/// Ordered set of feature columns for one fitted table
/// Name prefix of hostel type one-hot columns
const INDICATOR_PREFIX: &str = "type_";

#[derive(Debug, Clone, Default)]
pub struct FeatureCatalog {
    features: Vec<FeatureSpec>,
    positions: AHashMap<String, usize>,
}

impl FeatureCatalog {
    pub fn new(features: Vec<FeatureSpec>) -> Self {
        let positions = features
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        Self { features, positions }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureSpec> {
        self.features.iter()
    }

    pub fn get(&self, index: usize) -> Option<&FeatureSpec> {
        self.features.get(index)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn position_of(&self, attribute: Attribute) -> Option<usize> {
        self.position(attribute.key())
    }

    /// Catalog name for an external key
    ///
    /// Attribute aliases resolve to their snake_case key and one-hot columns
    /// match case-insensitively (`Type_Ladies` is `type_ladies`). Other names
    /// are only trimmed.
    pub fn canonical_name(name: &str) -> String {
        if let Ok(attribute) = name.parse::<Attribute>() {
            return attribute.key().to_string();
        }
        let name = name.trim();
        match name.get(..INDICATOR_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(INDICATOR_PREFIX) => name.to_ascii_lowercase(),
            _ => name.to_string(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }
}
