//! Raw candidate records as they arrive from the dataset

use crate::catalog::Attribute;
use crate::vector::saturating_f32;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Hostel category
///
/// `Mixed` hostels admit everyone, so a `Mixed` request acts as "any".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HostelType {
    Gents,
    Ladies,
    Mixed,
}

impl HostelType {
    /// Declaration order, also the one-hot column order
    pub const ALL: [HostelType; 3] = [HostelType::Gents, HostelType::Ladies, HostelType::Mixed];

    pub fn key(self) -> &'static str {
        match self {
            HostelType::Gents => "gents",
            HostelType::Ladies => "ladies",
            HostelType::Mixed => "mixed",
        }
    }

    /// Normalize a free-form dataset label
    ///
    /// Trims, case-folds and maps common synonyms. Returns `None` for labels
    /// that do not name any of the three categories.
    pub fn normalize(label: &str) -> Option<Self> {
        let folded = label.trim().to_lowercase();
        match folded.as_str() {
            "gents" | "gent" | "boys" | "boy" | "men" | "mens" | "men's" | "male" => {
                Some(HostelType::Gents)
            }
            "ladies" | "lady" | "girls" | "girl" | "women" | "womens" | "women's" | "female" => {
                Some(HostelType::Ladies)
            }
            "mixed" | "coed" | "co-ed" | "co ed" | "any" | "unisex" => Some(HostelType::Mixed),
            _ => None,
        }
    }
}

impl fmt::Display for HostelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostelType::Gents => "Gents",
            HostelType::Ladies => "Ladies",
            HostelType::Mixed => "Mixed",
        };
        f.write_str(name)
    }
}

impl FromStr for HostelType {
    type Err = String;

    /// Strict parse used at the request boundary: the three category names
    /// (any case) plus `any` for `Mixed`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gents" => Ok(HostelType::Gents),
            "ladies" => Ok(HostelType::Ladies),
            "mixed" | "any" => Ok(HostelType::Mixed),
            _ => Err(s.to_string()),
        }
    }
}

/// One raw row of the candidate dataset
///
/// Every attribute is optional; the preprocessor decides how gaps are
/// filled. Column names from the original spreadsheet export are accepted
/// as aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CandidateRecord {
    #[serde(default = "unnamed", alias = "Hostel_Name", alias = "Name")]
    pub name: String,
    #[serde(default, alias = "Address")]
    pub address: Option<String>,
    #[serde(default, alias = "Hostel_Type")]
    pub hostel_type: Option<String>,

    #[serde(default, alias = "Distance_from_CUSAT_km", deserialize_with = "lenient_number")]
    pub distance_km: Option<f32>,
    #[serde(default, alias = "Rating", deserialize_with = "lenient_number")]
    pub rating: Option<f32>,
    #[serde(default, alias = "Rating_Count", deserialize_with = "lenient_number")]
    pub rating_count: Option<f32>,
    #[serde(default, alias = "Estimated_Monthly_Rent", deserialize_with = "lenient_number")]
    pub monthly_rent: Option<f32>,
    #[serde(default, alias = "Safety_Score", deserialize_with = "lenient_number")]
    pub safety_score: Option<f32>,
    #[serde(default, alias = "Food_Quality_Score", deserialize_with = "lenient_number")]
    pub food_quality_score: Option<f32>,

    #[serde(default, alias = "WiFi_Available", skip_serializing_if = "Option::is_none")]
    pub wifi: Option<Value>,
    #[serde(default, alias = "Food_Available", skip_serializing_if = "Option::is_none")]
    pub food: Option<Value>,
    #[serde(default, alias = "AC_Available", skip_serializing_if = "Option::is_none")]
    pub ac: Option<Value>,
    #[serde(default, alias = "Parking_Available", skip_serializing_if = "Option::is_none")]
    pub parking: Option<Value>,
    #[serde(default, alias = "Laundry_Available", skip_serializing_if = "Option::is_none")]
    pub laundry: Option<Value>,
    #[serde(default, alias = "CCTV_Security", skip_serializing_if = "Option::is_none")]
    pub cctv: Option<Value>,
    #[serde(default, alias = "Is_Clean", skip_serializing_if = "Option::is_none")]
    pub clean: Option<Value>,
    #[serde(default, alias = "Open_24x7", skip_serializing_if = "Option::is_none")]
    pub open_24x7: Option<Value>,
}

impl CandidateRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Raw value of a numeric attribute; non-finite values count as missing
    pub fn numeric(&self, attribute: Attribute) -> Option<f32> {
        let value = match attribute {
            Attribute::DistanceKm => self.distance_km,
            Attribute::Rating => self.rating,
            Attribute::RatingCount => self.rating_count,
            Attribute::MonthlyRent => self.monthly_rent,
            Attribute::SafetyScore => self.safety_score,
            Attribute::FoodQualityScore => self.food_quality_score,
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    pub fn set_numeric(&mut self, attribute: Attribute, value: f32) {
        let slot = match attribute {
            Attribute::DistanceKm => &mut self.distance_km,
            Attribute::Rating => &mut self.rating,
            Attribute::RatingCount => &mut self.rating_count,
            Attribute::MonthlyRent => &mut self.monthly_rent,
            Attribute::SafetyScore => &mut self.safety_score,
            Attribute::FoodQualityScore => &mut self.food_quality_score,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Amenity flag coerced to {0, 1}; missing or unreadable values are 0
    pub fn flag(&self, attribute: Attribute) -> u8 {
        let raw = match attribute {
            Attribute::Wifi => &self.wifi,
            Attribute::Food => &self.food,
            Attribute::Ac => &self.ac,
            Attribute::Parking => &self.parking,
            Attribute::Laundry => &self.laundry,
            Attribute::Cctv => &self.cctv,
            Attribute::Clean => &self.clean,
            Attribute::Open24x7 => &self.open_24x7,
            _ => return 0,
        };
        raw.as_ref().map(coerce_flag).unwrap_or(0)
    }

    pub fn set_flag(&mut self, attribute: Attribute, on: bool) {
        let value = Some(Value::from(u8::from(on)));
        match attribute {
            Attribute::Wifi => self.wifi = value,
            Attribute::Food => self.food = value,
            Attribute::Ac => self.ac = value,
            Attribute::Parking => self.parking = value,
            Attribute::Laundry => self.laundry = value,
            Attribute::Cctv => self.cctv = value,
            Attribute::Clean => self.clean = value,
            Attribute::Open24x7 => self.open_24x7 = value,
            _ => {}
        }
    }
}

fn coerce_flag(value: &Value) -> u8 {
    match value {
        Value::Bool(b) => u8::from(*b),
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite() && v.trunc() != 0.0)
            .map_or(0, |_| 1),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "1" | "y" | "yes" | "true" | "available" => 1,
            _ => 0,
        },
        _ => 0,
    }
}

fn unnamed() -> String {
    "N/A".to_string()
}

/// Accepts numbers, numeric strings and null; anything else reads as missing
///
/// Magnitudes beyond the f32 range saturate instead of becoming infinite.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().and_then(saturating_f32),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().and_then(saturating_f32),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_hostel_type() {
        assert_eq!(HostelType::normalize("  Gents "), Some(HostelType::Gents));
        assert_eq!(HostelType::normalize("GIRLS"), Some(HostelType::Ladies));
        assert_eq!(HostelType::normalize("co-ed"), Some(HostelType::Mixed));
        assert_eq!(HostelType::normalize("family"), None);
    }

    #[test]
    fn test_strict_parse() {
        assert_eq!("ladies".parse::<HostelType>(), Ok(HostelType::Ladies));
        assert_eq!("Any".parse::<HostelType>(), Ok(HostelType::Mixed));
        assert!("boys".parse::<HostelType>().is_err());
    }

    #[test]
    fn test_deserialize_with_source_column_names() {
        let record: CandidateRecord = serde_json::from_value(json!({
            "Hostel_Name": "Sea View",
            "Hostel_Type": " Ladies",
            "Distance_from_CUSAT_km": 1.5,
            "Estimated_Monthly_Rent": "4500",
            "Rating": null,
            "WiFi_Available": 1,
            "AC_Available": "yes",
            "Parking_Available": false
        }))
        .unwrap();

        assert_eq!(record.name, "Sea View");
        assert_eq!(record.numeric(Attribute::DistanceKm), Some(1.5));
        assert_eq!(record.numeric(Attribute::MonthlyRent), Some(4500.0));
        assert_eq!(record.numeric(Attribute::Rating), None);
        assert_eq!(record.flag(Attribute::Wifi), 1);
        assert_eq!(record.flag(Attribute::Ac), 1);
        assert_eq!(record.flag(Attribute::Parking), 0);
        assert_eq!(record.flag(Attribute::Laundry), 0);
    }

    #[test]
    fn test_unreadable_numbers_are_missing() {
        let record: CandidateRecord = serde_json::from_value(json!({
            "name": "x",
            "rating": "N/A",
            "safety_score": "7"
        }))
        .unwrap();
        assert_eq!(record.rating, None);
        assert_eq!(record.safety_score, Some(7.0));
    }

    #[test]
    fn test_huge_numbers_saturate() {
        let record: CandidateRecord = serde_json::from_value(json!({
            "name": "x",
            "monthly_rent": 1e39,
            "rating": "NaN"
        }))
        .unwrap();
        assert_eq!(record.monthly_rent, Some(f32::MAX));
        assert_eq!(record.rating, None);
    }

    #[test]
    fn test_missing_name_defaults() {
        let records: Vec<CandidateRecord> = serde_json::from_value(json!([
            {"Hostel_Name": "Sea View", "Rating": 4.0},
            {"Rating": 3.5}
        ]))
        .unwrap();
        assert_eq!(records[1].name, "N/A");
        assert_eq!(records[1].rating, Some(3.5));
    }

    #[test]
    fn test_flag_coercion() {
        assert_eq!(coerce_flag(&json!(true)), 1);
        assert_eq!(coerce_flag(&json!(0)), 0);
        assert_eq!(coerce_flag(&json!(2.0)), 1);
        assert_eq!(coerce_flag(&json!(0.4)), 0);
        assert_eq!(coerce_flag(&json!("No")), 0);
        assert_eq!(coerce_flag(&json!(null)), 0);
    }

    #[test]
    fn test_set_numeric_and_flag() {
        let mut record = CandidateRecord::new("r");
        record.set_numeric(Attribute::SafetyScore, 8.0);
        record.set_flag(Attribute::Cctv, true);
        assert_eq!(record.numeric(Attribute::SafetyScore), Some(8.0));
        assert_eq!(record.flag(Attribute::Cctv), 1);
    }
}
