use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Age assumed for records that carry no usable age
pub const DEFAULT_AGE: f64 = 5.0;
/// Breed assumed for records that carry no usable breed
pub const UNKNOWN_BREED: &str = "unknown";

/// Errors raised when a record cannot be coerced into scorable attributes
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("age {0} is not a valid age in years")]
    InvalidAge(f64),

    #[error("gender code {0} is not one of 0 or 1")]
    InvalidGender(f64),

    #[error("size code {0} is not one of 0, 1 or 2")]
    InvalidSize(f64),
}

/// Animal gender, encoded as 0 (male) or 1 (female)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn code(self) -> u8 {
        match self {
            Gender::Male => 0,
            Gender::Female => 1,
        }
    }

    /// Map a numeric code onto a gender, rejecting anything but exact 0 or 1
    pub fn from_value(value: f64) -> Option<Self> {
        if value == 0.0 {
            Some(Gender::Male)
        } else if value == 1.0 {
            Some(Gender::Female)
        } else {
            None
        }
    }
}

impl TryFrom<u8> for Gender {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Gender::from_value(f64::from(value)).ok_or_else(|| format!("invalid gender code {}", value))
    }
}

impl From<Gender> for u8 {
    fn from(value: Gender) -> Self {
        value.code()
    }
}

/// Animal size class, encoded as 0 (small), 1 (medium) or 2 (large)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
}

impl Size {
    pub fn code(self) -> u8 {
        match self {
            Size::Small => 0,
            Size::Medium => 1,
            Size::Large => 2,
        }
    }

    pub fn from_value(value: f64) -> Option<Self> {
        if value == 0.0 {
            Some(Size::Small)
        } else if value == 1.0 {
            Some(Size::Medium)
        } else if value == 2.0 {
            Some(Size::Large)
        } else {
            None
        }
    }
}

impl TryFrom<u8> for Size {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Size::from_value(f64::from(value)).ok_or_else(|| format!("invalid size code {}", value))
    }
}

impl From<Size> for u8 {
    fn from(value: Size) -> Self {
        value.code()
    }
}

/// A registered shelter animal
///
/// Numeric attributes are optional because records loaded from disk may be
/// incomplete or loosely typed. Deserialization accepts numbers or numeric
/// strings and turns anything else into `None`; [`AnimalRecord::resolve`]
/// then applies the defaults used for scoring. A malformed id gets a fresh
/// one and a malformed image or timestamp is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalRecord {
    #[serde(default = "Uuid::new_v4", deserialize_with = "lenient::id")]
    pub id: Uuid,
    #[serde(default, deserialize_with = "lenient::label")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub breed: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub gender: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub size: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        rename = "registeredAt",
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub registered_at: Option<DateTime<Utc>>,
}

impl AnimalRecord {
    /// Build a fully populated record, as produced by registration
    pub fn new(name: impl Into<String>, breed: impl Into<String>, age: f64, gender: Gender, size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            breed: Some(breed.into()),
            age: Some(age),
            gender: Some(f64::from(gender.code())),
            size: Some(f64::from(size.code())),
            image: None,
            registered_at: None,
        }
    }

    /// Coerce this record into the attributes used for scoring.
    ///
    /// Missing values fall back to age 5, gender 0, size 1 and breed
    /// `"unknown"`. Present values outside their domain are rejected so the
    /// caller can skip the record.
    pub fn resolve(&self) -> Result<ResolvedAnimal<'_>, RecordError> {
        let age = match self.age {
            None => DEFAULT_AGE,
            Some(age) if age.is_finite() && age >= 0.0 => age,
            Some(age) => return Err(RecordError::InvalidAge(age)),
        };

        let gender = match self.gender {
            None => Gender::default(),
            Some(code) => Gender::from_value(code).ok_or(RecordError::InvalidGender(code))?,
        };

        let size = match self.size {
            None => Size::default(),
            Some(code) => Size::from_value(code).ok_or(RecordError::InvalidSize(code))?,
        };

        let breed = match self.breed.as_deref().map(str::trim) {
            Some(breed) if !breed.is_empty() => breed,
            _ => UNKNOWN_BREED,
        };

        Ok(ResolvedAnimal { age, gender, size, breed })
    }
}

/// Scorable view of an [`AnimalRecord`] with every default applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnimal<'a> {
    pub age: f64,
    pub gender: Gender,
    pub size: Size,
    pub breed: &'a str,
}

/// What the adopter is looking for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceQuery {
    pub age: f64,
    pub gender: Gender,
    pub size: Size,
    pub breed: String,
}

/// Per-attribute importance supplied with each search.
///
/// The breed weight applies to every breed feature dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    pub age: f64,
    pub gender: f64,
    pub size: f64,
    pub breed: f64,
}

impl WeightVector {
    pub fn uniform(value: f64) -> Self {
        Self {
            age: value,
            gender: value,
            size: value,
            breed: value,
        }
    }

    /// Negative and non-finite weights count as zero
    pub fn sanitized(self) -> Self {
        fn clean(weight: f64) -> f64 {
            if weight.is_finite() && weight > 0.0 {
                weight
            } else {
                0.0
            }
        }

        Self {
            age: clean(self.age),
            gender: clean(self.gender),
            size: clean(self.size),
            breed: clean(self.breed),
        }
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self {
            age: 5.0,
            gender: 5.0,
            size: 5.0,
            breed: 8.0,
        }
    }
}

/// A ranked candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub record: AnimalRecord,
    pub score: f64,
    #[serde(rename = "rawDistance")]
    pub raw_distance: f64,
}

mod lenient {
    use super::*;

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(parse_number))
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(parse_text))
    }

    /// Any value that does not deserialize as `T` becomes `None`
    pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|value| serde_json::from_value(value).ok()))
    }

    pub fn id<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(optional(deserializer)?.unwrap_or_else(Uuid::new_v4))
    }

    pub fn label<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(text(deserializer)?.unwrap_or_default())
    }

    fn parse_number(value: &Value) -> Option<f64> {
        let parsed = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(raw) => raw.trim().parse::<f64>().ok(),
            _ => None,
        };
        // "NaN" and "inf" parse as floats but carry no usable value
        parsed.filter(|number| number.is_finite())
    }

    fn parse_text(value: &Value) -> Option<String> {
        let text = match value {
            Value::String(raw) => raw.trim().to_string(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_record_parsing() {
        let record: AnimalRecord = serde_json::from_value(json!({
            "name": "Bella",
            "breed": "  Beagle ",
            "age": "7",
            "gender": 1,
            "size": "large"
        }))
        .unwrap();

        assert_eq!(record.breed.as_deref(), Some("Beagle"));
        assert_eq!(record.age, Some(7.0));
        assert_eq!(record.gender, Some(1.0));
        assert_eq!(record.size, None);
    }

    #[test]
    fn test_missing_fields_resolve_to_defaults() {
        let record: AnimalRecord = serde_json::from_value(json!({ "name": "Max" })).unwrap();
        let resolved = record.resolve().unwrap();

        assert_eq!(resolved.age, DEFAULT_AGE);
        assert_eq!(resolved.gender, Gender::Male);
        assert_eq!(resolved.size, Size::Medium);
        assert_eq!(resolved.breed, UNKNOWN_BREED);
    }

    #[test]
    fn test_nan_string_is_treated_as_missing() {
        let record: AnimalRecord = serde_json::from_value(json!({ "age": "NaN", "breed": "" })).unwrap();

        assert_eq!(record.age, None);
        assert_eq!(record.breed, None);
    }

    #[test]
    fn test_malformed_extra_fields_keep_record() {
        let record: AnimalRecord = serde_json::from_value(json!({
            "id": "abc",
            "name": "Bella",
            "breed": "Beagle",
            "age": 3,
            "image": false,
            "registeredAt": "yesterday"
        }))
        .unwrap();

        assert!(!record.id.is_nil());
        assert_eq!(record.image, None);
        assert_eq!(record.registered_at, None);
        assert_eq!(record.resolve().unwrap().breed, "Beagle");
    }

    #[test]
    fn test_well_formed_extra_fields_are_kept() {
        let id = Uuid::new_v4();
        let record: AnimalRecord = serde_json::from_value(json!({
            "id": id.to_string(),
            "image": "bella.png",
            "registeredAt": "2024-05-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.image.as_deref(), Some("bella.png"));
        assert!(record.registered_at.is_some());
    }

    #[test]
    fn test_out_of_domain_codes_are_rejected() {
        let mut record = AnimalRecord::new("Rex", "poodle", 3.0, Gender::Male, Size::Small);
        record.gender = Some(4.0);
        assert_eq!(record.resolve(), Err(RecordError::InvalidGender(4.0)));

        record.gender = Some(0.0);
        record.size = Some(2.5);
        assert_eq!(record.resolve(), Err(RecordError::InvalidSize(2.5)));

        record.size = Some(1.0);
        record.age = Some(-1.0);
        assert_eq!(record.resolve(), Err(RecordError::InvalidAge(-1.0)));
    }

    #[test]
    fn test_enum_codes_round_through_json() {
        let query: PreferenceQuery = serde_json::from_value(json!({
            "age": 3,
            "gender": 1,
            "size": 2,
            "breed": "beagle"
        }))
        .unwrap();

        assert_eq!(query.gender, Gender::Female);
        assert_eq!(query.size, Size::Large);
        assert!(serde_json::from_value::<Size>(json!(3)).is_err());
    }

    #[test]
    fn test_sanitized_weights() {
        let weights = WeightVector {
            age: -1.0,
            gender: f64::NAN,
            size: 2.0,
            breed: f64::INFINITY,
        }
        .sanitized();

        assert_eq!(weights, WeightVector { age: 0.0, gender: 0.0, size: 2.0, breed: 0.0 });
    }
}
