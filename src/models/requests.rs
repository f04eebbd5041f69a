use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{AnimalRecord, Gender, PreferenceQuery, Size, WeightVector};

/// Request to register an animal
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterAnimalRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub breed: String,
    #[validate(range(min = 0.0, max = 40.0))]
    pub age: f64,
    pub gender: Gender,
    pub size: Size,
    #[serde(default)]
    pub image: Option<String>,
}

impl RegisterAnimalRequest {
    pub fn into_record(self) -> AnimalRecord {
        let mut record = AnimalRecord::new(
            self.name.trim(),
            self.breed.trim(),
            self.age,
            self.gender,
            self.size,
        );
        record.image = self.image;
        record.registered_at = Some(chrono::Utc::now());
        record
    }
}

/// Slider values for each attribute, 0 to 10
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct SearchWeights {
    #[validate(range(min = 0.0, max = 10.0))]
    #[serde(default = "default_scalar_weight")]
    pub age: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    #[serde(default = "default_scalar_weight")]
    pub gender: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    #[serde(default = "default_scalar_weight")]
    pub size: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    #[serde(default = "default_breed_weight")]
    pub breed: f64,
}

fn default_scalar_weight() -> f64 {
    WeightVector::default().age
}

fn default_breed_weight() -> f64 {
    WeightVector::default().breed
}

impl Default for SearchWeights {
    fn default() -> Self {
        let weights = WeightVector::default();
        Self {
            age: weights.age,
            gender: weights.gender,
            size: weights.size,
            breed: weights.breed,
        }
    }
}

impl From<SearchWeights> for WeightVector {
    fn from(value: SearchWeights) -> Self {
        Self {
            age: value.age,
            gender: value.gender,
            size: value.size,
            breed: value.breed,
        }
    }
}

/// Request to search for matching animals
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(range(min = 0.0, max = 40.0))]
    pub age: f64,
    pub gender: Gender,
    pub size: Size,
    #[serde(default)]
    pub breed: String,
    #[validate(nested)]
    #[serde(default)]
    pub weights: SearchWeights,
}

impl SearchRequest {
    pub fn preferences(&self) -> PreferenceQuery {
        PreferenceQuery {
            age: self.age,
            gender: self.gender,
            size: self.size,
            breed: self.breed.trim().to_string(),
        }
    }
}

/// Query string for breed lookups
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BreedQuery {
    #[serde(default)]
    pub q: Option<String>,
}
