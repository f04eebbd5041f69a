//! Shelter Match - adoption matching service for shelter animals
//!
//! This library ranks registered animals against an adopter's preferences.
//! Each candidate's distance to the preference combines range-scaled age,
//! gender and size differences, breed feature vectors and a flat breed
//! mismatch penalty; distances become scores between 0 and 100.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{rank, BreedTable, Matcher, RangeModel, RankedMatches};
pub use crate::models::{AnimalRecord, Gender, MatchResult, PreferenceQuery, Size, WeightVector};
pub use crate::services::{load_breed_table, BreedCatalog, RecordStore};
