use serde::{Deserialize, Serialize};
use crate::models::domain::MatchResult;

/// Response for the search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub matches: Vec<MatchResult>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(rename = "skippedRecords")]
    pub skipped_records: usize,
}

/// Response listing breed names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedsResponse {
    pub breeds: Vec<String>,
    pub features: Vec<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "registeredAnimals")]
    pub registered_animals: usize,
    #[serde(rename = "knownBreeds")]
    pub known_breeds: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
