// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{AnimalRecord, Gender, MatchResult, PreferenceQuery, RecordError, ResolvedAnimal, Size, WeightVector};
pub use requests::{BreedQuery, RegisterAnimalRequest, SearchRequest, SearchWeights};
pub use responses::{BreedsResponse, ErrorResponse, HealthResponse, SearchResponse};
