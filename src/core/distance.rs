use crate::core::breeds::{canonical_breed_key, BreedTable};
use crate::core::normalize::RangeModel;
use crate::models::{AnimalRecord, PreferenceQuery, RecordError, ResolvedAnimal, WeightVector};

/// A preference query with its breed resolved against the feature table.
///
/// Built once per ranking pass so the preference breed is canonicalized and
/// looked up a single time.
#[derive(Debug, Clone)]
pub struct PreparedQuery<'a> {
    age: f64,
    gender: f64,
    size: f64,
    breed_key: String,
    breed_vector: &'a [f64],
}

impl<'a> PreparedQuery<'a> {
    pub fn new(preferences: &PreferenceQuery, breeds: &'a BreedTable) -> Self {
        let breed_key = canonical_breed_key(&preferences.breed);
        let breed_vector = breeds.lookup_key(&breed_key);
        Self {
            age: preferences.age,
            gender: f64::from(preferences.gender.code()),
            size: f64::from(preferences.size.code()),
            breed_key,
            breed_vector,
        }
    }

    pub fn breed_key(&self) -> &str {
        &self.breed_key
    }
}

/// Weighted Euclidean distance between a preference and a candidate
///
/// # Arguments
/// * `preferences` - What the adopter asked for
/// * `record` - The candidate animal; missing attributes take their defaults
/// * `weights` - Per-attribute importance, negative values count as zero
/// * `ranges` - Full-scale ranges, coefficients and the mismatch penalty
/// * `breeds` - Breed feature vectors
///
/// # Returns
/// The raw distance (never negative), or the reason the record could not be
/// coerced into scorable attributes
pub fn distance(
    preferences: &PreferenceQuery,
    record: &AnimalRecord,
    weights: &WeightVector,
    ranges: &RangeModel,
    breeds: &BreedTable,
) -> Result<f64, RecordError> {
    let query = PreparedQuery::new(preferences, breeds);
    let animal = record.resolve()?;
    Ok(resolved_distance(&query, &animal, &weights.sanitized(), ranges, breeds))
}

/// Distance for an already resolved candidate. `weights` must be sanitized.
#[inline]
pub fn resolved_distance(
    query: &PreparedQuery<'_>,
    animal: &ResolvedAnimal<'_>,
    weights: &WeightVector,
    ranges: &RangeModel,
    breeds: &BreedTable,
) -> f64 {
    sum_of_squares(query, animal, weights, ranges, breeds).sqrt()
}

/// Weighted sum of squared, range-scaled differences plus the flat breed
/// mismatch penalty
pub fn sum_of_squares(
    query: &PreparedQuery<'_>,
    animal: &ResolvedAnimal<'_>,
    weights: &WeightVector,
    ranges: &RangeModel,
    breeds: &BreedTable,
) -> f64 {
    let mut sum = ranges.age.term(query.age - animal.age, weights.age)
        + ranges
            .gender
            .term(query.gender - f64::from(animal.gender.code()), weights.gender)
        + ranges
            .size
            .term(query.size - f64::from(animal.size.code()), weights.size);

    let breed_key = canonical_breed_key(animal.breed);
    let candidate_vector = breeds.lookup_key(&breed_key);

    for ((name, preferred), actual) in breeds
        .feature_names()
        .iter()
        .zip(query.breed_vector)
        .zip(candidate_vector)
    {
        sum += ranges.feature(name).term(preferred - actual, weights.breed);
    }

    if breed_key != query.breed_key {
        sum += ranges.mismatch_penalty();
    }

    sum
}
