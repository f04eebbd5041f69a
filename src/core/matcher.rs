use std::sync::Arc;

use crate::core::{
    breeds::BreedTable,
    distance::{resolved_distance, PreparedQuery},
    normalize::RangeModel,
    scoring::{distance_to_score, max_distance, MAX_RESULTS},
};
use crate::models::{AnimalRecord, MatchResult, PreferenceQuery, WeightVector};

/// Result of one ranking pass
#[derive(Debug, Clone, Default)]
pub struct RankedMatches {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
    /// Records that could not be coerced and were left out
    pub skipped: usize,
}

/// Rank candidates against a preference, most similar first
///
/// Scores are rounded to one decimal. Equal scores keep the candidates'
/// original order. At most [`MAX_RESULTS`] matches are returned and an empty
/// candidate list yields an empty result.
pub fn rank(
    preferences: &PreferenceQuery,
    weights: &WeightVector,
    candidates: &[AnimalRecord],
    breeds: &BreedTable,
    ranges: &RangeModel,
) -> Vec<MatchResult> {
    rank_candidates(preferences, weights, candidates, breeds, ranges).matches
}

/// Same as [`rank`] but also reports how many records were considered and
/// how many had to be skipped
pub fn rank_candidates(
    preferences: &PreferenceQuery,
    weights: &WeightVector,
    candidates: &[AnimalRecord],
    breeds: &BreedTable,
    ranges: &RangeModel,
) -> RankedMatches {
    let total_candidates = candidates.len();
    if candidates.is_empty() {
        return RankedMatches::default();
    }

    let weights = weights.sanitized();
    let query = PreparedQuery::new(preferences, breeds);
    let max = max_distance(&weights, ranges, breeds.feature_names());
    let mut skipped = 0;

    let mut matches: Vec<MatchResult> = candidates
        .iter()
        .filter_map(|record| match record.resolve() {
            Ok(animal) => {
                let raw_distance = resolved_distance(&query, &animal, &weights, ranges, breeds);
                Some(MatchResult {
                    record: record.clone(),
                    score: distance_to_score(raw_distance, max),
                    raw_distance,
                })
            }
            Err(e) => {
                tracing::warn!("Skipping record {} ({}): {}", record.id, record.name, e);
                skipped += 1;
                None
            }
        })
        .collect();

    // Stable sort: ties keep registration order
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches.truncate(MAX_RESULTS);

    tracing::debug!(
        "Ranked {} candidates for breed '{}' (max distance {:.3}, {} skipped)",
        total_candidates,
        query.breed_key(),
        max,
        skipped
    );

    RankedMatches {
        matches,
        total_candidates,
        skipped,
    }
}

/// Matching context: the breed table and range model shared by every search
///
/// Holding these explicitly keeps ranking free of process-wide state.
#[derive(Debug, Clone)]
pub struct Matcher {
    breeds: Arc<BreedTable>,
    ranges: RangeModel,
}

impl Matcher {
    pub fn new(breeds: Arc<BreedTable>, ranges: RangeModel) -> Self {
        Self { breeds, ranges }
    }

    pub fn with_defaults(breeds: Arc<BreedTable>) -> Self {
        Self::new(breeds, RangeModel::default())
    }

    pub fn breeds(&self) -> &BreedTable {
        &self.breeds
    }

    pub fn ranges(&self) -> &RangeModel {
        &self.ranges
    }

    /// Find the best matching candidates for a preference
    ///
    /// # Arguments
    /// * `preferences` - The adopter's preferences
    /// * `weights` - Importance of each attribute for this search
    /// * `candidates` - Registered animals in registration order
    ///
    /// # Returns
    /// RankedMatches with at most [`MAX_RESULTS`] scored matches
    pub fn find_matches(
        &self,
        preferences: &PreferenceQuery,
        weights: &WeightVector,
        candidates: &[AnimalRecord],
    ) -> RankedMatches {
        rank_candidates(preferences, weights, candidates, &self.breeds, &self.ranges)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_defaults(Arc::new(BreedTable::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::AttributeScale;
    use crate::models::{Gender, Size};

    fn create_matcher() -> Matcher {
        let breeds = BreedTable::from_vectors(
            vec!["feature_x".to_string()],
            vec![("beagle", vec![0.2]), ("basset hound", vec![0.3])],
        );
        let ranges = RangeModel::default().with_feature("feature_x", AttributeScale::with_range(1.0));
        Matcher::new(Arc::new(breeds), ranges)
    }

    fn create_preferences() -> PreferenceQuery {
        PreferenceQuery {
            age: 5.0,
            gender: Gender::Male,
            size: Size::Medium,
            breed: "beagle".to_string(),
        }
    }

    fn create_candidate(name: &str, breed: &str, age: f64) -> AnimalRecord {
        AnimalRecord::new(name, breed, age, Gender::Male, Size::Medium)
    }

    #[test]
    fn test_find_matches_orders_by_score() {
        let matcher = create_matcher();
        let candidates = vec![
            create_candidate("far", "poodle", 15.0),
            create_candidate("exact", "Beagle", 5.0),
            create_candidate("close", "basset_hound", 6.0),
        ];

        let result = matcher.find_matches(&create_preferences(), &WeightVector::uniform(1.0), &candidates);
        let names: Vec<&str> = result.matches.iter().map(|m| m.record.name.as_str()).collect();

        assert_eq!(names, vec!["exact", "close", "far"]);
        assert_eq!(result.matches[0].score, 100.0);
        assert_eq!(result.total_candidates, 3);
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let matcher = create_matcher();
        let candidates: Vec<AnimalRecord> = (0..5)
            .map(|i| create_candidate(&format!("dog-{}", i), "poodle", 9.0))
            .collect();

        let result = matcher.find_matches(&create_preferences(), &WeightVector::uniform(1.0), &candidates);
        let names: Vec<String> = result.matches.iter().map(|m| m.record.name.clone()).collect();

        assert_eq!(names, vec!["dog-0", "dog-1", "dog-2", "dog-3", "dog-4"]);
    }

    #[test]
    fn test_skips_uncoercible_records() {
        let matcher = create_matcher();
        let mut broken = create_candidate("broken", "beagle", 5.0);
        broken.gender = Some(3.0);
        let candidates = vec![broken, create_candidate("fine", "beagle", 5.0)];

        let result = matcher.find_matches(&create_preferences(), &WeightVector::uniform(1.0), &candidates);

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].record.name, "fine");
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_empty_candidates() {
        let matcher = create_matcher();
        let result = matcher.find_matches(&create_preferences(), &WeightVector::default(), &[]);

        assert!(result.matches.is_empty());
        assert_eq!(result.total_candidates, 0);
    }

    #[test]
    fn test_truncates_to_max_results() {
        let matcher = create_matcher();
        let candidates: Vec<AnimalRecord> = (0..80)
            .map(|i| create_candidate(&i.to_string(), "beagle", f64::from(i % 20)))
            .collect();

        let result = matcher.find_matches(&create_preferences(), &WeightVector::uniform(1.0), &candidates);

        assert_eq!(result.matches.len(), MAX_RESULTS);
        assert_eq!(result.total_candidates, 80);
    }

    #[test]
    fn test_zero_weights_still_score() {
        let matcher = Matcher::new(
            Arc::new(BreedTable::default()),
            RangeModel::default().with_mismatch_penalty(0.0),
        );
        let candidates = vec![create_candidate("any", "poodle", 12.0)];

        let result = matcher.find_matches(&create_preferences(), &WeightVector::uniform(0.0), &candidates);

        assert_eq!(result.matches[0].score, 100.0);
    }
}
