use crate::core::normalize::RangeModel;
use crate::models::WeightVector;

/// Largest number of matches returned by one search
pub const MAX_RESULTS: usize = 50;

/// Theoretical worst-case distance for the given weights
///
/// Every scaled difference is taken to be exactly 1.0 and the breed mismatch
/// penalty is counted once, mirroring how [`sum_of_squares`] builds a real
/// distance. Returns 1.0 instead of 0 so scores stay defined when every
/// weight is zero.
///
/// The breed weight scales the feature terms but not the flat penalty. A
/// candidate of another breed whose features equal the preferred breed's
/// therefore scores higher as the breed weight grows.
///
/// [`sum_of_squares`]: crate::core::distance::sum_of_squares
pub fn max_distance(weights: &WeightVector, ranges: &RangeModel, feature_names: &[String]) -> f64 {
    let weights = weights.sanitized();

    let scalar = ranges.age.full_scale_term(weights.age)
        + ranges.gender.full_scale_term(weights.gender)
        + ranges.size.full_scale_term(weights.size);

    let features: f64 = feature_names
        .iter()
        .map(|name| ranges.feature(name).full_scale_term(weights.breed))
        .sum();

    let max = (scalar + features + ranges.mismatch_penalty()).sqrt();

    if max > 0.0 && max.is_finite() {
        max
    } else {
        1.0
    }
}

/// Convert a raw distance into a score in `[0, 100]`, rounded to one decimal
///
/// Distances beyond the theoretical maximum clamp to 0. A non-finite
/// distance also scores 0.
#[inline]
pub fn distance_to_score(raw_distance: f64, max_distance: f64) -> f64 {
    if !raw_distance.is_finite() || !max_distance.is_finite() || max_distance <= 0.0 {
        return 0.0;
    }

    let ratio = (raw_distance / max_distance).clamp(0.0, 1.0);
    round_to_tenth((1.0 - ratio) * 100.0)
}

#[inline]
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
