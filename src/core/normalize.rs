use std::collections::HashMap;
use thiserror::Error;

/// Squared-distance contribution added once when breed identities differ
pub const DEFAULT_MISMATCH_PENALTY: f64 = 2.25;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    #[error("range for '{attribute}' must be a positive number, got {value}")]
    InvalidRange { attribute: String, value: f64 },

    #[error("coefficient for '{attribute}' must be a non-negative number, got {value}")]
    InvalidCoefficient { attribute: String, value: f64 },

    #[error("mismatch penalty must be a non-negative number, got {0}")]
    InvalidPenalty(f64),
}

/// Full-scale range and structural coefficient for one attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeScale {
    pub range: f64,
    pub coefficient: f64,
}

impl AttributeScale {
    pub const fn new(range: f64, coefficient: f64) -> Self {
        Self { range, coefficient }
    }

    pub const fn with_range(range: f64) -> Self {
        Self::new(range, 1.0)
    }

    /// Range used for division; anything but a finite positive value reads as 1
    #[inline]
    pub fn effective_range(&self) -> f64 {
        if self.range.is_finite() && self.range > 0.0 {
            self.range
        } else {
            1.0
        }
    }

    #[inline]
    pub fn effective_coefficient(&self) -> f64 {
        if self.coefficient.is_finite() && self.coefficient > 0.0 {
            self.coefficient
        } else {
            0.0
        }
    }

    /// Weighted squared contribution of a raw difference
    #[inline]
    pub fn term(&self, diff: f64, weight: f64) -> f64 {
        let scaled = diff / self.effective_range();
        weight * self.effective_coefficient() * scaled * scaled
    }

    /// Contribution of a difference that spans exactly the full range
    #[inline]
    pub fn full_scale_term(&self, weight: f64) -> f64 {
        weight * self.effective_coefficient()
    }

    fn validate(&self, attribute: &str) -> Result<(), RangeError> {
        if !(self.range.is_finite() && self.range > 0.0) {
            return Err(RangeError::InvalidRange {
                attribute: attribute.to_string(),
                value: self.range,
            });
        }
        if !(self.coefficient.is_finite() && self.coefficient >= 0.0) {
            return Err(RangeError::InvalidCoefficient {
                attribute: attribute.to_string(),
                value: self.coefficient,
            });
        }
        Ok(())
    }
}

impl Default for AttributeScale {
    fn default() -> Self {
        Self::with_range(1.0)
    }
}

/// Per-attribute ranges and coefficients used to bring raw differences into
/// a roughly `[0, 1]` domain before weighting.
///
/// Breed features that have no explicit entry use `default_feature`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeModel {
    pub age: AttributeScale,
    pub gender: AttributeScale,
    pub size: AttributeScale,
    pub default_feature: AttributeScale,
    features: HashMap<String, AttributeScale>,
    mismatch_penalty: f64,
}

impl RangeModel {
    pub fn new(age: AttributeScale, gender: AttributeScale, size: AttributeScale) -> Self {
        Self {
            age,
            gender,
            size,
            default_feature: AttributeScale::default(),
            features: HashMap::new(),
            mismatch_penalty: DEFAULT_MISMATCH_PENALTY,
        }
    }

    pub fn with_feature(mut self, name: impl Into<String>, scale: AttributeScale) -> Self {
        self.features.insert(name.into(), scale);
        self
    }

    pub fn with_mismatch_penalty(mut self, penalty: f64) -> Self {
        self.mismatch_penalty = penalty;
        self
    }

    pub fn feature(&self, name: &str) -> AttributeScale {
        self.features.get(name).copied().unwrap_or(self.default_feature)
    }

    /// Penalty actually applied; negative or non-finite values count as 0
    pub fn mismatch_penalty(&self) -> f64 {
        if self.mismatch_penalty.is_finite() && self.mismatch_penalty > 0.0 {
            self.mismatch_penalty
        } else {
            0.0
        }
    }

    /// Reject ranges and coefficients that would be silently replaced at
    /// scoring time
    pub fn validate(&self) -> Result<(), RangeError> {
        self.age.validate("age")?;
        self.gender.validate("gender")?;
        self.size.validate("size")?;
        self.default_feature.validate("default_feature")?;
        for (name, scale) in &self.features {
            scale.validate(name)?;
        }
        if !(self.mismatch_penalty.is_finite() && self.mismatch_penalty >= 0.0) {
            return Err(RangeError::InvalidPenalty(self.mismatch_penalty));
        }
        Ok(())
    }
}

impl Default for RangeModel {
    fn default() -> Self {
        Self::new(
            AttributeScale::with_range(20.0),
            AttributeScale::with_range(1.0),
            AttributeScale::with_range(2.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_scales_then_weights() {
        let scale = AttributeScale::new(20.0, 2.0);
        // (10 / 20)^2 * weight 3 * coefficient 2
        assert!((scale.term(10.0, 3.0) - 1.5).abs() < 1e-12);
        assert_eq!(scale.full_scale_term(3.0), 6.0);
    }

    #[test]
    fn test_degenerate_range_reads_as_one() {
        let scale = AttributeScale::with_range(0.0);
        assert_eq!(scale.term(2.0, 1.0), 4.0);
        assert_eq!(AttributeScale::with_range(f64::NAN).effective_range(), 1.0);
    }

    #[test]
    fn test_feature_fallback() {
        let model = RangeModel::default().with_feature("Body_Ratio", AttributeScale::new(2.0, 0.5));

        assert_eq!(model.feature("Body_Ratio"), AttributeScale::new(2.0, 0.5));
        assert_eq!(model.feature("Skull_Index"), AttributeScale::default());
    }

    #[test]
    fn test_validate() {
        assert!(RangeModel::default().validate().is_ok());

        let model = RangeModel::default().with_feature("x", AttributeScale::with_range(-1.0));
        assert!(matches!(model.validate(), Err(RangeError::InvalidRange { .. })));

        let model = RangeModel::default().with_mismatch_penalty(-2.0);
        assert_eq!(model.validate(), Err(RangeError::InvalidPenalty(-2.0)));
        assert_eq!(model.mismatch_penalty(), 0.0);
    }
}
