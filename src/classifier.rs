//! Prediction service: maps five sensor values to an occupancy label.
//!
//! The model is a pretrained artifact loaded once at startup. Handlers only
//! see the [`Classifier`] trait, so tests can swap in a stub.

use std::path::Path;

use serde::Deserialize;

use crate::models::{Occupancy, FEATURE_COUNT, FEATURE_NAMES};

// ---

/// Opaque pretrained classifier.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<Occupancy, PredictionError>;
}

/// Failure while invoking the classifier.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("feature '{feature}' is not a finite number: {value}")]
    NonFiniteInput { feature: &'static str, value: f64 },

    #[error("model produced an undefined score")]
    NonFiniteScore,
}

/// Failure while loading a model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model expects features {found:?}, service provides {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("model has {0} coefficients, expected 5")]
    CoefficientCount(usize),

    #[error("model parameters must be finite")]
    NonFiniteParameter,
}

/// On-disk layout of a logistic-regression artifact.
#[derive(Debug, Deserialize)]
struct ModelFile {
    features: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

/// Logistic-regression classifier over the raw sensor features.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    // ---
    coefficients: [f64; FEATURE_COUNT],
    intercept: f64,
    threshold: f64,
}

impl LogisticModel {
    // ---
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and validate a model artifact.
    ///
    /// The artifact's feature list must match [`FEATURE_NAMES`] exactly, in
    /// order, since the service always builds vectors in that order.
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        // ---
        let file: ModelFile = serde_json::from_str(raw)?;

        if file.features.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(ModelError::FeatureMismatch {
                expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                found: file.features,
            });
        }

        let coefficients: [f64; FEATURE_COUNT] = file
            .coefficients
            .as_slice()
            .try_into()
            .map_err(|_| ModelError::CoefficientCount(file.coefficients.len()))?;

        let params_finite = coefficients.iter().all(|c| c.is_finite())
            && file.intercept.is_finite()
            && file.threshold.is_finite();
        if !params_finite {
            return Err(ModelError::NonFiniteParameter);
        }

        Ok(LogisticModel {
            coefficients,
            intercept: file.intercept,
            threshold: file.threshold,
        })
    }

    /// Probability that the room is occupied.
    pub fn probability(&self, features: &[f64; FEATURE_COUNT]) -> Result<f64, PredictionError> {
        // ---
        for (name, value) in FEATURE_NAMES.iter().zip(features) {
            if !value.is_finite() {
                return Err(PredictionError::NonFiniteInput {
                    feature: *name,
                    value: *value,
                });
            }
        }

        let logit = self
            .coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (w, x)| acc + w * x);

        // An overflowing logit saturates the sigmoid at 0 or 1; only opposing
        // infinite terms leave it undefined.
        if logit.is_nan() {
            return Err(PredictionError::NonFiniteScore);
        }
        Ok(1.0 / (1.0 + (-logit).exp()))
    }
}

impl Classifier for LogisticModel {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<Occupancy, PredictionError> {
        let p = self.probability(features)?;
        tracing::debug!("occupancy probability {:.4}", p);

        if p >= self.threshold {
            Ok(Occupancy::Occupied)
        } else {
            Ok(Occupancy::Unoccupied)
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    const BUNDLED_MODEL: &str = include_str!("../models/occupancy.json");

    #[test]
    fn test_bundled_model_loads() {
        // ---
        assert!(LogisticModel::from_json(BUNDLED_MODEL).is_ok());
    }

    #[test]
    fn test_bright_room_with_high_co2_is_occupied() {
        // ---
        let model = LogisticModel::from_json(BUNDLED_MODEL).unwrap();
        let label = model.predict(&[22.5, 40.0, 300.0, 450.0, 0.004]).unwrap();
        assert_eq!(label, Occupancy::Occupied);
    }

    #[test]
    fn test_dark_room_is_unoccupied() {
        // ---
        let model = LogisticModel::from_json(BUNDLED_MODEL).unwrap();
        let label = model.predict(&[20.0, 27.0, 0.0, 440.0, 0.004]).unwrap();
        assert_eq!(label, Occupancy::Unoccupied);
    }

    #[test]
    fn test_out_of_range_values_still_predict() {
        // ---
        let model = LogisticModel::from_json(BUNDLED_MODEL).unwrap();
        assert!(model.predict(&[-40.0, -5.0, 0.0, 0.0, -1.0]).is_ok());
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        // ---
        let model = LogisticModel::from_json(BUNDLED_MODEL).unwrap();
        let err = model
            .predict(&[22.0, f64::NAN, 300.0, 450.0, 0.004])
            .unwrap_err();
        assert!(matches!(
            err,
            PredictionError::NonFiniteInput {
                feature: "humidity",
                ..
            }
        ));
    }

    #[test]
    fn test_overflowing_score_saturates() {
        // ---
        let model = LogisticModel::from_json(BUNDLED_MODEL).unwrap();
        assert_eq!(
            model.predict(&[22.5, 40.0, 300.0, 450.0, 1e307]).unwrap(),
            Occupancy::Occupied
        );
        assert_eq!(
            model.predict(&[22.5, 40.0, 300.0, 450.0, -1e307]).unwrap(),
            Occupancy::Unoccupied
        );
        assert_eq!(model.probability(&[0.0, 0.0, 0.0, 0.0, 1e307]).unwrap(), 1.0);
    }

    #[test]
    fn test_opposing_infinite_terms_are_rejected() {
        // ---
        let raw = r#"{
            "features": ["temperature", "humidity", "light", "co2", "humidity_ratio"],
            "coefficients": [1e300, -1e300, 0, 0, 0],
            "intercept": 0.0
        }"#;
        let model = LogisticModel::from_json(raw).unwrap();
        assert!(matches!(
            model.predict(&[1e300, 1e300, 0.0, 0.0, 0.0]),
            Err(PredictionError::NonFiniteScore)
        ));
    }

    #[test]
    fn test_threshold_defaults_to_half() {
        // ---
        let raw = r#"{
            "features": ["temperature", "humidity", "light", "co2", "humidity_ratio"],
            "coefficients": [0, 0, 0, 0, 0],
            "intercept": 0.0
        }"#;
        let model = LogisticModel::from_json(raw).unwrap();
        // sigmoid(0) == 0.5 sits exactly on the threshold
        assert_eq!(
            model.predict(&[1.0, 1.0, 1.0, 1.0, 1.0]).unwrap(),
            Occupancy::Occupied
        );
    }

    #[test]
    fn test_feature_order_mismatch_is_rejected() {
        // ---
        let raw = r#"{
            "features": ["humidity", "temperature", "light", "co2", "humidity_ratio"],
            "coefficients": [1, 1, 1, 1, 1],
            "intercept": 0.0
        }"#;
        assert!(matches!(
            LogisticModel::from_json(raw),
            Err(ModelError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_wrong_coefficient_count_is_rejected() {
        // ---
        let raw = r#"{
            "features": ["temperature", "humidity", "light", "co2", "humidity_ratio"],
            "coefficients": [1, 1, 1],
            "intercept": 0.0
        }"#;
        assert!(matches!(
            LogisticModel::from_json(raw),
            Err(ModelError::CoefficientCount(3))
        ));
    }
}
