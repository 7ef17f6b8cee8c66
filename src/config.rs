//! Scoring configuration
//!
//! A small immutable parameter bundle supplied per call. Every field has a
//! named default so a request may override any subset of it.

use crate::error::ScoreError;
use serde::{Deserialize, Serialize};

/// Calibration steepness; chosen so mid-range answers land near the ceiling
pub const DEFAULT_CALIBRATION_K: f64 = 1.936428228;

/// Calibrated value of a raw 10 ("no life is a perfect 10")
pub const DEFAULT_CALIBRATION_MAX: f64 = 8.75;

/// Upper bound for the calibration ceiling; qualities live on a 0-10 scale
pub const MAX_CALIBRATION_CEILING: f64 = 10.0;

pub const DEFAULT_RI_MULTIPLIER: f64 = 1.0;

/// Cross-lift strength, an empirical tuning knob
pub const DEFAULT_CROSS_LIFT_ALPHA: f64 = 20.0;

/// Calibration curve parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub k: f64,
    pub max: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_CALIBRATION_K,
            max: DEFAULT_CALIBRATION_MAX,
        }
    }
}

/// Residual Influence scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RiConfig {
    pub global_multiplier: f64,
}

impl Default for RiConfig {
    fn default() -> Self {
        Self {
            global_multiplier: DEFAULT_RI_MULTIPLIER,
        }
    }
}

/// Spillover from uplifting time into Work quality
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossLiftConfig {
    pub enabled: bool,
    pub alpha: f64,
}

impl Default for CrossLiftConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            alpha: DEFAULT_CROSS_LIFT_ALPHA,
        }
    }
}

/// How the Emotional Load Index caps the final score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliModel {
    /// `(10 - 0.2 * ELI) / 10`; every ELI lowers the ceiling a little
    #[default]
    Ceiling,
    /// ELI 5 is neutral, scaling linearly to +10% at ELI 1 and -10% at ELI 10
    Centered,
}

impl EliModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EliModel::Ceiling => "ceiling",
            EliModel::Centered => "centered",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EliConfig {
    pub model: EliModel,
}

/// Full scoring configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringConfig {
    pub calibration: CalibrationConfig,
    pub ri: RiConfig,
    pub cross_lift: CrossLiftConfig,
    pub eli: EliConfig,
}

impl ScoringConfig {
    /// Load a configuration from JSON, rejecting values the engine would replace
    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        let config: ScoringConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is usable as-is
    pub fn validate(&self) -> Result<(), ScoreError> {
        let cal = &self.calibration;
        if !(cal.k.is_finite() && cal.k > 0.0) {
            return Err(ScoreError::InvalidConfig(format!(
                "calibration.k must be a positive number, got {}",
                cal.k
            )));
        }
        if !(cal.max.is_finite() && cal.max > 0.0 && cal.max <= MAX_CALIBRATION_CEILING) {
            return Err(ScoreError::InvalidConfig(format!(
                "calibration.max must be in (0, {}], got {}",
                MAX_CALIBRATION_CEILING, cal.max
            )));
        }
        if !self.ri.global_multiplier.is_finite() {
            return Err(ScoreError::InvalidConfig(
                "ri.globalMultiplier must be a finite number".to_string(),
            ));
        }
        if !(self.cross_lift.alpha.is_finite() && self.cross_lift.alpha >= 0.0) {
            return Err(ScoreError::InvalidConfig(format!(
                "crossLift.alpha must be a non-negative number, got {}",
                self.cross_lift.alpha
            )));
        }
        Ok(())
    }

    /// Replace unusable values so scoring stays total
    pub fn sanitized(&self) -> Self {
        let mut config = *self;

        if !(config.calibration.k.is_finite() && config.calibration.k > 0.0) {
            config.calibration.k = DEFAULT_CALIBRATION_K;
        }
        let max = config.calibration.max;
        config.calibration.max = if max.is_finite() && max > 0.0 {
            max.min(MAX_CALIBRATION_CEILING)
        } else {
            DEFAULT_CALIBRATION_MAX
        };

        if !config.ri.global_multiplier.is_finite() {
            config.ri.global_multiplier = DEFAULT_RI_MULTIPLIER;
        }

        let alpha = config.cross_lift.alpha;
        config.cross_lift.alpha = if alpha.is_finite() {
            alpha.max(0.0)
        } else {
            DEFAULT_CROSS_LIFT_ALPHA
        };

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.calibration.max, 8.75);
        assert_eq!(config.ri.global_multiplier, 1.0);
        assert!(!config.cross_lift.enabled);
        assert_eq!(config.cross_lift.alpha, 20.0);
        assert_eq!(config.eli.model, EliModel::Ceiling);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_field_defaults() {
        let config = ScoringConfig::from_json(
            r#"{"calibration": {"max": 9.5}, "crossLift": {"enabled": true}, "eli": {"model": "centered"}}"#,
        )
        .unwrap();

        assert_eq!(config.calibration.k, DEFAULT_CALIBRATION_K);
        assert_eq!(config.calibration.max, 9.5);
        assert!(config.cross_lift.enabled);
        assert_eq!(config.cross_lift.alpha, DEFAULT_CROSS_LIFT_ALPHA);
        assert_eq!(config.eli.model, EliModel::Centered);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ScoringConfig::default();
        config.calibration.k = 0.0;
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::default();
        config.calibration.max = 12.0;
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::default();
        config.cross_lift.alpha = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sanitized_replaces_unusable_values() {
        let mut config = ScoringConfig::default();
        config.calibration.k = f64::NAN;
        config.calibration.max = 25.0;
        config.ri.global_multiplier = f64::INFINITY;
        config.cross_lift.alpha = -3.0;

        let clean = config.sanitized();
        assert_eq!(clean.calibration.k, DEFAULT_CALIBRATION_K);
        assert_eq!(clean.calibration.max, MAX_CALIBRATION_CEILING);
        assert_eq!(clean.ri.global_multiplier, DEFAULT_RI_MULTIPLIER);
        assert_eq!(clean.cross_lift.alpha, 0.0);
        assert!(clean.validate().is_ok());
    }

    #[test]
    fn test_sanitized_is_identity_for_valid_config() {
        let config = ScoringConfig::default();
        assert_eq!(config.sanitized(), config);
    }
}
