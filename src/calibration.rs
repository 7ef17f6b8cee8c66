//! Answer calibration
//!
//! Maps raw 1-10 answers onto a realistic 0..max scale with an exponential
//! saturation curve:
//!
//! ```text
//! calibrated = max * (1 - e^(-k * x/10)) / (1 - e^(-k))
//! ```
//!
//! The curve is concave, so mid-range answers land much closer to the ceiling
//! than a linear mapping would put them. A raw 10 maps exactly onto `max`.

use crate::config::CalibrationConfig;
use crate::types::{Answer, QUESTION_COUNT};

/// Calibrate one raw score. Unanswered stays unanswered.
pub fn calibrate(raw: Option<f64>, k: f64, max: f64) -> Option<f64> {
    let raw = raw.filter(|s| s.is_finite())?;
    let x = raw.clamp(1.0, 10.0);
    let num = 1.0 - (-k * (x / 10.0)).exp();
    let den = 1.0 - (-k).exp();
    Some(max * (num / den))
}

/// Calibrator for a full answer sheet
pub struct Calibrator;

impl Calibrator {
    /// Calibrate the current scores, one slot per question
    pub fn calibrate_answers(answers: &[Answer], config: &CalibrationConfig) -> Vec<Option<f64>> {
        Self::calibrate_with(answers, config, |a| a.score)
    }

    /// Calibrate the scenario scores, falling back to the current score
    pub fn calibrate_scenario(answers: &[Answer], config: &CalibrationConfig) -> Vec<Option<f64>> {
        Self::calibrate_with(answers, config, |a| a.scenario_score.or(a.score))
    }

    fn calibrate_with<F>(answers: &[Answer], config: &CalibrationConfig, pick: F) -> Vec<Option<f64>>
    where
        F: Fn(&Answer) -> Option<f64>,
    {
        (0..QUESTION_COUNT)
            .map(|i| {
                answers
                    .get(i)
                    .and_then(|a| calibrate(pick(a), config.k, config.max))
            })
            .collect()
    }
}
