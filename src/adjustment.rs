//! Residual Influence and emotional ceiling adjustment
//!
//! Residual Influence (RI) rates how much a category's mood carries into the
//! rest of the week. Each category's RI maps onto a bounded internal effect:
//! - RI 1 → -0.30, RI 5 → 0, RI 10 → +0.30
//! - draining steps (0.075 per point) are larger than uplifting ones (0.06)
//!
//! The hours-weighted sum of those effects nudges the raw score
//! multiplicatively, then the Emotional Load Index caps the result.

use crate::blend::TimeAllocation;
use crate::config::{EliModel, ScoringConfig};
use crate::types::{DEFAULT_ELI, NEUTRAL_RI};

/// Internal effect per RI point below neutral
const DRAIN_STEP: f64 = 0.075;

/// Internal effect per RI point above neutral
const UPLIFT_STEP: f64 = 0.06;

/// Ceiling lost per ELI point under the ceiling model
const CEILING_ELI_SLOPE: f64 = 0.2;

/// Largest swing of the centered model, reached at ELI 1 and ELI 10
const CENTERED_SWING: f64 = 0.10;

/// Map a 1-10 RI rating onto its internal effect in [-0.30, +0.30]
pub fn ri_to_internal(ri: f64) -> f64 {
    if !ri.is_finite() {
        return 0.0;
    }
    let ri = ri.clamp(1.0, 10.0);
    if ri < NEUTRAL_RI {
        (ri - NEUTRAL_RI) * DRAIN_STEP
    } else if ri > NEUTRAL_RI {
        (ri - NEUTRAL_RI) * UPLIFT_STEP
    } else {
        0.0
    }
}

/// Hours-weighted RI effect across the week.
///
/// Sleep carries no RI of its own; its quality is already derived from the
/// waking hours. The synthetic Other bucket uses the catch-all RI.
pub fn net_ri(allocation: &TimeAllocation) -> f64 {
    let week = allocation.week_span();

    let logged: f64 = allocation
        .awake_slots()
        .iter()
        .map(|slot| (slot.hours / week) * ri_to_internal(slot.ri))
        .sum();

    logged + (allocation.other_awake / week) * ri_to_internal(allocation.other_ri)
}

/// Multiplier applied by the Emotional Load Index
pub fn ceiling_factor(model: EliModel, eli: f64) -> f64 {
    let eli = if eli.is_finite() {
        eli.clamp(1.0, 10.0)
    } else {
        DEFAULT_ELI
    };

    match model {
        EliModel::Ceiling => (10.0 - CEILING_ELI_SLOPE * eli) / 10.0,
        EliModel::Centered => {
            if eli >= 5.0 {
                1.0 - CENTERED_SWING * (eli - 5.0) / 5.0
            } else {
                1.0 + CENTERED_SWING * (5.0 - eli) / 4.0
            }
        }
    }
}

/// Adjusted scores for one raw score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjusted {
    pub ri_adjusted: f64,
    pub final_lmi: f64,
}

/// RI and ceiling adjustment for one week.
///
/// Net RI and the ceiling depend only on the time map and ELI, so the same
/// adjuster serves both the current and the scenario scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualAdjuster {
    pub net_ri: f64,
    pub multiplier: f64,
    pub ceiling_factor: f64,
}

impl ResidualAdjuster {
    pub fn new(allocation: &TimeAllocation, config: &ScoringConfig, eli: f64) -> Self {
        Self {
            net_ri: net_ri(allocation),
            multiplier: config.ri.global_multiplier,
            ceiling_factor: ceiling_factor(config.eli.model, eli),
        }
    }

    pub fn apply(&self, raw_lms: f64) -> Adjusted {
        let ri_adjusted = raw_lms * (1.0 + self.multiplier * self.net_ri);
        Adjusted {
            ri_adjusted,
            final_lmi: ri_adjusted * self.ceiling_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TimeCategory, TimeRow};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_ri_to_internal_endpoints() {
        assert!(approx(ri_to_internal(1.0), -0.30));
        assert_eq!(ri_to_internal(5.0), 0.0);
        assert!(approx(ri_to_internal(10.0), 0.30));
    }

    #[test]
    fn test_ri_drains_faster_than_it_uplifts() {
        let drain = ri_to_internal(4.0).abs();
        let uplift = ri_to_internal(6.0);
        assert!(drain > uplift);
        assert!(approx(drain, 0.075));
        assert!(approx(uplift, 0.06));
    }

    #[test]
    fn test_ri_out_of_range_is_clamped() {
        assert_eq!(ri_to_internal(0.0), ri_to_internal(1.0));
        assert_eq!(ri_to_internal(42.0), ri_to_internal(10.0));
        assert_eq!(ri_to_internal(f64::NAN), 0.0);
    }

    #[test]
    fn test_net_ri_neutral_is_exactly_zero() {
        let rows: Vec<TimeRow> = TimeCategory::ALL
            .iter()
            .map(|c| TimeRow::neutral(*c, 10.0))
            .collect();
        let allocation = TimeAllocation::from_rows(&rows);
        assert_eq!(net_ri(&allocation), 0.0);
    }

    #[test]
    fn test_net_ri_weights_by_share_of_week() {
        let rows = vec![
            TimeRow::neutral(TimeCategory::Sleep, 56.0),
            TimeRow::new(TimeCategory::Work, 42.0, 1.0),
            TimeRow::new(TimeCategory::Relationships, 14.0, 10.0),
        ];
        let allocation = TimeAllocation::from_rows(&rows);
        // Other bucket (56h) stays neutral
        let expected = (42.0 / 168.0) * -0.30 + (14.0 / 168.0) * 0.30;
        assert!(approx(net_ri(&allocation), expected));
    }

    #[test]
    fn test_net_ri_uses_catch_all_ri_for_other_bucket() {
        let rows = vec![
            TimeRow::neutral(TimeCategory::Sleep, 56.0),
            TimeRow::new(TimeCategory::Other, 0.0, 10.0),
        ];
        let allocation = TimeAllocation::from_rows(&rows);
        // All 112 awake hours fall into Other at RI 10
        assert!(approx(net_ri(&allocation), (112.0 / 168.0) * 0.30));
    }

    #[test]
    fn test_ceiling_model() {
        assert!(approx(ceiling_factor(EliModel::Ceiling, 1.0), 0.98));
        assert!(approx(ceiling_factor(EliModel::Ceiling, 5.0), 0.90));
        assert!(approx(ceiling_factor(EliModel::Ceiling, 10.0), 0.80));
        assert_eq!(
            ceiling_factor(EliModel::Ceiling, f64::NAN),
            ceiling_factor(EliModel::Ceiling, DEFAULT_ELI)
        );
        assert_eq!(
            ceiling_factor(EliModel::Ceiling, 30.0),
            ceiling_factor(EliModel::Ceiling, 10.0)
        );
    }

    #[test]
    fn test_centered_model_is_symmetric_around_five() {
        assert_eq!(ceiling_factor(EliModel::Centered, 5.0), 1.0);
        assert!(approx(ceiling_factor(EliModel::Centered, 1.0), 1.10));
        assert!(approx(ceiling_factor(EliModel::Centered, 10.0), 0.90));
        assert!(ceiling_factor(EliModel::Centered, 3.0) > 1.0);
        assert!(ceiling_factor(EliModel::Centered, 7.0) < 1.0);
    }

    #[test]
    fn test_neutral_ri_leaves_raw_score_untouched() {
        let allocation = TimeAllocation::from_rows(&[TimeRow::neutral(TimeCategory::Work, 40.0)]);
        let adjuster = ResidualAdjuster::new(&allocation, &ScoringConfig::default(), 5.0);
        let adjusted = adjuster.apply(6.4);

        assert_eq!(adjusted.ri_adjusted, 6.4);
        assert!(approx(adjusted.final_lmi, 6.4 * 0.9));
    }

    #[test]
    fn test_global_multiplier_scales_effect() {
        let allocation = TimeAllocation::from_rows(&[
            TimeRow::neutral(TimeCategory::Sleep, 56.0),
            TimeRow::new(TimeCategory::Work, 112.0, 1.0),
        ]);
        let mut config = ScoringConfig::default();
        config.ri.global_multiplier = 0.5;
        let adjuster = ResidualAdjuster::new(&allocation, &config, 1.0);

        let expected_net = (112.0 / 168.0) * -0.30;
        assert!(approx(adjuster.net_ri, expected_net));
        let adjusted = adjuster.apply(8.0);
        assert!(approx(adjusted.ri_adjusted, 8.0 * (1.0 + 0.5 * expected_net)));
    }
}
