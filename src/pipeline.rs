//! Pipeline orchestration
//!
//! This module provides the public API for the Life Morale engine.
//! It runs a validated request through every stage in order and assembles
//! the scored output.

use crate::adjustment::ResidualAdjuster;
use crate::blend::{BlendResult, CategoryQualities, TimeAllocation, TimeBlender};
use crate::calibration::Calibrator;
use crate::config::ScoringConfig;
use crate::dimensions::{DimensionAggregator, DimensionSummary};
use crate::encoder::{ReportEncoder, ScoreReport};
use crate::error::ScoreError;
use crate::ranking::{dominant_dimension, rank_answers};
use crate::schema::RequestAdapter;
use crate::types::{
    Band, BlendBreakdown, InputSummary, ScenarioScores, ScoreInput, ScoreOutput, TimeBudgetStatus,
    TimeCategory, TimeRow, QUESTION_COUNT, WEEK_HOURS,
};
use tracing::debug;

/// Logged hours within this distance of 168 count as a balanced week
const BALANCED_TOLERANCE_HOURS: f64 = 1e-6;

/// Score a validated request.
///
/// Pipeline stages:
/// 1. Calibrator - Map raw answers onto the calibrated scale
/// 2. DimensionAggregator - Average calibrated answers per dimension
/// 3. TimeBlender - Weight qualities by hours into `rawLMS`
/// 4. ResidualAdjuster - Apply net RI, then the emotional ceiling
/// 5. Ranking - Top drainers and uplifters from the raw answers
///
/// Never fails: partial or out-of-range data takes the documented fallbacks.
pub fn score_lmi(input: &ScoreInput) -> ScoreOutput {
    let config = input.config.sanitized();

    // Stage 1: Calibrate answers
    let calibrated = Calibrator::calibrate_answers(&input.answers, &config.calibration);

    // Stage 2: Aggregate dimensions
    let summary = DimensionAggregator::aggregate(&calibrated);
    debug!(
        answered = calibrated.iter().filter(|c| c.is_some()).count(),
        overall = ?summary.overall,
        "aggregated dimensions"
    );

    // Stage 3: Blend by time
    let allocation = TimeAllocation::from_rows(&input.time_map);
    let blend = blend_week(&allocation, &summary, &config);
    debug!(
        raw_lms = blend.raw_lms,
        awake_quality = blend.awake_quality,
        other_awake = allocation.other_awake,
        "blended week"
    );

    // Stage 4: RI and ceiling
    let adjuster = ResidualAdjuster::new(&allocation, &config, input.eli);
    let adjusted = adjuster.apply(blend.raw_lms);
    debug!(
        net_ri = adjuster.net_ri,
        ceiling_factor = adjuster.ceiling_factor,
        final_lmi = adjusted.final_lmi,
        "applied residual adjustment"
    );

    // Stage 5: Rank raw answers
    let rankings = rank_answers(&input.answers);

    let scenario = if input.has_scenario() {
        let calibrated = Calibrator::calibrate_scenario(&input.answers, &config.calibration);
        let summary = DimensionAggregator::aggregate(&calibrated);
        let blend = blend_week(&allocation, &summary, &config);
        let adjusted = adjuster.apply(blend.raw_lms);
        debug!(final_lmi = adjusted.final_lmi, "scored scenario");

        Some(ScenarioScores {
            calibrated,
            dimension_averages: summary.averages,
            raw_lms: blend.raw_lms,
            ri_adjusted: adjusted.ri_adjusted,
            final_lmi: adjusted.final_lmi,
            band: Band::from_score(adjusted.final_lmi),
        })
    } else {
        None
    };

    ScoreOutput {
        final_lmi: adjusted.final_lmi,
        raw_lms: blend.raw_lms,
        ri_adjusted: adjusted.ri_adjusted,
        band: Band::from_score(adjusted.final_lmi),
        dominant_drainer: dominant_dimension(&rankings.drainers),
        dominant_uplifter: dominant_dimension(&rankings.uplifters),
        top_drainers: rankings.drainers,
        top_uplifters: rankings.uplifters,
        summary: summarize_input(&calibrated, &input.time_map),
        calibrated,
        dimension_averages: summary.averages,
        overall_average: summary.overall,
        breakdown: BlendBreakdown {
            sleep_hours: allocation.sleep.hours,
            awake_hours: allocation.awake_hours,
            allocated_awake: allocation.allocated_awake,
            other_awake: allocation.other_awake,
            awake_quality: blend.awake_quality,
            sleep_quality: blend.sleep_quality,
            work_quality: blend.work_quality,
            cross_lift_uplift: blend.cross_lift_uplift,
            net_ri: adjuster.net_ri,
            ceiling_factor: adjuster.ceiling_factor,
        },
        scenario,
        flags: input.flags.clone(),
    }
}

/// Score a JSON request and return the JSON result.
///
/// # Example
/// ```ignore
/// let output = score_json(r#"{"answers": [{"score": 7}], "timeMap": []}"#.to_string())?;
/// ```
pub fn score_json(request_json: String) -> Result<String, ScoreError> {
    LmiEngine::new().score_json(&request_json)
}

fn blend_week(
    allocation: &TimeAllocation,
    summary: &DimensionSummary,
    config: &ScoringConfig,
) -> BlendResult {
    let qualities = CategoryQualities::from_dimensions(&summary.averages, summary.overall);
    TimeBlender::blend(allocation, &qualities, &config.cross_lift)
}

fn summarize_input(calibrated: &[Option<f64>], rows: &[TimeRow]) -> InputSummary {
    let answered = calibrated.iter().filter(|c| c.is_some()).count();
    let completion_pct = ((answered as f64 / QUESTION_COUNT as f64) * 100.0).round() as u32;

    let mut seen: Vec<TimeCategory> = Vec::with_capacity(rows.len());
    let mut logged_hours = 0.0;
    for row in rows {
        if seen.contains(&row.category) {
            continue;
        }
        seen.push(row.category);
        if row.hours.is_finite() && row.hours > 0.0 {
            logged_hours += row.hours.min(WEEK_HOURS);
        }
    }

    let remaining_hours = WEEK_HOURS - logged_hours;
    let time_budget = if remaining_hours.abs() <= BALANCED_TOLERANCE_HOURS {
        TimeBudgetStatus::Balanced
    } else if remaining_hours > 0.0 {
        TimeBudgetStatus::Under
    } else {
        TimeBudgetStatus::Over
    };

    InputSummary {
        answered,
        completion_pct,
        logged_hours,
        remaining_hours,
        time_budget,
    }
}

/// Engine with default scoring configuration.
///
/// A request's own `config` overlays these defaults field by field.
pub struct LmiEngine {
    defaults: ScoringConfig,
    encoder: ReportEncoder,
}

impl Default for LmiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LmiEngine {
    /// Create an engine with the built-in defaults
    pub fn new() -> Self {
        Self {
            defaults: ScoringConfig::default(),
            encoder: ReportEncoder::new(),
        }
    }

    /// Create an engine with custom defaults
    pub fn with_config(defaults: ScoringConfig) -> Result<Self, ScoreError> {
        defaults.validate()?;
        Ok(Self {
            defaults,
            encoder: ReportEncoder::new(),
        })
    }

    /// Load engine defaults from a JSON config document
    pub fn from_config_json(json: &str) -> Result<Self, ScoreError> {
        Self::with_config(ScoringConfig::from_json(json)?)
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.defaults
    }

    /// Decode a JSON request against this engine's defaults
    pub fn parse(&self, request_json: &str) -> Result<ScoreInput, ScoreError> {
        RequestAdapter::parse_with_defaults(request_json, &self.defaults)
    }

    pub fn score(&self, input: &ScoreInput) -> ScoreOutput {
        score_lmi(input)
    }

    /// Score a JSON request into a compact JSON result
    pub fn score_json(&self, request_json: &str) -> Result<String, ScoreError> {
        let input = self.parse(request_json)?;
        let output = score_lmi(&input);
        serde_json::to_string(&output).map_err(ScoreError::JsonError)
    }

    /// Score a parsed request value (batch and NDJSON entries)
    pub fn score_value(&self, request: &serde_json::Value) -> Result<ScoreOutput, ScoreError> {
        let input = RequestAdapter::from_value(request, &self.defaults)?;
        Ok(score_lmi(&input))
    }

    /// Score a request and wrap the result in a report envelope
    pub fn score_report(&self, request_json: &str) -> Result<ScoreReport, ScoreError> {
        let input = self.parse(request_json)?;
        Ok(self.encoder.encode(score_lmi(&input)))
    }

    /// Same as [`LmiEngine::score_report`], serialized to JSON
    pub fn score_report_json(&self, request_json: &str) -> Result<String, ScoreError> {
        let report = self.score_report(request_json)?;
        serde_json::to_string(&report).map_err(ScoreError::JsonError)
    }

    pub fn encoder(&self) -> &ReportEncoder {
        &self.encoder
    }
}
