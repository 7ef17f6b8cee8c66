//! Core types for the Life Morale engine
//!
//! This module defines the data that flows through each stage of the engine:
//! survey answers and time rows on the way in, dimension averages and the
//! scored output on the way out.

use crate::config::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Number of survey questions the engine reads
pub const QUESTION_COUNT: usize = 24;

/// Hours in the weekly time budget
pub const WEEK_HOURS: f64 = 168.0;

/// Residual Influence rating that has no effect
pub const NEUTRAL_RI: f64 = 5.0;

/// Emotional Load Index used when the caller supplies none
pub const DEFAULT_ELI: f64 = 5.0;

/// One survey response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Raw score 1-10, `None` when unanswered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// "What-if" score for scenario scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_score: Option<f64>,
    /// Free-text note shown next to drainers/uplifters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Answer {
    /// An answered question
    pub fn scored(score: f64) -> Self {
        Self {
            score: Some(score),
            ..Default::default()
        }
    }

    /// A question left blank
    pub fn unanswered() -> Self {
        Self::default()
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_scenario(mut self, scenario_score: f64) -> Self {
        self.scenario_score = Some(scenario_score);
        self
    }
}

/// Weekly time-map category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeCategory {
    Sleep,
    Work,
    Commute,
    Relationships,
    Leisure,
    /// Exercise and self-care; older clients call this "Gym"
    #[serde(alias = "Gym")]
    Health,
    Chores,
    Growth,
    Other,
}

impl TimeCategory {
    pub const ALL: [TimeCategory; 9] = [
        TimeCategory::Sleep,
        TimeCategory::Work,
        TimeCategory::Commute,
        TimeCategory::Relationships,
        TimeCategory::Leisure,
        TimeCategory::Health,
        TimeCategory::Chores,
        TimeCategory::Growth,
        TimeCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeCategory::Sleep => "Sleep",
            TimeCategory::Work => "Work",
            TimeCategory::Commute => "Commute",
            TimeCategory::Relationships => "Relationships",
            TimeCategory::Leisure => "Leisure",
            TimeCategory::Health => "Health",
            TimeCategory::Chores => "Chores",
            TimeCategory::Growth => "Growth",
            TimeCategory::Other => "Other",
        }
    }

    /// Parse a category label, ignoring case and surrounding whitespace
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "sleep" => Some(TimeCategory::Sleep),
            "work" => Some(TimeCategory::Work),
            "commute" => Some(TimeCategory::Commute),
            "relationships" => Some(TimeCategory::Relationships),
            "leisure" => Some(TimeCategory::Leisure),
            "health" | "gym" => Some(TimeCategory::Health),
            "chores" => Some(TimeCategory::Chores),
            "growth" => Some(TimeCategory::Growth),
            "other" => Some(TimeCategory::Other),
            _ => None,
        }
    }

    /// Categories whose time is absorbed by the synthetic "Other" bucket
    pub fn is_catch_all(&self) -> bool {
        matches!(
            self,
            TimeCategory::Chores | TimeCategory::Growth | TimeCategory::Other
        )
    }
}

/// One weekly time-budget row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRow {
    pub category: TimeCategory,
    /// Hours per week (non-negative)
    pub hours: f64,
    /// Residual Influence 1-10, 5 = neutral
    pub ri: f64,
}

impl TimeRow {
    pub fn new(category: TimeCategory, hours: f64, ri: f64) -> Self {
        Self {
            category,
            hours,
            ri,
        }
    }

    /// A row with neutral Residual Influence
    pub fn neutral(category: TimeCategory, hours: f64) -> Self {
        Self::new(category, hours, NEUTRAL_RI)
    }
}

/// Life dimension a survey question belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Fulfillment,
    Connection,
    Autonomy,
    Vitality,
    Peace,
}

impl Dimension {
    /// Canonical order, also used to break ties
    pub const ALL: [Dimension; 5] = [
        Dimension::Fulfillment,
        Dimension::Connection,
        Dimension::Autonomy,
        Dimension::Vitality,
        Dimension::Peace,
    ];

    /// Question indices assigned to this dimension
    pub fn indices(&self) -> Range<usize> {
        match self {
            Dimension::Fulfillment => 0..5,
            Dimension::Connection => 5..10,
            Dimension::Autonomy => 10..15,
            Dimension::Vitality => 15..20,
            Dimension::Peace => 20..24,
        }
    }

    /// Dimension for a question index, `None` past the last question
    pub fn for_question(index: usize) -> Option<Dimension> {
        Dimension::ALL
            .into_iter()
            .find(|d| d.indices().contains(&index))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Fulfillment => "Fulfillment",
            Dimension::Connection => "Connection",
            Dimension::Autonomy => "Autonomy",
            Dimension::Vitality => "Vitality",
            Dimension::Peace => "Peace",
        }
    }
}

/// Per-dimension average of calibrated answers; `None` means no data
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DimensionAverages {
    pub fulfillment: Option<f64>,
    pub connection: Option<f64>,
    pub autonomy: Option<f64>,
    pub vitality: Option<f64>,
    pub peace: Option<f64>,
}

impl DimensionAverages {
    pub fn get(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Fulfillment => self.fulfillment,
            Dimension::Connection => self.connection,
            Dimension::Autonomy => self.autonomy,
            Dimension::Vitality => self.vitality,
            Dimension::Peace => self.peace,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: Option<f64>) {
        match dimension {
            Dimension::Fulfillment => self.fulfillment = value,
            Dimension::Connection => self.connection = value,
            Dimension::Autonomy => self.autonomy = value,
            Dimension::Vitality => self.vitality = value,
            Dimension::Peace => self.peace = value,
        }
    }
}

/// Flag recorded when the boundary had to coerce a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFlag {
    AnswersNotArray,
    TimeMapNotArray,
    ExtraAnswersIgnored,
    MalformedAnswer,
    NonNumericScore,
    ScoreOutOfRange,
    MalformedTimeRow,
    UnknownCategory,
    DuplicateCategory,
    NonNumericHours,
    NegativeHours,
    HoursOutOfRange,
    InvalidRi,
    InvalidEli,
    InvalidConfig,
}

impl InputFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFlag::AnswersNotArray => "answers_not_array",
            InputFlag::TimeMapNotArray => "time_map_not_array",
            InputFlag::ExtraAnswersIgnored => "extra_answers_ignored",
            InputFlag::MalformedAnswer => "malformed_answer",
            InputFlag::NonNumericScore => "non_numeric_score",
            InputFlag::ScoreOutOfRange => "score_out_of_range",
            InputFlag::MalformedTimeRow => "malformed_time_row",
            InputFlag::UnknownCategory => "unknown_category",
            InputFlag::DuplicateCategory => "duplicate_category",
            InputFlag::NonNumericHours => "non_numeric_hours",
            InputFlag::NegativeHours => "negative_hours",
            InputFlag::HoursOutOfRange => "hours_out_of_range",
            InputFlag::InvalidRi => "invalid_ri",
            InputFlag::InvalidEli => "invalid_eli",
            InputFlag::InvalidConfig => "invalid_config",
        }
    }
}

/// Validated input handed to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    pub answers: Vec<Answer>,
    pub time_map: Vec<TimeRow>,
    /// Emotional Load Index 1-10
    #[serde(rename = "ELI", alias = "eli", default = "default_eli")]
    pub eli: f64,
    #[serde(default)]
    pub config: ScoringConfig,
    /// Coercions applied at the boundary
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<InputFlag>,
}

fn default_eli() -> f64 {
    DEFAULT_ELI
}

impl Default for ScoreInput {
    fn default() -> Self {
        Self {
            answers: Vec::new(),
            time_map: Vec::new(),
            eli: DEFAULT_ELI,
            config: ScoringConfig::default(),
            flags: Vec::new(),
        }
    }
}

impl ScoreInput {
    pub fn new(answers: Vec<Answer>, time_map: Vec<TimeRow>) -> Self {
        Self {
            answers,
            time_map,
            ..Default::default()
        }
    }

    pub fn with_eli(mut self, eli: f64) -> Self {
        self.eli = eli;
        self
    }

    pub fn with_config(mut self, config: ScoringConfig) -> Self {
        self.config = config;
        self
    }

    /// True when any answer carries a scenario score
    pub fn has_scenario(&self) -> bool {
        self.answers
            .iter()
            .take(QUESTION_COUNT)
            .any(|a| a.scenario_score.is_some())
    }
}

/// A raw answer surfaced as a drainer or uplifter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAnswer {
    /// Question index (0-based)
    pub index: usize,
    /// Raw, uncalibrated score
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Display band for a final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    High,
    Solid,
    NeedsAttention,
    Low,
}

impl Band {
    pub fn from_score(score: f64) -> Self {
        if score >= 7.5 {
            Band::High
        } else if score >= 6.0 {
            Band::Solid
        } else if score >= 4.5 {
            Band::NeedsAttention
        } else {
            Band::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Band::High => "High",
            Band::Solid => "Solid",
            Band::NeedsAttention => "Needs attention",
            Band::Low => "Low",
        }
    }
}

/// Whether the logged hours fill the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBudgetStatus {
    Balanced,
    Under,
    Over,
}

/// Completeness of the submitted input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSummary {
    pub answered: usize,
    /// Share of the 24 questions answered, 0-100
    pub completion_pct: u32,
    pub logged_hours: f64,
    /// 168 minus logged hours; negative when over-allocated
    pub remaining_hours: f64,
    pub time_budget: TimeBudgetStatus,
}

/// Intermediate numbers from the blend and adjustment stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendBreakdown {
    pub sleep_hours: f64,
    pub awake_hours: f64,
    pub allocated_awake: f64,
    pub other_awake: f64,
    pub awake_quality: f64,
    pub sleep_quality: f64,
    /// Work quality after cross-lift
    pub work_quality: f64,
    pub cross_lift_uplift: f64,
    #[serde(rename = "netRI")]
    pub net_ri: f64,
    pub ceiling_factor: f64,
}

/// Scores for the "what-if" answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioScores {
    pub calibrated: Vec<Option<f64>>,
    pub dimension_averages: DimensionAverages,
    #[serde(rename = "rawLMS")]
    pub raw_lms: f64,
    pub ri_adjusted: f64,
    #[serde(rename = "finalLMI")]
    pub final_lmi: f64,
    pub band: Band,
}

/// Complete engine result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutput {
    /// Headline score after RI and emotional ceiling
    #[serde(rename = "finalLMI")]
    pub final_lmi: f64,
    /// Time-weighted quality before adjustments
    #[serde(rename = "rawLMS")]
    pub raw_lms: f64,
    pub ri_adjusted: f64,
    pub band: Band,
    /// One entry per question, `None` when unanswered
    pub calibrated: Vec<Option<f64>>,
    pub dimension_averages: DimensionAverages,
    pub overall_average: Option<f64>,
    pub top_drainers: Vec<RankedAnswer>,
    pub top_uplifters: Vec<RankedAnswer>,
    pub dominant_drainer: Option<Dimension>,
    pub dominant_uplifter: Option<Dimension>,
    pub breakdown: BlendBreakdown,
    pub summary: InputSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<ScenarioScores>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<InputFlag>,
}
