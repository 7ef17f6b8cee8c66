//! Adapter for converting score requests into `ScoreInput`
//!
//! The request body must be a JSON object; anything else is a malformed
//! request. Inside the object every field is decoded on its own and coerced
//! to a safe default when unusable, with an `InputFlag` recording what
//! happened.

use crate::config::{EliModel, ScoringConfig, MAX_CALIBRATION_CEILING};
use crate::error::ScoreError;
use crate::schema::fields::{self, Field};
use crate::types::{
    Answer, InputFlag, ScoreInput, TimeCategory, TimeRow, DEFAULT_ELI, NEUTRAL_RI, QUESTION_COUNT,
    WEEK_HOURS,
};
use serde_json::{Map, Value};
use tracing::warn;

/// Adapter for score request payloads
pub struct RequestAdapter;

impl RequestAdapter {
    /// Parse a single request with default scoring configuration
    pub fn parse(json: &str) -> Result<ScoreInput, ScoreError> {
        Self::parse_with_defaults(json, &ScoringConfig::default())
    }

    /// Parse a single request; its `config` overlays `defaults` field by field
    pub fn parse_with_defaults(
        json: &str,
        defaults: &ScoringConfig,
    ) -> Result<ScoreInput, ScoreError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value, defaults)
    }

    /// Parse a JSON array of requests, or a single request object
    pub fn parse_batch(json: &str) -> Result<Vec<Value>, ScoreError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Array(items) => Ok(items),
            other => Ok(vec![other]),
        }
    }

    /// Parse NDJSON (one request per line)
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<Value>, ScoreError> {
        let mut requests = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => requests.push(value),
                Err(e) => {
                    return Err(ScoreError::MalformedRequest(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(requests)
    }

    /// Decode an already-parsed request
    pub fn from_value(value: &Value, defaults: &ScoringConfig) -> Result<ScoreInput, ScoreError> {
        let obj = value.as_object().ok_or_else(|| {
            ScoreError::MalformedRequest(format!(
                "request body must be a JSON object, got {}",
                fields::kind(value)
            ))
        })?;

        let answers_value = fields::lookup(obj, &["answers"]);
        let time_map_value = fields::lookup(obj, &["timeMap", "time_map"]);
        if answers_value.is_none() && time_map_value.is_none() {
            return Err(ScoreError::MalformedRequest(
                "request has neither answers nor timeMap".to_string(),
            ));
        }

        let mut flags = FlagSet::default();
        let answers = decode_answers(answers_value, &mut flags);
        let time_map = decode_time_map(time_map_value, &mut flags);
        let eli = decode_eli(fields::lookup(obj, &["ELI", "eli"]), &mut flags);
        let config = decode_config(fields::lookup(obj, &["config"]), defaults, &mut flags);

        Ok(ScoreInput {
            answers,
            time_map,
            eli,
            config,
            flags: flags.into_vec(),
        })
    }
}

/// Ordered, de-duplicated coercion flags
#[derive(Debug, Default)]
struct FlagSet(Vec<InputFlag>);

impl FlagSet {
    fn raise(&mut self, flag: InputFlag) {
        if !self.0.contains(&flag) {
            warn!(flag = flag.as_str(), "coerced score request field");
            self.0.push(flag);
        }
    }

    fn into_vec(self) -> Vec<InputFlag> {
        self.0
    }
}

fn decode_answers(value: Option<&Value>, flags: &mut FlagSet) -> Vec<Answer> {
    let items = match fields::array(value) {
        Field::Valid(items) => items,
        Field::Missing => return Vec::new(),
        Field::Invalid => {
            flags.raise(InputFlag::AnswersNotArray);
            return Vec::new();
        }
    };

    if items.len() > QUESTION_COUNT {
        flags.raise(InputFlag::ExtraAnswersIgnored);
    }

    items
        .iter()
        .take(QUESTION_COUNT)
        .map(|item| match item {
            Value::Object(obj) => decode_answer(obj, flags),
            Value::Null => Answer::unanswered(),
            _ => {
                flags.raise(InputFlag::MalformedAnswer);
                Answer::unanswered()
            }
        })
        .collect()
}

fn decode_answer(obj: &Map<String, Value>, flags: &mut FlagSet) -> Answer {
    let score = decode_score(fields::lookup(obj, &["score"]), flags);
    let scenario_score = decode_score(
        fields::lookup(obj, &["scenarioScore", "scenario_score"]),
        flags,
    );
    let note = match fields::string(fields::lookup(obj, &["note"])) {
        Field::Valid(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    };

    Answer {
        score,
        scenario_score,
        note,
    }
}

fn decode_score(value: Option<&Value>, flags: &mut FlagSet) -> Option<f64> {
    match fields::number(value) {
        Field::Valid(v) => {
            if !(1.0..=10.0).contains(&v) {
                flags.raise(InputFlag::ScoreOutOfRange);
            }
            Some(v.clamp(1.0, 10.0))
        }
        Field::Missing => None,
        Field::Invalid => {
            flags.raise(InputFlag::NonNumericScore);
            None
        }
    }
}

fn decode_time_map(value: Option<&Value>, flags: &mut FlagSet) -> Vec<TimeRow> {
    let items = match fields::array(value) {
        Field::Valid(items) => items,
        Field::Missing => return Vec::new(),
        Field::Invalid => {
            flags.raise(InputFlag::TimeMapNotArray);
            return Vec::new();
        }
    };

    let mut rows: Vec<TimeRow> = Vec::with_capacity(items.len());
    for item in items {
        let Some(obj) = item.as_object() else {
            flags.raise(InputFlag::MalformedTimeRow);
            continue;
        };

        let category = match fields::string(fields::lookup(obj, &["category"])) {
            Field::Valid(label) => TimeCategory::parse(label),
            _ => None,
        };
        let Some(category) = category else {
            flags.raise(InputFlag::UnknownCategory);
            continue;
        };

        if rows.iter().any(|r| r.category == category) {
            flags.raise(InputFlag::DuplicateCategory);
            continue;
        }

        let hours = match fields::number(fields::lookup(obj, &["hours"])) {
            Field::Valid(h) if h < 0.0 => {
                flags.raise(InputFlag::NegativeHours);
                0.0
            }
            Field::Valid(h) if h > WEEK_HOURS => {
                flags.raise(InputFlag::HoursOutOfRange);
                WEEK_HOURS
            }
            Field::Valid(h) => h,
            Field::Missing => 0.0,
            Field::Invalid => {
                flags.raise(InputFlag::NonNumericHours);
                0.0
            }
        };

        let ri = match fields::number(fields::lookup(obj, &["ri", "RI"])) {
            Field::Valid(ri) => {
                if !(1.0..=10.0).contains(&ri) {
                    flags.raise(InputFlag::InvalidRi);
                }
                ri.clamp(1.0, 10.0)
            }
            Field::Missing => NEUTRAL_RI,
            Field::Invalid => {
                flags.raise(InputFlag::InvalidRi);
                NEUTRAL_RI
            }
        };

        rows.push(TimeRow::new(category, hours, ri));
    }
    rows
}

fn decode_eli(value: Option<&Value>, flags: &mut FlagSet) -> f64 {
    match fields::number(value) {
        Field::Valid(eli) => {
            if !(1.0..=10.0).contains(&eli) {
                flags.raise(InputFlag::InvalidEli);
            }
            eli.clamp(1.0, 10.0)
        }
        Field::Missing => DEFAULT_ELI,
        Field::Invalid => {
            flags.raise(InputFlag::InvalidEli);
            DEFAULT_ELI
        }
    }
}

fn decode_config(
    value: Option<&Value>,
    defaults: &ScoringConfig,
    flags: &mut FlagSet,
) -> ScoringConfig {
    let mut config = *defaults;
    let obj = match fields::object(value) {
        Field::Valid(obj) => obj,
        Field::Missing => return config,
        Field::Invalid => {
            flags.raise(InputFlag::InvalidConfig);
            return config;
        }
    };

    let mut invalid = false;

    if let Some(cal) = section(obj, &["calibration"], &mut invalid) {
        match fields::number(cal.get("k")) {
            Field::Valid(k) if k > 0.0 => config.calibration.k = k,
            Field::Missing => {}
            _ => invalid = true,
        }
        match fields::number(cal.get("max")) {
            Field::Valid(max) if max > 0.0 => {
                if max > MAX_CALIBRATION_CEILING {
                    invalid = true;
                }
                config.calibration.max = max.min(MAX_CALIBRATION_CEILING);
            }
            Field::Missing => {}
            _ => invalid = true,
        }
    }

    if let Some(ri) = section(obj, &["ri"], &mut invalid) {
        match fields::number(fields::lookup(ri, &["globalMultiplier", "global_multiplier"])) {
            Field::Valid(m) => config.ri.global_multiplier = m,
            Field::Missing => {}
            Field::Invalid => invalid = true,
        }
    }

    if let Some(lift) = section(obj, &["crossLift", "cross_lift"], &mut invalid) {
        match fields::boolean(lift.get("enabled")) {
            Field::Valid(enabled) => config.cross_lift.enabled = enabled,
            Field::Missing => {}
            Field::Invalid => invalid = true,
        }
        match fields::number(lift.get("alpha")) {
            Field::Valid(alpha) if alpha >= 0.0 => config.cross_lift.alpha = alpha,
            Field::Missing => {}
            _ => invalid = true,
        }
    }

    if let Some(eli) = section(obj, &["eli", "ELI"], &mut invalid) {
        match fields::string(eli.get("model")) {
            Field::Valid(label) => match parse_eli_model(label) {
                Some(model) => config.eli.model = model,
                None => invalid = true,
            },
            Field::Missing => {}
            Field::Invalid => invalid = true,
        }
    }

    if invalid {
        flags.raise(InputFlag::InvalidConfig);
    }
    config
}

fn section<'a>(
    obj: &'a Map<String, Value>,
    keys: &[&str],
    invalid: &mut bool,
) -> Option<&'a Map<String, Value>> {
    match fields::object(fields::lookup(obj, keys)) {
        Field::Valid(map) => Some(map),
        Field::Missing => None,
        Field::Invalid => {
            *invalid = true;
            None
        }
    }
}

fn parse_eli_model(label: &str) -> Option<EliModel> {
    match label.trim().to_ascii_lowercase().as_str() {
        "ceiling" | "baseline" => Some(EliModel::Ceiling),
        "centered" | "centred" | "neutral" => Some(EliModel::Centered),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CALIBRATION_K;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_request() {
        let json = r#"{
            "answers": [
                {"score": 7, "note": "  good week  "},
                {},
                {"score": 3, "scenarioScore": 6}
            ],
            "timeMap": [
                {"category": "Sleep", "hours": 56, "ri": 5},
                {"category": "Gym", "hours": 4, "ri": 8}
            ],
            "ELI": 3,
            "config": {
                "calibration": {"k": 1.936428228, "max": 9},
                "ri": {"globalMultiplier": 0.5},
                "crossLift": {"enabled": true, "alpha": 20}
            }
        }"#;

        let input = RequestAdapter::parse(json).unwrap();

        assert_eq!(
            input.answers,
            vec![
                Answer::scored(7.0).with_note("good week"),
                Answer::unanswered(),
                Answer::scored(3.0).with_scenario(6.0),
            ]
        );
        assert_eq!(
            input.time_map,
            vec![
                TimeRow::new(TimeCategory::Sleep, 56.0, 5.0),
                TimeRow::new(TimeCategory::Health, 4.0, 8.0),
            ]
        );
        assert_eq!(input.eli, 3.0);
        assert_eq!(input.config.calibration.max, 9.0);
        assert_eq!(input.config.ri.global_multiplier, 0.5);
        assert!(input.config.cross_lift.enabled);
        assert!(input.flags.is_empty());
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        for json in ["[]", "42", "\"hello\"", "null"] {
            let err = RequestAdapter::parse(json).unwrap_err();
            assert!(matches!(err, ScoreError::MalformedRequest(_)), "{json}");
        }
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let err = RequestAdapter::parse("{not json").unwrap_err();
        assert!(matches!(err, ScoreError::JsonError(_)));
    }

    #[test]
    fn test_request_without_shape_is_malformed() {
        let err = RequestAdapter::parse(r#"{"ELI": 4}"#).unwrap_err();
        assert!(matches!(err, ScoreError::MalformedRequest(_)));
    }

    #[test]
    fn test_non_array_fields_become_empty() {
        let input =
            RequestAdapter::parse(r#"{"answers": "lots", "timeMap": {"Sleep": 56}}"#).unwrap();

        assert!(input.answers.is_empty());
        assert!(input.time_map.is_empty());
        assert_eq!(
            input.flags,
            vec![InputFlag::AnswersNotArray, InputFlag::TimeMapNotArray]
        );
    }

    #[test]
    fn test_field_coercions() {
        let json = r#"{
            "answers": [{"score": "seven"}, {"score": 14}, 5, null],
            "timeMap": [
                {"category": "Work", "hours": "forty", "ri": "high"},
                {"category": "Leisure", "hours": -3, "ri": 12},
                {"category": "Hobbies", "hours": 5},
                {"category": "Work", "hours": 10},
                "Sleep"
            ],
            "ELI": "heavy"
        }"#;
        let input = RequestAdapter::parse(json).unwrap();

        assert_eq!(input.answers[0].score, None);
        assert_eq!(input.answers[1].score, Some(10.0));
        assert_eq!(input.answers[2], Answer::unanswered());
        assert_eq!(input.answers[3], Answer::unanswered());

        assert_eq!(
            input.time_map,
            vec![
                TimeRow::new(TimeCategory::Work, 0.0, NEUTRAL_RI),
                TimeRow::new(TimeCategory::Leisure, 0.0, 10.0),
            ]
        );
        assert_eq!(input.eli, DEFAULT_ELI);

        for flag in [
            InputFlag::NonNumericScore,
            InputFlag::ScoreOutOfRange,
            InputFlag::MalformedAnswer,
            InputFlag::NonNumericHours,
            InputFlag::InvalidRi,
            InputFlag::NegativeHours,
            InputFlag::UnknownCategory,
            InputFlag::DuplicateCategory,
            InputFlag::MalformedTimeRow,
            InputFlag::InvalidEli,
        ] {
            assert!(input.flags.contains(&flag), "missing {flag:?}");
        }
    }

    #[test]
    fn test_hours_beyond_one_week_are_capped() {
        let input = RequestAdapter::parse(
            r#"{"timeMap": [{"category": "Work", "hours": 1e308, "ri": 5}, {"category": "Sleep", "hours": 56}]}"#,
        )
        .unwrap();

        assert_eq!(
            input.time_map,
            vec![
                TimeRow::new(TimeCategory::Work, WEEK_HOURS, NEUTRAL_RI),
                TimeRow::new(TimeCategory::Sleep, 56.0, NEUTRAL_RI),
            ]
        );
        assert_eq!(input.flags, vec![InputFlag::HoursOutOfRange]);
    }

    #[test]
    fn test_extra_answers_are_ignored() {
        let answers: Vec<String> = (0..30).map(|_| r#"{"score": 6}"#.to_string()).collect();
        let json = format!(r#"{{"answers": [{}], "timeMap": []}}"#, answers.join(","));
        let input = RequestAdapter::parse(&json).unwrap();

        assert_eq!(input.answers.len(), QUESTION_COUNT);
        assert_eq!(input.flags, vec![InputFlag::ExtraAnswersIgnored]);
    }

    #[test]
    fn test_missing_eli_defaults_to_neutral() {
        let input = RequestAdapter::parse(r#"{"answers": []}"#).unwrap();
        assert_eq!(input.eli, DEFAULT_ELI);
        assert!(input.flags.is_empty());
    }

    #[test]
    fn test_out_of_range_eli_is_clamped() {
        let input = RequestAdapter::parse(r#"{"answers": [], "ELI": 0}"#).unwrap();
        assert_eq!(input.eli, 1.0);
        assert_eq!(input.flags, vec![InputFlag::InvalidEli]);
    }

    #[test]
    fn test_config_overlays_defaults() {
        let mut defaults = ScoringConfig::default();
        defaults.cross_lift.enabled = true;
        defaults.eli.model = EliModel::Centered;

        let input = RequestAdapter::parse_with_defaults(
            r#"{"answers": [], "config": {"crossLift": {"alpha": 10}}}"#,
            &defaults,
        )
        .unwrap();

        assert!(input.config.cross_lift.enabled);
        assert_eq!(input.config.cross_lift.alpha, 10.0);
        assert_eq!(input.config.eli.model, EliModel::Centered);
        assert_eq!(input.config.calibration.k, DEFAULT_CALIBRATION_K);
    }

    #[test]
    fn test_invalid_config_values_keep_defaults() {
        let input = RequestAdapter::parse(
            r#"{"answers": [], "config": {"calibration": {"k": -1, "max": 40}, "crossLift": {"enabled": "yes"}, "eli": {"model": "sideways"}}}"#,
        )
        .unwrap();

        assert_eq!(input.config.calibration.k, DEFAULT_CALIBRATION_K);
        assert_eq!(input.config.calibration.max, MAX_CALIBRATION_CEILING);
        assert!(!input.config.cross_lift.enabled);
        assert_eq!(input.config.eli.model, EliModel::Ceiling);
        assert_eq!(input.flags, vec![InputFlag::InvalidConfig]);
    }

    #[test]
    fn test_parse_batch_and_ndjson() {
        let batch = RequestAdapter::parse_batch(r#"[{"answers": []}, {"timeMap": []}]"#).unwrap();
        assert_eq!(batch.len(), 2);

        let single = RequestAdapter::parse_batch(r#"{"answers": []}"#).unwrap();
        assert_eq!(single.len(), 1);

        let lines = "{\"answers\": []}\n\n{\"timeMap\": []}\n";
        assert_eq!(RequestAdapter::parse_ndjson(lines).unwrap().len(), 2);

        let err = RequestAdapter::parse_ndjson("{\"answers\": []}\nnot json\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
