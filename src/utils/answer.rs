// src/utils/answer.rs

//! Conversion between raw guest input and the canonical numeric form stored
//! in `responses.answer`. Times are kept as whole minutes past midnight.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::question::QuestionKind;

/// A value exactly as the client sent it: either a JSON number or a string
/// such as `"42"` or `"18:45"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswer {
    Number(f64),
    Text(String),
}

impl RawAnswer {
    /// Accepts a JSON number or string; anything else is no answer.
    pub fn from_json(value: &serde_json::Value) -> Option<RawAnswer> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(RawAnswer::Number),
            serde_json::Value::String(s) => Some(RawAnswer::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<&str> for RawAnswer {
    fn from(value: &str) -> Self {
        RawAnswer::Text(value.to_string())
    }
}

impl From<f64> for RawAnswer {
    fn from(value: f64) -> Self {
        RawAnswer::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("Please provide an answer")]
    Empty,
    #[error("'{0}' is not a valid time, expected HH:MM")]
    MalformedTime(String),
    #[error("'{0}' is not a valid number")]
    NotANumber(String),
}

/// Converts a guest's raw answer into the stored numeric value.
///
/// * A string containing `:` is read as `HH:MM` for any question type and
///   becomes `hours * 60 + minutes`.
/// * Time questions accept nothing else.
/// * Everything else must parse as a finite float.
///
/// No range checks are applied; min/max on a question are display hints.
pub fn normalize_answer(raw: &RawAnswer, kind: QuestionKind) -> Result<f64, NormalizeError> {
    match raw {
        RawAnswer::Number(value) => match kind {
            QuestionKind::Time => Err(NormalizeError::MalformedTime(value.to_string())),
            QuestionKind::Number if value.is_finite() => Ok(*value),
            QuestionKind::Number => Err(NormalizeError::NotANumber(value.to_string())),
        },
        RawAnswer::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(NormalizeError::Empty);
            }
            if text.contains(':') {
                return parse_time(text);
            }
            match kind {
                QuestionKind::Time => Err(NormalizeError::MalformedTime(text.to_string())),
                QuestionKind::Number => parse_number(text),
            }
        }
    }
}

/// Lenient parse used for the administrator's actual answers: a number,
/// a numeric string or an `HH:MM` string. Anything else yields `None`,
/// which clears the actual answer.
pub fn parse_actual_answer(raw: Option<&RawAnswer>) -> Option<f64> {
    match raw? {
        RawAnswer::Number(value) => value.is_finite().then_some(*value),
        RawAnswer::Text(text) => {
            let text = text.trim();
            if text.contains(':') {
                parse_time(text).ok()
            } else {
                parse_number(text).ok()
            }
        }
    }
}

fn parse_time(text: &str) -> Result<f64, NormalizeError> {
    let malformed = || NormalizeError::MalformedTime(text.to_string());

    let (hours, minutes) = text.split_once(':').ok_or_else(malformed)?;
    if minutes.contains(':') {
        return Err(malformed());
    }

    let hours: i64 = hours.trim().parse().map_err(|_| malformed())?;
    let minutes: i64 = minutes.trim().parse().map_err(|_| malformed())?;

    hours
        .checked_mul(60)
        .and_then(|h| h.checked_add(minutes))
        .map(|total| total as f64)
        .ok_or_else(malformed)
}

fn parse_number(text: &str) -> Result<f64, NormalizeError> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ if text.is_empty() => Err(NormalizeError::Empty),
        _ => Err(NormalizeError::NotANumber(text.to_string())),
    }
}

/// Formats minutes past midnight as zero-padded `HH:MM` (605 -> "10:05").
pub fn format_minutes(minutes: f64) -> String {
    let total = minutes.trunc() as i64;
    format!("{:02}:{:02}", total.div_euclid(60), total.rem_euclid(60))
}

/// Whole numbers print without a decimal part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Display form of a stored answer for the given question type.
pub fn format_answer(value: f64, kind: QuestionKind) -> String {
    match kind {
        QuestionKind::Time => format_minutes(value),
        QuestionKind::Number => format_number(value),
    }
}

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Distance shown on a per-question leaderboard: one decimal, or an
/// integer when the rounded value is whole (3.0 -> "3", 3.44 -> "3.4").
pub fn format_distance(distance: f64) -> String {
    let rounded = round_to(distance, 1);
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.1}", rounded)
    }
}
