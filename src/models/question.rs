// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// How a question's answer is entered and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum QuestionKind {
    /// A plain decimal number.
    #[serde(alias = "numeric")]
    Number,
    /// A time of day entered as `HH:MM`, stored as minutes past midnight.
    Time,
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: i64,

    /// Full question text shown to guests.
    #[sqlx(rename = "question_text")]
    pub text: String,

    /// Mapped from the database column 'question_type'.
    #[sqlx(rename = "question_type")]
    #[serde(rename = "type")]
    pub kind: QuestionKind,

    /// Presentation order, also the order candidates are listed in.
    #[sqlx(rename = "order_index")]
    pub order: i64,

    pub unit: String,

    /// Compact label for small screens.
    pub short_label: String,

    /// Lower bound hint for the input widget. Not enforced.
    #[serde(rename = "min")]
    pub min_hint: Option<String>,

    /// Upper bound hint for the input widget. Not enforced.
    #[serde(rename = "max")]
    pub max_hint: Option<String>,

    /// The real outcome, entered by the administrator after the fact.
    /// `None` excludes the question from scoring.
    pub actual_answer: Option<f64>,

    pub is_active: bool,
}

/// DTO for sending a question to guests (excludes the actual answer).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub order: i64,
    pub unit: String,
    pub short_label: String,
    pub min: Option<String>,
    pub max: Option<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        PublicQuestion {
            id: q.id,
            text: q.text,
            kind: q.kind,
            order: q.order,
            unit: q.unit,
            short_label: q.short_label,
            min: q.min_hint,
            max: q.max_hint,
        }
    }
}

/// A question as seen during play, with the guest's current draft answer.
#[derive(Debug, Serialize)]
pub struct GameQuestion {
    #[serde(flatten)]
    pub question: PublicQuestion,
    pub current_answer: Option<crate::utils::answer::RawAnswer>,
}

/// Admin view of a question including the formatted actual answer.
#[derive(Debug, Serialize)]
pub struct AdminQuestion {
    #[serde(flatten)]
    pub question: Question,
    pub actual_answer_display: Option<String>,
}

impl From<Question> for AdminQuestion {
    fn from(question: Question) -> Self {
        let actual_answer_display = question
            .actual_answer
            .map(|value| crate::utils::answer::format_answer(value, question.kind));
        AdminQuestion {
            question,
            actual_answer_display,
        }
    }
}

/// DTO for the administrator setting (or clearing) an actual answer.
///
/// Any JSON value is accepted; values that do not parse clear the answer.
#[derive(Debug, Deserialize)]
pub struct UpdateActualAnswerRequest {
    #[serde(default)]
    pub actual_answer: serde_json::Value,
}
