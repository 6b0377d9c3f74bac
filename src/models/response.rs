// src/models/response.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{models::question::QuestionKind, utils::answer::RawAnswer};

/// A guest's response joined with its question.
#[derive(Debug, Clone, FromRow)]
pub struct GuestAnswerRow {
    pub question_id: i64,
    pub question_text: String,
    pub short_label: String,
    pub unit: String,
    pub question_type: QuestionKind,
    pub order_index: i64,
    pub answer: f64,
}

/// One line of a guest's results page.
#[derive(Debug, Serialize)]
pub struct AnswerView {
    pub question_id: i64,
    pub question: String,
    pub short_label: String,
    pub answer: String,
    pub unit: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub order: i64,
}

impl From<GuestAnswerRow> for AnswerView {
    fn from(row: GuestAnswerRow) -> Self {
        let short_label = if row.short_label.is_empty() {
            row.question_text.clone()
        } else {
            row.short_label
        };
        AnswerView {
            question_id: row.question_id,
            answer: crate::utils::answer::format_answer(row.answer, row.question_type),
            question: row.question_text,
            short_label,
            unit: row.unit,
            kind: row.question_type,
            order: row.order_index,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GuestResults {
    pub guest_name: String,
    pub submission_time: Option<chrono::DateTime<chrono::Utc>>,
    pub answers: Vec<AnswerView>,
}

/// A response to one question with the respondent's name (admin view).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestionResponseRow {
    pub guest_id: i64,
    pub full_name: String,
    pub answer: f64,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponses {
    pub question_id: i64,
    pub short_label: String,
    pub responses: Vec<QuestionResponseView>,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponseView {
    pub guest_id: i64,
    pub full_name: String,
    pub answer: f64,
    pub answer_display: String,
}

/// DTO for saving a draft answer.
#[derive(Debug, Deserialize)]
pub struct DraftAnswerRequest {
    pub answer: RawAnswer,
}

/// Summary line: the question and whatever the guest has entered so far.
#[derive(Debug, Serialize)]
pub struct SummaryItem {
    pub id: i64,
    pub text: String,
    pub unit: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub order: i64,
    pub answer: Option<RawAnswer>,
}

/// Returned once the submission is committed.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub guest_id: i64,
    pub guest_name: String,
    pub token: String,
    pub qr_code_path: String,
    pub qr_url: String,
}
