// src/models/leaderboard.rs

use serde::{Deserialize, Serialize};

use crate::models::guest::SubmissionCount;

/// A row of the overall leaderboard. Derived on every read, never stored.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub guest_id: i64,
    pub name: String,
    /// Mean error, rounded to two decimals. Ordering uses full precision.
    pub score: f64,
    pub submission_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// A row of a single question's leaderboard.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionLeaderboardEntry {
    pub rank: usize,
    pub guest_id: i64,
    pub name: String,
    pub answer: f64,
    pub answer_display: String,
    /// Absolute distance from the actual answer.
    pub distance: f64,
    pub distance_display: String,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub question: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Leaderboard {
    Overall(Vec<LeaderboardEntry>),
    Question(Vec<QuestionLeaderboardEntry>),
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub question_id: Option<i64>,
    pub leaderboard: Leaderboard,
    pub submission_count: SubmissionCount,
}
