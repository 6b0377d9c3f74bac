// src/scoring.rs

//! Scoring and ranking. Everything here is pure: the same responses and
//! actual answers always produce the same leaderboard.

use crate::{
    models::{
        leaderboard::{LeaderboardEntry, QuestionLeaderboardEntry},
        question::QuestionKind,
    },
    utils::answer::{format_answer, format_distance, round_to},
};

/// Error of one guess against the actual answer.
///
/// Percentage error, except when the actual answer is zero where the plain
/// absolute error is used instead.
pub fn question_error(guess: f64, actual: f64) -> f64 {
    let diff = (guess - actual).abs();
    if actual == 0.0 {
        diff
    } else {
        diff / actual.abs() * 100.0
    }
}

/// Mean error over the responses whose question has an actual answer.
///
/// Each item is `(guess, actual_answer)`. Returns `None` when no response is
/// scorable: an unscored guest is not the same as a perfect one.
pub fn aggregate_score<I>(responses: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, Option<f64>)>,
{
    let (total, count) = responses
        .into_iter()
        .filter_map(|(guess, actual)| actual.map(|actual| question_error(guess, actual)))
        .fold((0.0, 0usize), |(total, count), error| (total + error, count + 1));

    (count > 0).then(|| total / count as f64)
}

/// A submitted guest with their (possibly missing) score.
#[derive(Debug, Clone)]
pub struct ScoredGuest {
    pub guest_id: i64,
    pub name: String,
    pub submission_time: Option<chrono::DateTime<chrono::Utc>>,
    pub score: Option<f64>,
}

/// Ranks guests by ascending score.
///
/// Guests without a score are left out. The sort is stable, so equal scores
/// keep the order they were passed in and still get distinct ranks.
pub fn rank_overall(candidates: Vec<ScoredGuest>) -> Vec<LeaderboardEntry> {
    let mut scored: Vec<(f64, ScoredGuest)> = candidates
        .into_iter()
        .filter_map(|guest| guest.score.map(|score| (score, guest)))
        .collect();

    scored.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (score, guest))| LeaderboardEntry {
            rank: i + 1,
            guest_id: guest.guest_id,
            name: guest.name,
            score: round_to(score, 2),
            submission_time: guest.submission_time,
        })
        .collect()
}

/// One submitted guest's answer to the question being ranked.
#[derive(Debug, Clone)]
pub struct QuestionCandidate {
    pub guest_id: i64,
    pub name: String,
    pub answer: f64,
}

/// Ranks respondents of one question by distance to its actual answer.
///
/// An unset actual answer yields an empty leaderboard. Ties are handled as in
/// [`rank_overall`].
pub fn rank_question(
    actual: Option<f64>,
    kind: QuestionKind,
    candidates: Vec<QuestionCandidate>,
) -> Vec<QuestionLeaderboardEntry> {
    let Some(actual) = actual else {
        return Vec::new();
    };

    let mut ranked: Vec<(f64, QuestionCandidate)> = candidates
        .into_iter()
        .map(|c| ((c.answer - actual).abs(), c))
        .collect();

    ranked.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, (distance, c))| QuestionLeaderboardEntry {
            rank: i + 1,
            guest_id: c.guest_id,
            name: c.name,
            answer_display: format_answer(c.answer, kind),
            answer: c.answer,
            distance,
            distance_display: format_distance(distance),
        })
        .collect()
}
