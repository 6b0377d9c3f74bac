// src/store/leaderboard.rs

//! Reads the inputs for scoring and hands them to [`crate::scoring`].
//! Nothing is cached; every call sees the current actual answers.

use sqlx::{FromRow, SqlitePool};

use crate::{
    error::AppError,
    models::leaderboard::{LeaderboardEntry, QuestionLeaderboardEntry},
    scoring::{self, QuestionCandidate, ScoredGuest},
    store::{questions, responses},
};

#[derive(FromRow)]
struct SubmittedRow {
    id: i64,
    full_name: String,
    submission_time: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(FromRow)]
struct RespondentRow {
    guest_id: i64,
    full_name: String,
    answer: f64,
}

/// A guest's aggregate error, or `None` when none of their responses has a
/// known actual answer.
pub async fn guest_score(pool: &SqlitePool, guest_id: i64) -> Result<Option<f64>, AppError> {
    let pairs = responses::scoring_pairs(pool, guest_id).await?;
    Ok(scoring::aggregate_score(pairs))
}

/// Submitted guests ranked by aggregate error. Candidates are listed in
/// submission order, which is the order ties keep.
pub async fn overall_leaderboard(pool: &SqlitePool) -> Result<Vec<LeaderboardEntry>, AppError> {
    let guests = sqlx::query_as::<_, SubmittedRow>(
        r#"
        SELECT id, full_name, submission_time
        FROM guests
        WHERE has_submitted = 1
        ORDER BY submission_time, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut pairs = responses::submitted_scoring_pairs(pool).await?;

    let candidates = guests
        .into_iter()
        .map(|g| ScoredGuest {
            score: pairs.remove(&g.id).and_then(scoring::aggregate_score),
            guest_id: g.id,
            name: g.full_name,
            submission_time: g.submission_time,
        })
        .collect();

    Ok(scoring::rank_overall(candidates))
}

/// Respondents to one question ranked by distance from its actual answer.
///
/// Empty when the actual answer is unset; `NotFound` for an unknown question.
pub async fn question_leaderboard(
    pool: &SqlitePool,
    question_id: i64,
) -> Result<Vec<QuestionLeaderboardEntry>, AppError> {
    let question = questions::get_question(pool, question_id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    if question.actual_answer.is_none() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, RespondentRow>(
        r#"
        SELECT g.id AS guest_id, g.full_name, r.answer
        FROM responses r
        JOIN guests g ON r.guest_id = g.id
        WHERE r.question_id = ? AND g.has_submitted = 1
        ORDER BY g.submission_time, g.id
        "#,
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;

    let candidates = rows
        .into_iter()
        .map(|r| QuestionCandidate {
            guest_id: r.guest_id,
            name: r.full_name,
            answer: r.answer,
        })
        .collect();

    Ok(scoring::rank_question(
        question.actual_answer,
        question.kind,
        candidates,
    ))
}
