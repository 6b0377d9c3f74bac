// src/store/responses.rs

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

use crate::{
    error::AppError,
    models::response::{GuestAnswerRow, QuestionResponseRow},
    store::{guests, questions},
    utils::answer::{RawAnswer, normalize_answer},
};

/// Normalizes a raw answer and stores it, replacing any earlier answer from
/// the same guest to the same question.
///
/// Nothing is written when the guest or question is unknown or the answer
/// does not normalize. Returns the stored value.
pub async fn save_response(
    conn: &mut SqliteConnection,
    guest_id: i64,
    question_id: i64,
    raw: &RawAnswer,
) -> Result<f64, AppError> {
    let question = questions::get_question(&mut *conn, question_id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    if guests::get_guest_by_id(&mut *conn, guest_id).await?.is_none() {
        return Err(AppError::NotFound("Guest not found".to_string()));
    }

    let answer = normalize_answer(raw, question.kind)?;
    upsert_response(&mut *conn, guest_id, question_id, answer).await?;

    Ok(answer)
}

/// Writes an already normalized answer.
pub async fn upsert_response(
    executor: impl SqliteExecutor<'_>,
    guest_id: i64,
    question_id: i64,
    answer: f64,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO responses (guest_id, question_id, answer)
        VALUES (?, ?, ?)
        ON CONFLICT(guest_id, question_id) DO UPDATE SET
            answer = excluded.answer,
            created_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(guest_id)
    .bind(question_id)
    .bind(answer)
    .execute(executor)
    .await?;

    Ok(())
}

/// A guest's responses joined with their questions, in question order.
pub async fn list_guest_answers(
    pool: &SqlitePool,
    guest_id: i64,
) -> Result<Vec<GuestAnswerRow>, AppError> {
    let rows = sqlx::query_as::<_, GuestAnswerRow>(
        r#"
        SELECT
            r.question_id,
            q.question_text,
            q.short_label,
            q.unit,
            q.question_type,
            q.order_index,
            r.answer
        FROM responses r
        JOIN questions q ON r.question_id = q.id
        WHERE r.guest_id = ?
        ORDER BY q.order_index
        "#,
    )
    .bind(guest_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Every response to one question, lowest answer first.
pub async fn list_question_responses(
    pool: &SqlitePool,
    question_id: i64,
) -> Result<Vec<QuestionResponseRow>, AppError> {
    let rows = sqlx::query_as::<_, QuestionResponseRow>(
        r#"
        SELECT r.guest_id, g.full_name, r.answer
        FROM responses r
        JOIN guests g ON r.guest_id = g.id
        WHERE r.question_id = ?
        ORDER BY r.answer
        "#,
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// `(guess, actual_answer)` pairs for every response of a guest.
pub async fn scoring_pairs(
    pool: &SqlitePool,
    guest_id: i64,
) -> Result<Vec<(f64, Option<f64>)>, AppError> {
    let pairs = sqlx::query_as::<_, (f64, Option<f64>)>(
        r#"
        SELECT r.answer, q.actual_answer
        FROM responses r
        JOIN questions q ON r.question_id = q.id
        WHERE r.guest_id = ?
        "#,
    )
    .bind(guest_id)
    .fetch_all(pool)
    .await?;

    Ok(pairs)
}

/// Scorable pairs of all submitted guests, grouped by guest id.
pub async fn submitted_scoring_pairs(
    pool: &SqlitePool,
) -> Result<HashMap<i64, Vec<(f64, Option<f64>)>>, AppError> {
    let rows = sqlx::query_as::<_, (i64, f64, Option<f64>)>(
        r#"
        SELECT r.guest_id, r.answer, q.actual_answer
        FROM responses r
        JOIN questions q ON r.question_id = q.id
        JOIN guests g ON r.guest_id = g.id
        WHERE g.has_submitted = 1 AND q.actual_answer IS NOT NULL
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<i64, Vec<(f64, Option<f64>)>> = HashMap::new();
    for (guest_id, answer, actual) in rows {
        grouped.entry(guest_id).or_default().push((answer, actual));
    }

    Ok(grouped)
}
