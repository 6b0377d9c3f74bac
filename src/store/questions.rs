// src/store/questions.rs

use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

use crate::{
    config::QuestionSpec,
    error::AppError,
    models::question::Question,
    utils::answer::{RawAnswer, parse_actual_answer},
};

const QUESTION_COLUMNS: &str = "id, question_text, question_type, order_index, unit, \
     short_label, min_hint, max_hint, actual_answer, is_active";

/// All active questions in presentation order.
pub async fn list_active_questions(pool: &SqlitePool) -> Result<Vec<Question>, AppError> {
    let questions = sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE is_active = 1 ORDER BY order_index"
    ))
    .fetch_all(pool)
    .await?;

    Ok(questions)
}

pub async fn get_question(
    executor: impl SqliteExecutor<'_>,
    question_id: i64,
) -> Result<Option<Question>, AppError> {
    let question = sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?"
    ))
    .bind(question_id)
    .fetch_optional(executor)
    .await?;

    Ok(question)
}

/// Sets the real outcome of a question, or clears it.
///
/// Input that does not parse is not an error: the answer becomes unset and
/// the question drops out of scoring. Returns the stored value, or
/// `NotFound` for an unknown question.
pub async fn set_actual_answer(
    pool: &SqlitePool,
    question_id: i64,
    raw: Option<&RawAnswer>,
) -> Result<Option<f64>, AppError> {
    let actual = parse_actual_answer(raw);

    let result = sqlx::query("UPDATE questions SET actual_answer = ? WHERE id = ?")
        .bind(actual)
        .bind(question_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    tracing::info!(question_id, actual_answer = ?actual, "actual answer updated");
    Ok(actual)
}

pub async fn count_questions(executor: impl SqliteExecutor<'_>) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(executor)
        .await?;
    Ok(count)
}

/// Inserts every catalog entry. Callers clear the table first when reloading.
pub async fn insert_catalog(
    conn: &mut SqliteConnection,
    catalog: &[QuestionSpec],
) -> Result<usize, AppError> {
    for entry in catalog {
        sqlx::query(
            r#"
            INSERT INTO questions
                (question_text, question_type, order_index, unit, short_label, min_hint, max_hint)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.text)
        .bind(entry.kind)
        .bind(entry.order)
        .bind(&entry.unit)
        .bind(&entry.short_label)
        .bind(entry.min_hint())
        .bind(entry.max_hint())
        .execute(&mut *conn)
        .await?;
    }

    Ok(catalog.len())
}
