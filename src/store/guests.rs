// src/store/guests.rs

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};

use crate::{
    config::GUEST_SEARCH_LIMIT,
    error::AppError,
    models::guest::{Guest, SubmissionCount, SubmittedGuest},
};

const GUEST_COLUMNS: &str = "id, first_name, last_name, full_name, has_submitted, \
     submission_time, qr_code_path, unique_token";

pub async fn get_guest_by_id(
    executor: impl SqliteExecutor<'_>,
    guest_id: i64,
) -> Result<Option<Guest>, AppError> {
    let guest = sqlx::query_as::<_, Guest>(&format!(
        "SELECT {GUEST_COLUMNS} FROM guests WHERE id = ?"
    ))
    .bind(guest_id)
    .fetch_optional(executor)
    .await?;

    Ok(guest)
}

/// Looks up a guest by the token embedded in their QR code.
pub async fn get_guest_by_token(pool: &SqlitePool, token: &str) -> Result<Option<Guest>, AppError> {
    let guest = sqlx::query_as::<_, Guest>(&format!(
        "SELECT {GUEST_COLUMNS} FROM guests WHERE unique_token = ?"
    ))
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(guest)
}

/// Case-insensitive substring search on first, last or full name.
pub async fn search_guests(pool: &SqlitePool, query: &str) -> Result<Vec<Guest>, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let pattern = format!("%{}%", query);
    let guests = sqlx::query_as::<_, Guest>(&format!(
        r#"
        SELECT {GUEST_COLUMNS} FROM guests
        WHERE first_name LIKE ?1 OR last_name LIKE ?1 OR full_name LIKE ?1
        ORDER BY full_name
        LIMIT ?2
        "#
    ))
    .bind(pattern)
    .bind(GUEST_SEARCH_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(guests)
}

pub async fn list_guests(pool: &SqlitePool) -> Result<Vec<Guest>, AppError> {
    let guests = sqlx::query_as::<_, Guest>(&format!(
        "SELECT {GUEST_COLUMNS} FROM guests ORDER BY full_name"
    ))
    .fetch_all(pool)
    .await?;

    Ok(guests)
}

pub async fn list_submitted_guests(pool: &SqlitePool) -> Result<Vec<SubmittedGuest>, AppError> {
    let guests = sqlx::query_as::<_, SubmittedGuest>(
        r#"
        SELECT id, full_name, qr_code_path
        FROM guests
        WHERE has_submitted = 1
        ORDER BY first_name, last_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(guests)
}

/// Unknown guests count as not submitted.
pub async fn has_submitted(
    executor: impl SqliteExecutor<'_>,
    guest_id: i64,
) -> Result<bool, AppError> {
    let flag: Option<bool> = sqlx::query_scalar("SELECT has_submitted FROM guests WHERE id = ?")
        .bind(guest_id)
        .fetch_optional(executor)
        .await?;

    Ok(flag.unwrap_or(false))
}

/// One-way transition to submitted.
///
/// The update only matches a guest that has not submitted yet, so running it
/// inside the submission transaction doubles as the duplicate check. Returns
/// `false` when nothing was updated (already submitted or unknown guest).
pub async fn mark_submitted(
    executor: impl SqliteExecutor<'_>,
    guest_id: i64,
    qr_code_path: &str,
    token: &str,
    submitted_at: DateTime<Utc>,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE guests
        SET has_submitted = 1, submission_time = ?, qr_code_path = ?, unique_token = ?
        WHERE id = ? AND has_submitted = 0
        "#,
    )
    .bind(submitted_at)
    .bind(qr_code_path)
    .bind(token)
    .bind(guest_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Inserts a guest row; used for CSV import and manual entries.
pub async fn insert_guest(
    executor: impl SqliteExecutor<'_>,
    first_name: &str,
    last_name: &str,
) -> Result<i64, AppError> {
    let full_name = format!("{} {}", first_name, last_name).trim().to_string();

    let id = sqlx::query("INSERT INTO guests (first_name, last_name, full_name) VALUES (?, ?, ?)")
        .bind(first_name)
        .bind(last_name)
        .bind(&full_name)
        .execute(executor)
        .await?
        .last_insert_rowid();

    Ok(id)
}

/// Splits a free-form name into first name and the rest.
pub fn split_name(full_name: &str) -> (String, String) {
    let full_name = full_name.trim();
    match full_name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (full_name.to_string(), String::new()),
    }
}

pub async fn submission_count(pool: &SqlitePool) -> Result<SubmissionCount, AppError> {
    let count = sqlx::query_as::<_, SubmissionCount>(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN has_submitted = 1 THEN 1 ELSE 0 END), 0) AS submitted,
            COUNT(*) AS total
        FROM guests
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("Ada Lovelace"), ("Ada".into(), "Lovelace".into()));
        assert_eq!(split_name("  Mary Ann  Evans "), ("Mary".into(), "Ann  Evans".into()));
        assert_eq!(split_name("Cher"), ("Cher".into(), String::new()));
    }
}
