// src/store/seed.rs

//! Start-up setup and the explicit "reset before the event" action.

use std::{io::ErrorKind, path::Path};

use serde::{Deserialize, Serialize};
use sqlx::{SqlitePool, migrate::Migrator};
use tracing::{info, warn};

use crate::{
    config::QuestionSpec,
    error::AppError,
    store::{guests, questions},
};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Deserialize)]
struct GuestCsvRow {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ResetSummary {
    pub questions: usize,
    pub guests: usize,
}

/// Runs once at start-up: applies migrations and loads the question catalog
/// into an empty database. Existing data is left alone.
pub async fn setup(pool: &SqlitePool, catalog: &[QuestionSpec]) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;

    let mut tx = pool.begin().await?;
    if questions::count_questions(&mut *tx).await? == 0 {
        let loaded = questions::insert_catalog(&mut *tx, catalog).await?;
        info!(count = loaded, "seeded question catalog into empty database");
    }
    tx.commit().await?;

    Ok(())
}

/// Replaces all questions, guests and responses with a fresh event.
///
/// Questions come from the catalog, guests from the CSV file. A missing CSV
/// file leaves the guest list empty. Runs in one transaction.
pub async fn reset_event(
    pool: &SqlitePool,
    catalog: &[QuestionSpec],
    csv_path: &Path,
) -> Result<ResetSummary, AppError> {
    let guest_rows = load_guest_csv(csv_path).await?;

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM responses").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM guests").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM questions").execute(&mut *tx).await?;

    let question_count = questions::insert_catalog(&mut *tx, catalog).await?;
    for (first_name, last_name) in &guest_rows {
        guests::insert_guest(&mut *tx, first_name, last_name).await?;
    }

    tx.commit().await?;

    let summary = ResetSummary {
        questions: question_count,
        guests: guest_rows.len(),
    };
    info!(
        questions = summary.questions,
        guests = summary.guests,
        "event data reset"
    );
    Ok(summary)
}

async fn load_guest_csv(path: &Path) -> Result<Vec<(String, String)>, AppError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => parse_guest_csv(&contents),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(
                path = %path.display(),
                "guest list not found; expected a CSV with first_name and last_name columns"
            );
            Ok(Vec::new())
        }
        Err(err) => Err(err.into()),
    }
}

/// Reads `first_name,last_name` rows, skipping rows missing either part.
pub fn parse_guest_csv(contents: &str) -> Result<Vec<(String, String)>, AppError> {
    let mut reader = csv::Reader::from_reader(contents.as_bytes());
    let mut rows = Vec::new();

    for record in reader.deserialize::<GuestCsvRow>() {
        let record = record.map_err(|e| AppError::BadRequest(format!("Invalid guest CSV: {}", e)))?;
        let first_name = record.first_name.trim();
        let last_name = record.last_name.trim();
        if !first_name.is_empty() && !last_name.is_empty() {
            rows.push((first_name.to_string(), last_name.to_string()));
        }
    }

    Ok(rows)
}
