// src/store/submission.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::guest::SubmissionTarget,
    store::{guests, responses},
};

/// Result of a committed submission.
#[derive(Debug, Clone)]
pub struct CommittedSubmission {
    pub guest_id: i64,
    pub guest_name: String,
}

/// Commits a guest's final answers in one transaction.
///
/// The guest is marked submitted first with a conditional update, so of two
/// concurrent submissions for the same guest exactly one commits and the
/// other gets `Conflict`. Answers must already be normalized; on any error
/// the transaction rolls back and nothing is persisted.
pub async fn commit_submission(
    pool: &SqlitePool,
    target: &SubmissionTarget,
    answers: &[(i64, f64)],
    token: &str,
    qr_code_path: &str,
) -> Result<CommittedSubmission, AppError> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();

    let guest_id = match target {
        SubmissionTarget::Listed(id) => *id,
        SubmissionTarget::Manual(name) => {
            let (first_name, last_name) = guests::split_name(name);
            guests::insert_guest(&mut *tx, &first_name, &last_name).await?
        }
    };

    let marked = guests::mark_submitted(&mut *tx, guest_id, qr_code_path, token, now).await?;
    let guest = guests::get_guest_by_id(&mut *tx, guest_id)
        .await?
        .ok_or(AppError::NotFound("Guest not found".to_string()))?;

    if !marked {
        return Err(AppError::Conflict("Already submitted".to_string()));
    }

    for (question_id, answer) in answers {
        responses::upsert_response(&mut *tx, guest_id, *question_id, *answer).await?;
    }

    tx.commit().await?;

    tracing::info!(
        guest_id,
        guest = %guest.full_name,
        answers = answers.len(),
        "submission committed"
    );

    Ok(CommittedSubmission {
        guest_id,
        guest_name: guest.full_name,
    })
}
