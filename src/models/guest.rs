// src/models/guest.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'guests' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Guest {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,

    /// Set once, at final submission. Never cleared.
    pub has_submitted: bool,

    pub submission_time: Option<chrono::DateTime<chrono::Utc>>,

    /// Relative path of the generated QR code, e.g. `qr_codes/<token>.svg`.
    pub qr_code_path: Option<String>,

    /// Opaque token for retrieving the guest's own answers.
    /// Skipped during serialization; it is only handed to the guest once.
    #[serde(skip)]
    pub unique_token: Option<String>,
}

/// Where a guest is in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestStatus {
    NotStarted,
    InProgress,
    Submitted,
}

/// Admin listing row: the guest plus their derived status.
#[derive(Debug, Serialize)]
pub struct GuestOverview {
    #[serde(flatten)]
    pub guest: Guest,
    pub status: GuestStatus,
}

/// Public listing of guests who already have a QR code.
#[derive(Debug, Serialize, FromRow)]
pub struct SubmittedGuest {
    pub id: i64,
    pub full_name: String,
    pub qr_code_path: Option<String>,
}

#[derive(Debug, Serialize, FromRow, PartialEq, Eq)]
pub struct SubmissionCount {
    pub submitted: i64,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct GuestSearchParams {
    pub q: Option<String>,
}

/// DTO for starting a game session.
///
/// `guest_id` of `-1` (or absent) means a manual entry that is not on the
/// guest list; `guest_name` is then required.
#[derive(Debug, Deserialize, Validate)]
pub struct StartGameRequest {
    pub guest_id: Option<i64>,
    #[validate(length(max = 100, message = "Name must be at most 100 characters."))]
    pub guest_name: Option<String>,
}

/// Identifies who a submission belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionTarget {
    /// A guest loaded from the guest list.
    Listed(i64),
    /// A manual entry; a guest row is created when the submission commits.
    Manual(String),
}
