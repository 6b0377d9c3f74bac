// src/handlers/guest.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        guest::GuestSearchParams,
        response::{AnswerView, GuestResults},
    },
    store::{guests, responses},
};

/// Searches the guest list by name. Returns at most 20 guests.
pub async fn search_guests(
    State(pool): State<SqlitePool>,
    Query(params): Query<GuestSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.q.unwrap_or_default();
    let guests = guests::search_guests(&pool, &query).await?;

    Ok(Json(guests))
}

/// Lists guests who have submitted, with the path of their QR code.
pub async fn submitted_guests(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let guests = guests::list_submitted_guests(&pool).await?;

    Ok(Json(guests))
}

/// A guest's own answers, reached through the link in their QR code.
pub async fn guest_answers(
    State(pool): State<SqlitePool>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let guest = guests::get_guest_by_token(&pool, &token)
        .await?
        .ok_or(AppError::NotFound("Guest not found".to_string()))?;

    let answers = responses::list_guest_answers(&pool, guest.id)
        .await?
        .into_iter()
        .map(AnswerView::from)
        .collect();

    Ok(Json(GuestResults {
        guest_name: guest.full_name,
        submission_time: guest.submission_time,
        answers,
    }))
}
