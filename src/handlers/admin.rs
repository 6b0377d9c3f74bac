// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        guest::{GuestOverview, GuestStatus},
        leaderboard::{Leaderboard, LeaderboardParams, LeaderboardResponse},
        question::{AdminQuestion, UpdateActualAnswerRequest},
        response::{QuestionResponseView, QuestionResponses},
    },
    state::AppState,
    store::{guests, leaderboard, questions, responses, seed},
    utils::{
        answer::{RawAnswer, format_answer},
        hash::verify_password,
        jwt::{ROLE_ADMIN, sign_jwt},
        qr::{admin_login_url, render_svg},
    },
};

/// DTO for admin login.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Exchanges the admin password for an admin token.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if !verify_password(&payload.password, &state.admin_password_hash)? {
        tracing::warn!("Rejected admin login attempt");
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    let token = sign_jwt(
        &Uuid::new_v4().to_string(),
        ROLE_ADMIN,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
    })))
}

/// SVG QR code of the admin login endpoint, so the admin can sign in from a
/// phone at the venue.
pub async fn login_qr_code(State(config): State<Config>) -> Result<impl IntoResponse, AppError> {
    let svg = render_svg(&admin_login_url(&config.base_url)?)?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

/// Questions with their actual answers, and how many guests have submitted.
pub async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let questions: Vec<AdminQuestion> = questions::list_active_questions(&state.pool)
        .await?
        .into_iter()
        .map(AdminQuestion::from)
        .collect();
    let submission_count = guests::submission_count(&state.pool).await?;

    Ok(Json(json!({
        "questions": questions,
        "submission_count": submission_count,
    })))
}

/// Sets or clears a question's actual answer.
///
/// Unparseable input clears the answer rather than failing.
pub async fn update_actual_answer(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    Json(payload): Json<UpdateActualAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let raw = RawAnswer::from_json(&payload.actual_answer);
    let actual = questions::set_actual_answer(&state.pool, question_id, raw.as_ref()).await?;

    let display = match (actual, questions::get_question(&state.pool, question_id).await?) {
        (Some(value), Some(question)) => Some(format_answer(value, question.kind)),
        _ => None,
    };

    Ok(Json(json!({
        "success": true,
        "question_id": question_id,
        "actual_answer": actual,
        "actual_answer_display": display,
    })))
}

/// Overall leaderboard, or a single question's with `?question=<id>`.
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let board = match params.question {
        Some(question_id) => {
            Leaderboard::Question(leaderboard::question_leaderboard(&state.pool, question_id).await?)
        }
        None => Leaderboard::Overall(leaderboard::overall_leaderboard(&state.pool).await?),
    };
    let submission_count = guests::submission_count(&state.pool).await?;

    Ok(Json(LeaderboardResponse {
        question_id: params.question,
        leaderboard: board,
        submission_count,
    }))
}

/// Every response, grouped by question.
pub async fn all_responses(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut grouped = Vec::new();

    for question in questions::list_active_questions(&state.pool).await? {
        let rows = responses::list_question_responses(&state.pool, question.id).await?;
        grouped.push(QuestionResponses {
            question_id: question.id,
            short_label: question.short_label,
            responses: rows
                .into_iter()
                .map(|r| QuestionResponseView {
                    answer_display: format_answer(r.answer, question.kind),
                    guest_id: r.guest_id,
                    full_name: r.full_name,
                    answer: r.answer,
                })
                .collect(),
        });
    }

    Ok(Json(grouped))
}

pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let submission_count = guests::submission_count(&state.pool).await?;
    let leaderboard = leaderboard::overall_leaderboard(&state.pool).await?;

    Ok(Json(json!({
        "submission_count": submission_count,
        "leaderboard": leaderboard,
    })))
}

/// All guests with their game status.
pub async fn list_guests(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let overview: Vec<GuestOverview> = guests::list_guests(&state.pool)
        .await?
        .into_iter()
        .map(|guest| {
            let status = if guest.has_submitted {
                GuestStatus::Submitted
            } else if state.drafts.is_in_progress(guest.id) {
                GuestStatus::InProgress
            } else {
                GuestStatus::NotStarted
            };
            GuestOverview { guest, status }
        })
        .collect();

    Ok(Json(overview))
}

/// Wipes the event and reloads questions and guests from configuration.
/// Open game sessions are discarded since their question ids are gone.
pub async fn reset_event(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let summary = seed::reset_event(
        &state.pool,
        &state.catalog,
        &state.config.guests_csv_path,
    )
    .await?;
    state.drafts.clear();

    Ok(Json(summary))
}
