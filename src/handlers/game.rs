// src/handlers/game.rs

//! The guest's path through the game: start a session, fill in a draft,
//! review it, submit once.

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    drafts::Draft,
    error::AppError,
    models::{
        guest::{StartGameRequest, SubmissionTarget},
        question::{GameQuestion, PublicQuestion, Question},
        response::{DraftAnswerRequest, SubmitResponse, SummaryItem},
    },
    state::AppState,
    store::{guests, questions, submission},
    utils::{
        answer::normalize_answer,
        jwt::{Claims, ROLE_GUEST, sign_jwt},
        qr::answers_url,
    },
};

/// `guest_id` sent by the client for someone who is not on the guest list.
pub const MANUAL_GUEST_ID: i64 = -1;

fn session_expired() -> AppError {
    AppError::AuthError("Session expired".to_string())
}

/// Strips any markup from a typed-in name.
fn clean_name(name: &str) -> String {
    ammonia::Builder::empty().clean(name).to_string().trim().to_string()
}

/// Starts a game session and returns the session token.
///
/// A listed guest who already submitted is turned away with 409.
pub async fn start_game(
    State(state): State<AppState>,
    Json(payload): Json<StartGameRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (target, guest_name) = match payload.guest_id {
        Some(guest_id) if guest_id != MANUAL_GUEST_ID => {
            let guest = guests::get_guest_by_id(&state.pool, guest_id)
                .await?
                .ok_or(AppError::NotFound("Guest not found in database".to_string()))?;

            if guest.has_submitted {
                return Err(AppError::Conflict(
                    "You have already submitted answers. Thank you!".to_string(),
                ));
            }

            (SubmissionTarget::Listed(guest.id), guest.full_name)
        }
        _ => {
            let name = payload
                .guest_name
                .as_deref()
                .map(clean_name)
                .unwrap_or_default();

            if name.is_empty() {
                return Err(AppError::BadRequest("Guest name required".to_string()));
            }

            (SubmissionTarget::Manual(name.clone()), name)
        }
    };

    let session_id = Uuid::new_v4().to_string();
    let token = sign_jwt(
        &session_id,
        ROLE_GUEST,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    let total_questions = questions::list_active_questions(&state.pool).await?.len();
    state
        .drafts
        .open(&session_id, Draft::new(target, guest_name.clone()));

    tracing::info!(guest = %guest_name, "game session started");

    Ok(Json(json!({
        "success": true,
        "token": token,
        "type": "Bearer",
        "guest_name": guest_name,
        "total_questions": total_questions,
    })))
}

/// Active questions in order, each with the session's current draft answer.
pub async fn list_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let draft = state.drafts.get(&claims.sub).ok_or_else(session_expired)?;

    let questions: Vec<GameQuestion> = questions::list_active_questions(&state.pool)
        .await?
        .into_iter()
        .map(|q| GameQuestion {
            current_answer: draft.answers.get(&q.id).cloned(),
            question: PublicQuestion::from(q),
        })
        .collect();

    Ok(Json(questions))
}

/// Records one answer in the draft.
///
/// The answer is normalized here only to give the guest immediate feedback;
/// the draft keeps the raw value and nothing is persisted until submit.
pub async fn save_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<i64>,
    Json(req): Json<DraftAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if state.drafts.get(&claims.sub).is_none() {
        return Err(session_expired());
    }

    let question = questions::get_question(&state.pool, question_id)
        .await?
        .filter(|q| q.is_active)
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    normalize_answer(&req.answer, question.kind)?;

    if !state.drafts.set_answer(&claims.sub, question_id, req.answer) {
        return Err(session_expired());
    }

    Ok(Json(json!({ "success": true })))
}

/// Every active question with whatever the guest has entered so far.
pub async fn summary(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let draft = state.drafts.get(&claims.sub).ok_or_else(session_expired)?;

    let items: Vec<SummaryItem> = questions::list_active_questions(&state.pool)
        .await?
        .into_iter()
        .map(|q| SummaryItem {
            answer: draft.answers.get(&q.id).cloned(),
            id: q.id,
            text: q.text,
            unit: q.unit,
            kind: q.kind,
            order: q.order,
        })
        .collect();

    Ok(Json(json!({
        "guest_name": draft.guest_name,
        "summary": items,
    })))
}

/// Final submission.
///
/// The draft is taken out of the store for the duration, so a second
/// concurrent submit from the same session finds nothing to commit. It is
/// put back if the commit fails for a reason the guest can fix or retry.
pub async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let draft = state.drafts.take(&claims.sub).ok_or_else(session_expired)?;

    match finalize(&state, &draft).await {
        Ok(response) => Ok(Json(response)),
        Err(AppError::Conflict(msg)) => Err(AppError::Conflict(msg)),
        Err(e) => {
            state.drafts.restore(&claims.sub, draft);
            Err(e)
        }
    }
}

async fn finalize(state: &AppState, draft: &Draft) -> Result<SubmitResponse, AppError> {
    let questions: HashMap<i64, Question> = questions::list_active_questions(&state.pool)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

    // Normalize everything before touching the database.
    let mut answers = Vec::with_capacity(draft.answers.len());
    for (question_id, raw) in &draft.answers {
        let question = questions
            .get(question_id)
            .ok_or_else(|| AppError::NotFound(format!("Question {} no longer exists", question_id)))?;
        answers.push((*question_id, normalize_answer(raw, question.kind)?));
    }

    let token = Uuid::new_v4().simple().to_string();
    let qr_code_path = state.artifacts.artifact_path(&token);
    let qr_url = answers_url(&state.config.base_url, &token)?;

    let committed =
        submission::commit_submission(&state.pool, &draft.target, &answers, &token, &qr_code_path)
            .await?;

    if let Err(e) = state.artifacts.generate(&token, &qr_url).await {
        tracing::error!(
            guest_id = committed.guest_id,
            error = %e,
            "failed to render QR code after submission"
        );
    }

    Ok(SubmitResponse {
        success: true,
        guest_id: committed.guest_id,
        guest_name: committed.guest_name,
        token,
        qr_code_path,
        qr_url,
    })
}
