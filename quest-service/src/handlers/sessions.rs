//! Quiz session handlers.
//!
//! Sessions are ephemeral and owned by the principal that started them;
//! another principal's session id behaves as if it did not exist.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use service_core::error::AppError;

use crate::dtos::sessions::{SessionResponse, SubmitAnswerRequest, SubmitAnswerResponse};
use crate::middleware::CurrentPrincipal;
use crate::models::Principal;
use crate::services::{CaseSnapshot, QuizSession, SessionStatus};
use crate::startup::AppState;

/// Start a session over the quest's current ordered case list.
///
/// POST /api/quests/:quest_id/sessions
#[tracing::instrument(skip(state), fields(quest_id = %quest_id, principal_id = %principal.principal_id))]
pub async fn start_session(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(quest_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let cases: Vec<CaseSnapshot> = state
        .quests
        .quest_cases(&principal, quest_id)?
        .into_iter()
        .map(CaseSnapshot::from)
        .collect();

    let session = QuizSession::start(principal.principal_id, quest_id, cases)?;
    let response = SessionResponse::from(&session);
    state.sessions.insert(session.session_id, session);
    Ok((StatusCode::CREATED, Json(response)))
}

fn owned_session_check(session: &QuizSession, principal: &Principal) -> Result<(), AppError> {
    if session.principal_id != principal.principal_id {
        // Not revealing that the id exists at all.
        return Err(AppError::NotFound(anyhow::anyhow!("Session not found")));
    }
    Ok(())
}

/// Current session view.
///
/// GET /api/sessions/:session_id
#[tracing::instrument(skip(state), fields(session_id = %session_id))]
pub async fn get_session(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Session not found")))?;
    owned_session_check(&session, &principal)?;
    Ok(Json(SessionResponse::from(&*session)))
}

/// Submit an answer for the current case.
///
/// POST /api/sessions/:session_id/submit
#[tracing::instrument(skip(state, req), fields(session_id = %session_id))]
pub async fn submit_answer(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    req.validate()?;
    let mut session = state
        .sessions
        .get_mut(&session_id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Session not found")))?;
    owned_session_check(&session, &principal)?;

    let outcome = session.submit(&req.answer)?;
    Ok(Json(SubmitAnswerResponse::new(outcome, session.score())))
}

/// Move to the next case, completing the session from the last one.
///
/// POST /api/sessions/:session_id/advance
#[tracing::instrument(skip(state), fields(session_id = %session_id))]
pub async fn advance_session(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut session = state
        .sessions
        .get_mut(&session_id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Session not found")))?;
    owned_session_check(&session, &principal)?;

    session.advance()?;
    if session.status() == SessionStatus::Completed {
        metrics::counter!("quiz_sessions_completed_total").increment(1);
    }
    Ok(Json(SessionResponse::from(&*session)))
}

/// Step back one case.
///
/// POST /api/sessions/:session_id/previous
#[tracing::instrument(skip(state), fields(session_id = %session_id))]
pub async fn previous_session(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut session = state
        .sessions
        .get_mut(&session_id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Session not found")))?;
    owned_session_check(&session, &principal)?;

    session.previous()?;
    Ok(Json(SessionResponse::from(&*session)))
}

/// Complete the session immediately.
///
/// POST /api/sessions/:session_id/finish
#[tracing::instrument(skip(state), fields(session_id = %session_id))]
pub async fn finish_session(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut session = state
        .sessions
        .get_mut(&session_id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Session not found")))?;
    owned_session_check(&session, &principal)?;

    session.finish_early()?;
    metrics::counter!("quiz_sessions_completed_total").increment(1);
    Ok(Json(SessionResponse::from(&*session)))
}

/// Abandon a session.
///
/// DELETE /api/sessions/:session_id
#[tracing::instrument(skip(state), fields(session_id = %session_id))]
pub async fn abandon_session(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    {
        let session = state
            .sessions
            .get(&session_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Session not found")))?;
        owned_session_check(&session, &principal)?;
    }
    state.sessions.remove(&session_id);
    Ok(StatusCode::NO_CONTENT)
}
