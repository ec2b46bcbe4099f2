//! Case handlers: creation, owner listings and owner-only mutations.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use service_core::error::AppError;

use crate::dtos::cases::{
    CaseResponse, CaseWithStateResponse, CreateCaseRequest, UpdateCaseRequest,
};
use crate::middleware::CurrentPrincipal;
use crate::services::{CaseUpdate, NewCase};
use crate::startup::AppState;

/// Create a case. Saved as a draft unless a quest id is supplied, in which
/// case it is published into that quest in the same request. A failed
/// publish removes the draft again, so the request creates either a
/// published case or nothing.
///
/// POST /api/cases
#[tracing::instrument(skip(state, req), fields(principal_id = %principal.principal_id))]
pub async fn create_case(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(req): Json<CreateCaseRequest>,
) -> Result<(StatusCode, Json<CaseResponse>), AppError> {
    req.validate()?;

    let case = state.cases.create_case(
        &principal,
        NewCase {
            title: req.title,
            description: req.description,
            prompt: req.prompt,
            answer: req.answer,
            alternative_answers: req.alternative_answers,
            complexity: req.complexity,
            specialty: req.specialty,
            image_ref: req.image_ref,
        },
    )?;

    if let Some(quest_id) = req.quest_id {
        if let Err(err) = state.quests.add_case(&principal, quest_id, case.case_id) {
            state.cases.delete_case(&principal, case.case_id)?;
            return Err(err);
        }
    }

    Ok((StatusCode::CREATED, Json(case.into())))
}

/// The caller's cases with derived publication state, drafts included.
///
/// GET /api/cases/mine
pub async fn my_cases(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Json<Vec<CaseWithStateResponse>> {
    let cases = state
        .cases
        .my_cases(&principal)
        .into_iter()
        .map(CaseWithStateResponse::from)
        .collect();
    Json(cases)
}

/// Owner-only partial update.
///
/// PATCH /api/cases/:case_id
#[tracing::instrument(skip(state, req), fields(case_id = %case_id))]
pub async fn update_case(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(case_id): Path<Uuid>,
    Json(req): Json<UpdateCaseRequest>,
) -> Result<Json<CaseResponse>, AppError> {
    let case = state.cases.update_case(
        &principal,
        case_id,
        CaseUpdate {
            title: req.title,
            description: req.description,
            prompt: req.prompt,
            answer: req.answer,
            alternative_answers: req.alternative_answers,
            complexity: req.complexity,
            specialty: req.specialty,
            image_ref: req.image_ref,
        },
    )?;
    Ok(Json(case.into()))
}

/// Owner-only deletion; all quest memberships go with it.
///
/// DELETE /api/cases/:case_id
#[tracing::instrument(skip(state), fields(case_id = %case_id))]
pub async fn delete_case(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(case_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.cases.delete_case(&principal, case_id)?;
    Ok(StatusCode::NO_CONTENT)
}
