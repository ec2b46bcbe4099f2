//! Quest handlers: creation, listings, detail and quest/case membership.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use service_core::error::AppError;

use crate::dtos::cases::CaseResponse;
use crate::dtos::quests::{
    AddCaseRequest, CreateQuestRequest, QuestDetailResponse, QuestResponse, ReorderRequest,
};
use crate::middleware::CurrentPrincipal;
use crate::startup::AppState;

/// Create a quest (professor-only).
///
/// POST /api/quests
#[tracing::instrument(skip(state, req), fields(principal_id = %principal.principal_id))]
pub async fn create_quest(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(req): Json<CreateQuestRequest>,
) -> Result<(StatusCode, Json<QuestResponse>), AppError> {
    req.validate()?;
    let quest = state
        .quests
        .create_quest(&principal, req.name, req.visible_to_institution)?;
    Ok((StatusCode::CREATED, Json(quest.into())))
}

/// Quests the caller can at least view.
///
/// GET /api/quests
pub async fn list_quests(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Json<Vec<QuestResponse>> {
    let quests = state
        .quests
        .list_visible(&principal)
        .into_iter()
        .map(QuestResponse::from)
        .collect();
    Json(quests)
}

/// Quests the caller can add cases to.
///
/// GET /api/quests/authorable
pub async fn list_authorable_quests(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Json<Vec<QuestResponse>> {
    let quests = state
        .quests
        .list_authorable(&principal)
        .into_iter()
        .map(QuestResponse::from)
        .collect();
    Json(quests)
}

/// Quest detail with the caller's capabilities.
///
/// GET /api/quests/:quest_id
#[tracing::instrument(skip(state), fields(quest_id = %quest_id))]
pub async fn get_quest(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(quest_id): Path<Uuid>,
) -> Result<Json<QuestDetailResponse>, AppError> {
    let quest = state.quests.get_quest(&principal, quest_id)?;
    let caps = state.quests.capabilities(&principal, &quest);
    Ok(Json(QuestDetailResponse::new(quest, caps)))
}

/// The quest's cases, in order.
///
/// GET /api/quests/:quest_id/cases
#[tracing::instrument(skip(state), fields(quest_id = %quest_id))]
pub async fn list_quest_cases(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(quest_id): Path<Uuid>,
) -> Result<Json<Vec<CaseResponse>>, AppError> {
    let cases = state
        .quests
        .quest_cases(&principal, quest_id)?
        .into_iter()
        .map(CaseResponse::from)
        .collect();
    Ok(Json(cases))
}

/// Append a case to the quest.
///
/// POST /api/quests/:quest_id/cases
#[tracing::instrument(skip(state), fields(quest_id = %quest_id, case_id = %req.case_id))]
pub async fn add_case_to_quest(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(quest_id): Path<Uuid>,
    Json(req): Json<AddCaseRequest>,
) -> Result<StatusCode, AppError> {
    state.quests.add_case(&principal, quest_id, req.case_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a case from the quest.
///
/// DELETE /api/quests/:quest_id/cases/:case_id
#[tracing::instrument(skip(state), fields(quest_id = %quest_id, case_id = %case_id))]
pub async fn remove_case_from_quest(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path((quest_id, case_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.quests.remove_case(&principal, quest_id, case_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the quest's case ordering.
///
/// POST /api/quests/:quest_id/reorder
#[tracing::instrument(skip(state, req), fields(quest_id = %quest_id))]
pub async fn reorder_quest(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(quest_id): Path<Uuid>,
    Json(req): Json<ReorderRequest>,
) -> Result<StatusCode, AppError> {
    req.validate()?;
    state.quests.reorder(&principal, quest_id, req.case_ids)?;
    Ok(StatusCode::NO_CONTENT)
}
