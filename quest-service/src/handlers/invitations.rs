//! Invitation token handlers: issuance, audit listing and redemption.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use service_core::error::AppError;

use crate::dtos::invitations::{
    IssueTokenRequest, IssueTokenResponse, RedeemResponse, TokenListEntry,
};
use crate::middleware::CurrentPrincipal;
use crate::startup::AppState;

/// Issue an invitation token for a quest.
///
/// POST /api/quest-access-tokens
#[tracing::instrument(
    skip(state, req),
    fields(quest_id = %req.quest_id, principal_id = %principal.principal_id)
)]
pub async fn issue_token(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(req): Json<IssueTokenRequest>,
) -> Result<(StatusCode, Json<IssueTokenResponse>), AppError> {
    req.validate()?;

    let expires_at = req.expires_at.unwrap_or_else(|| {
        Utc::now() + Duration::days(state.config.invitations.default_expiry_days)
    });

    let token = state.invitations.issue(
        &principal,
        req.quest_id,
        req.role,
        req.group,
        req.max_uses,
        expires_at,
    )?;

    let invite_url = format!(
        "{}/invite/{}",
        state.config.invitations.public_base_url, token.token
    );
    Ok((
        StatusCode::CREATED,
        Json(IssueTokenResponse {
            token: token.token,
            invite_url,
            quest_id: token.quest_id,
            role: token.role,
            group: token.group,
            max_uses: token.max_uses,
            expires_at: token.expires_utc,
        }),
    ))
}

/// All tokens for a quest, active and inert, with redemption counts.
///
/// GET /api/quests/:quest_id/access-tokens
#[tracing::instrument(skip(state), fields(quest_id = %quest_id))]
pub async fn list_quest_tokens(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(quest_id): Path<Uuid>,
) -> Result<Json<Vec<TokenListEntry>>, AppError> {
    let base_url = state.config.invitations.public_base_url.clone();
    let tokens = state
        .invitations
        .list_tokens(&principal, quest_id)?
        .into_iter()
        .map(|view| TokenListEntry::from_view(view, &base_url))
        .collect();
    Ok(Json(tokens))
}

/// Redeem an invitation token for the calling principal.
///
/// POST /api/invitations/:token/redeem
#[tracing::instrument(skip(state), fields(principal_id = %principal.principal_id))]
pub async fn redeem_token(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(token): Path<Uuid>,
) -> Result<Json<RedeemResponse>, AppError> {
    let grant = state.invitations.redeem(&principal, token)?;
    Ok(Json(grant.into()))
}
