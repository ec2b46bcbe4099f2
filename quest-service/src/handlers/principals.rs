//! Principal registry handlers.
//!
//! The identity layer exchanges external credentials and pushes the resulting
//! principal here; everything downstream treats that record as trusted input.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use validator::Validate;

use service_core::error::AppError;

use crate::dtos::principals::{PrincipalResponse, UpsertPrincipalRequest};
use crate::middleware::CurrentPrincipal;
use crate::models::Principal;
use crate::startup::AppState;

/// Register or refresh a principal.
///
/// PUT /api/principals
#[tracing::instrument(skip(state, req), fields(principal_id = %req.principal_id))]
pub async fn upsert_principal(
    State(state): State<AppState>,
    Json(req): Json<UpsertPrincipalRequest>,
) -> Result<(StatusCode, Json<PrincipalResponse>), AppError> {
    req.validate()?;

    let principal = state.store.upsert_principal(Principal::new(
        req.principal_id,
        req.institution_id,
        req.email,
        req.role,
    ));
    Ok((StatusCode::OK, Json(principal.into())))
}

/// Current principal, including any role elevation picked up through
/// invitation redemptions.
///
/// GET /api/principals/me
pub async fn get_me(
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Json<PrincipalResponse> {
    Json(principal.into())
}
