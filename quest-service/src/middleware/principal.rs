use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use service_core::error::AppError;

use crate::models::Principal;
use crate::startup::AppState;

/// Header carrying the authenticated principal id, set by the upstream
/// identity layer after credential exchange. This service treats it as
/// trusted input and only resolves the registered principal behind it.
pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";

/// Extractor for the principal making the request.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(PRINCIPAL_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized(anyhow::anyhow!(
                    "Missing {} header (required from identity layer)",
                    PRINCIPAL_ID_HEADER
                ))
            })?;

        let principal_id = Uuid::parse_str(raw).map_err(|_| {
            AppError::Unauthorized(anyhow::anyhow!("Malformed {} header", PRINCIPAL_ID_HEADER))
        })?;

        let principal = state.store.find_principal(principal_id).ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!("Unknown principal"))
        })?;

        // Add to tracing span for observability
        tracing::Span::current().record("principal_id", raw);

        Ok(CurrentPrincipal(principal))
    }
}
