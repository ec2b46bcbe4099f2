use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{GroupKind, Role, TokenStatus};
use crate::services::{RedemptionGrant, TokenView};

#[derive(Debug, Deserialize, Validate)]
pub struct IssueTokenRequest {
    pub quest_id: Uuid,
    pub role: Role,
    pub group: GroupKind,
    #[validate(range(min = 1, message = "Max uses must be at least 1"))]
    pub max_uses: u32,
    /// Defaults to the configured invitation lifetime when omitted.
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct IssueTokenResponse {
    pub token: Uuid,
    pub invite_url: String,
    pub quest_id: Uuid,
    pub role: Role,
    pub group: GroupKind,
    pub max_uses: u32,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TokenListEntry {
    pub token: Uuid,
    pub role: Role,
    pub group: GroupKind,
    pub max_uses: u32,
    pub used_by_count: u32,
    pub expires_at: DateTime<Utc>,
    pub status: TokenStatus,
    pub invite_url: String,
}

impl TokenListEntry {
    pub fn from_view(view: TokenView, base_url: &str) -> Self {
        Self {
            token: view.token.token,
            role: view.token.role,
            group: view.token.group,
            max_uses: view.token.max_uses,
            used_by_count: view.token.used_by_count,
            expires_at: view.token.expires_utc,
            status: view.status,
            invite_url: format!("{}/invite/{}", base_url, view.token.token),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub quest_id: Uuid,
    pub quest_name: String,
    pub role: Role,
    pub group: GroupKind,
}

impl From<RedemptionGrant> for RedeemResponse {
    fn from(grant: RedemptionGrant) -> Self {
        Self {
            quest_id: grant.quest.quest_id,
            quest_name: grant.quest.name,
            role: grant.role,
            group: grant.group,
        }
    }
}
