//! Quest access token model - time-boxed, usage-limited invitations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GroupKind, Role};

/// Token lifecycle status, derived on read. Exhausted and expired tokens are
/// both inert but kept distinguishable for audit listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Active,
    Exhausted,
    Expired,
}

/// An invitation token granting a role and a permission group in one quest.
/// Becomes permanently inert once exhausted or past expiry; never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestAccessToken {
    /// Opaque token value, embeddable in a shareable `/invite/{token}` path.
    pub token: Uuid,
    pub quest_id: Uuid,
    pub role: Role,
    pub group: GroupKind,
    pub max_uses: u32,
    pub used_by_count: u32,
    pub expires_utc: DateTime<Utc>,
    pub created_by: Uuid,
    pub created_utc: DateTime<Utc>,
}

impl QuestAccessToken {
    pub fn new(
        quest_id: Uuid,
        role: Role,
        group: GroupKind,
        max_uses: u32,
        expires_utc: DateTime<Utc>,
        created_by: Uuid,
    ) -> Self {
        Self {
            token: Uuid::new_v4(),
            quest_id,
            role,
            group,
            max_uses,
            used_by_count: 0,
            expires_utc,
            created_by,
            created_utc: Utc::now(),
        }
    }

    /// Expiry wins over exhaustion: a token past its date reports Expired
    /// even with uses left.
    pub fn status_at(&self, now: DateTime<Utc>) -> TokenStatus {
        if now > self.expires_utc {
            TokenStatus::Expired
        } else if self.used_by_count >= self.max_uses {
            TokenStatus::Exhausted
        } else {
            TokenStatus::Active
        }
    }
}
