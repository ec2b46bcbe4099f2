//! Per-quest permission groups.
//!
//! Group membership is a structured relation (principal, quest, kind) rather
//! than encoded string tags, so the resolver never parses anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission tier within a quest, ordered least to most privileged.
/// Redemption never downgrades an existing higher tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    View,
    Author,
    Editor,
}

impl GroupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::View => "view",
            GroupKind::Author => "author",
            GroupKind::Editor => "editor",
        }
    }
}

/// A principal's membership in a quest's permission group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMembership {
    pub principal_id: Uuid,
    pub quest_id: Uuid,
    pub kind: GroupKind,
    pub granted_utc: DateTime<Utc>,
}

impl GroupMembership {
    pub fn new(principal_id: Uuid, quest_id: Uuid, kind: GroupKind) -> Self {
        Self {
            principal_id,
            quest_id,
            kind,
            granted_utc: Utc::now(),
        }
    }
}
