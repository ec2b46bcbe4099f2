//! Principal model - identities handed to the core by the identity system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Global role tag, ordered least to most privileged.
///
/// Student and professor registrations are restricted to institution email
/// domains; that check belongs to the identity system, not this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Student,
    Professor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Student => "student",
            Role::Professor => "professor",
        }
    }
}

/// An authenticated identity. Owned by the external identity system and
/// treated as trusted input; this service only reads it and tracks the
/// role/group grants it accumulates through invitation redemptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub principal_id: Uuid,
    pub institution_id: Uuid,
    pub email: String,
    pub role: Role,
    pub created_utc: DateTime<Utc>,
}

impl Principal {
    pub fn new(principal_id: Uuid, institution_id: Uuid, email: String, role: Role) -> Self {
        Self {
            principal_id,
            institution_id,
            email,
            role,
            created_utc: Utc::now(),
        }
    }
}
