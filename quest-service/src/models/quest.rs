//! Quest model - an ordered, named collection of cases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A quest. The owner is implicitly an editor of everything in it.
/// The ordered case list lives in the store's membership relation, not here,
/// so that publication state can never drift from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub quest_id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    /// Owner's institution at creation time; used for the
    /// visible-to-institution read grant.
    pub institution_id: Uuid,
    pub visible_to_institution: bool,
    pub created_utc: DateTime<Utc>,
}

impl Quest {
    pub fn new(
        name: String,
        owner_id: Uuid,
        institution_id: Uuid,
        visible_to_institution: bool,
    ) -> Self {
        Self {
            quest_id: Uuid::new_v4(),
            name,
            owner_id,
            institution_id,
            visible_to_institution,
            created_utc: Utc::now(),
        }
    }
}
