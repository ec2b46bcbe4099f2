use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::Quest;
use crate::services::Capabilities;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestRequest {
    #[validate(length(min = 1, message = "Quest name is required"))]
    pub name: String,
    #[serde(default)]
    pub visible_to_institution: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddCaseRequest {
    pub case_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReorderRequest {
    #[validate(length(min = 1, message = "New order must not be empty"))]
    pub case_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct QuestResponse {
    pub quest_id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub visible_to_institution: bool,
}

impl From<Quest> for QuestResponse {
    fn from(q: Quest) -> Self {
        Self {
            quest_id: q.quest_id,
            name: q.name,
            owner_id: q.owner_id,
            visible_to_institution: q.visible_to_institution,
        }
    }
}

/// Quest detail plus what the requesting principal may do with it.
#[derive(Debug, Serialize)]
pub struct QuestDetailResponse {
    #[serde(flatten)]
    pub quest: QuestResponse,
    pub can_view: bool,
    pub can_author: bool,
    pub can_edit: bool,
    pub can_invite: bool,
}

impl QuestDetailResponse {
    pub fn new(quest: Quest, caps: Capabilities) -> Self {
        Self {
            quest: quest.into(),
            can_view: caps.can_view,
            can_author: caps.can_author,
            can_edit: caps.can_edit,
            can_invite: caps.can_invite,
        }
    }
}
