use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Case, Complexity, PublicationState};
use crate::services::CaseView;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCaseRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Prompt is required"))]
    pub prompt: String,
    #[validate(length(min = 1, message = "Answer is required"))]
    pub answer: String,
    #[serde(default)]
    pub alternative_answers: Vec<String>,
    pub complexity: Complexity,
    pub specialty: Option<String>,
    pub image_ref: Option<String>,
    /// Publish straight into a quest instead of saving as a draft.
    pub quest_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCaseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub prompt: Option<String>,
    pub answer: Option<String>,
    pub alternative_answers: Option<Vec<String>>,
    pub complexity: Option<Complexity>,
    pub specialty: Option<String>,
    pub image_ref: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CaseResponse {
    pub case_id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub prompt: String,
    pub answer: String,
    pub alternative_answers: Vec<String>,
    pub complexity: Complexity,
    pub specialty: Option<String>,
    pub image_ref: Option<String>,
}

impl From<Case> for CaseResponse {
    fn from(c: Case) -> Self {
        Self {
            case_id: c.case_id,
            owner_id: c.owner_id,
            title: c.title,
            description: c.description,
            prompt: c.prompt,
            answer: c.answer,
            alternative_answers: c.alternative_answers,
            complexity: c.complexity,
            specialty: c.specialty,
            image_ref: c.image_ref,
        }
    }
}

/// A case with its derived publication state and quest memberships, as shown
/// in the owner's case list.
#[derive(Debug, Serialize)]
pub struct CaseWithStateResponse {
    #[serde(flatten)]
    pub case: CaseResponse,
    pub state: PublicationState,
    pub quest_ids: Vec<Uuid>,
}

impl From<CaseView> for CaseWithStateResponse {
    fn from(view: CaseView) -> Self {
        Self {
            case: view.case.into(),
            state: view.state,
            quest_ids: view.quest_ids,
        }
    }
}
