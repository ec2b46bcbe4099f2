//! Case lifecycle: creation, owner-only mutation, deletion, and the derived
//! draft/published split.

use chrono::Utc;
use uuid::Uuid;

use service_core::error::AppError;

use crate::models::{Case, Complexity, Principal, PublicationState};

use super::store::Store;

/// Fields for a new case. Required fields are validated at the DTO boundary;
/// the service normalizes and persists.
#[derive(Debug, Clone)]
pub struct NewCase {
    pub title: String,
    pub description: Option<String>,
    pub prompt: String,
    pub answer: String,
    pub alternative_answers: Vec<String>,
    pub complexity: Complexity,
    pub specialty: Option<String>,
    pub image_ref: Option<String>,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct CaseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub prompt: Option<String>,
    pub answer: Option<String>,
    pub alternative_answers: Option<Vec<String>>,
    pub complexity: Option<Complexity>,
    pub specialty: Option<String>,
    pub image_ref: Option<String>,
}

/// A case together with its derived state and current quest memberships.
#[derive(Debug, Clone)]
pub struct CaseView {
    pub case: Case,
    pub state: PublicationState,
    pub quest_ids: Vec<Uuid>,
}

/// Trim alternatives and drop the empties before storage.
pub fn normalize_alternatives(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Clone)]
pub struct CaseService {
    store: Store,
}

impl CaseService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a case in draft state (zero memberships).
    pub fn create_case(&self, owner: &Principal, new_case: NewCase) -> Result<Case, AppError> {
        let title = new_case.title.trim().to_string();
        let prompt = new_case.prompt.trim().to_string();
        let answer = new_case.answer.trim().to_string();
        if title.is_empty() || prompt.is_empty() || answer.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Title, prompt and answer must not be empty"
            )));
        }

        let now = Utc::now();
        let case = Case {
            case_id: Uuid::new_v4(),
            owner_id: owner.principal_id,
            title,
            description: new_case.description.filter(|d| !d.trim().is_empty()),
            prompt,
            answer,
            alternative_answers: normalize_alternatives(new_case.alternative_answers),
            complexity: new_case.complexity,
            specialty: new_case.specialty.filter(|s| !s.trim().is_empty()),
            image_ref: new_case.image_ref,
            created_utc: now,
            updated_utc: now,
        };
        self.store.insert_case(case.clone());
        metrics::counter!("cases_created_total").increment(1);
        tracing::info!(case_id = %case.case_id, owner_id = %owner.principal_id, "case created");
        Ok(case)
    }

    /// Derived publication state; never stored anywhere.
    pub fn publication_state(&self, case_id: Uuid) -> PublicationState {
        PublicationState::from_membership_count(self.store.membership_count(case_id))
    }

    /// Owner-only field update. Alternative answers are normalized before
    /// storage.
    pub fn update_case(
        &self,
        actor: &Principal,
        case_id: Uuid,
        patch: CaseUpdate,
    ) -> Result<Case, AppError> {
        let mut case = self
            .store
            .find_case(case_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Case not found")))?;

        if case.owner_id != actor.principal_id {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Only the case owner may update a case"
            )));
        }

        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Title must not be empty"
                )));
            }
            case.title = title;
        }
        if let Some(prompt) = patch.prompt {
            let prompt = prompt.trim().to_string();
            if prompt.is_empty() {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Prompt must not be empty"
                )));
            }
            case.prompt = prompt;
        }
        if let Some(answer) = patch.answer {
            let answer = answer.trim().to_string();
            if answer.is_empty() {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Answer must not be empty"
                )));
            }
            case.answer = answer;
        }
        if let Some(alternatives) = patch.alternative_answers {
            case.alternative_answers = normalize_alternatives(alternatives);
        }
        if let Some(complexity) = patch.complexity {
            case.complexity = complexity;
        }
        if let Some(description) = patch.description {
            case.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(specialty) = patch.specialty {
            case.specialty = Some(specialty).filter(|s| !s.trim().is_empty());
        }
        if let Some(image_ref) = patch.image_ref {
            case.image_ref = Some(image_ref).filter(|i| !i.is_empty());
        }

        case.updated_utc = Utc::now();
        self.store.update_case(case.clone());
        Ok(case)
    }

    /// Owner-only deletion. The store removes all quest memberships together
    /// with the record, so no quest is left pointing at a missing case.
    pub fn delete_case(&self, actor: &Principal, case_id: Uuid) -> Result<(), AppError> {
        let case = self
            .store
            .find_case(case_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Case not found")))?;

        if case.owner_id != actor.principal_id {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Only the case owner may delete a case"
            )));
        }

        self.store.remove_case(case_id);
        tracing::info!(case_id = %case_id, "case deleted");
        Ok(())
    }

    /// All cases owned by the actor, with derived state and memberships.
    pub fn my_cases(&self, actor: &Principal) -> Vec<CaseView> {
        self.store
            .cases_owned_by(actor.principal_id)
            .into_iter()
            .map(|case| {
                let quest_ids = self.store.quests_containing(case.case_id);
                CaseView {
                    state: PublicationState::from_membership_count(quest_ids.len()),
                    quest_ids,
                    case,
                }
            })
            .collect()
    }

    pub fn find_case(&self, case_id: Uuid) -> Result<Case, AppError> {
        self.store
            .find_case(case_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Case not found")))
    }
}
