//! Quest creation and quest/case membership orchestration.
//!
//! Capabilities are resolved fresh from the store on every call; a grant
//! picked up through a token redemption is visible to the very next check.

use uuid::Uuid;

use service_core::error::AppError;

use crate::models::{Case, Principal, Quest};

use super::permissions::{capabilities_for, Capabilities};
use super::store::Store;

#[derive(Clone)]
pub struct QuestService {
    store: Store,
}

impl QuestService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Resolve the actor's capabilities for a quest from fresh membership
    /// data.
    pub fn capabilities(&self, actor: &Principal, quest: &Quest) -> Capabilities {
        let membership = self
            .store
            .group_membership(actor.principal_id, quest.quest_id);
        capabilities_for(actor, quest, membership)
    }

    /// Quest creation is a professor action.
    pub fn create_quest(
        &self,
        actor: &Principal,
        name: String,
        visible_to_institution: bool,
    ) -> Result<Quest, AppError> {
        if actor.role != crate::models::Role::Professor {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Only professors may create quests"
            )));
        }
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Quest name must not be empty"
            )));
        }

        let quest = Quest::new(
            name,
            actor.principal_id,
            actor.institution_id,
            visible_to_institution,
        );
        self.store.insert_quest(quest.clone());
        tracing::info!(quest_id = %quest.quest_id, owner_id = %actor.principal_id, "quest created");
        Ok(quest)
    }

    pub fn find_quest(&self, quest_id: Uuid) -> Result<Quest, AppError> {
        self.store
            .find_quest(quest_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quest not found")))
    }

    /// Quest detail, gated on view capability.
    pub fn get_quest(&self, actor: &Principal, quest_id: Uuid) -> Result<Quest, AppError> {
        let quest = self.find_quest(quest_id)?;
        if !self.capabilities(actor, &quest).can_view {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "View capability required for this quest"
            )));
        }
        Ok(quest)
    }

    /// Quests the actor can at least view.
    pub fn list_visible(&self, actor: &Principal) -> Vec<Quest> {
        let mut quests: Vec<Quest> = self
            .store
            .list_quests()
            .into_iter()
            .filter(|q| self.capabilities(actor, q).can_view)
            .collect();
        quests.sort_by_key(|q| q.created_utc);
        quests
    }

    /// Quests the actor can add cases to (owner, editor or author).
    pub fn list_authorable(&self, actor: &Principal) -> Vec<Quest> {
        let mut quests: Vec<Quest> = self
            .store
            .list_quests()
            .into_iter()
            .filter(|q| self.capabilities(actor, q).can_author)
            .collect();
        quests.sort_by_key(|q| q.created_utc);
        quests
    }

    /// The quest's cases in order, gated on view capability.
    pub fn quest_cases(&self, actor: &Principal, quest_id: Uuid) -> Result<Vec<Case>, AppError> {
        let quest = self.find_quest(quest_id)?;
        if !self.capabilities(actor, &quest).can_view {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "View capability required for this quest"
            )));
        }
        Ok(self.ordered_cases(quest_id))
    }

    pub(crate) fn ordered_cases(&self, quest_id: Uuid) -> Vec<Case> {
        self.store
            .quest_case_ids(quest_id)
            .into_iter()
            .filter_map(|id| self.store.find_case(id))
            .collect()
    }

    /// Append a case to a quest. Authors and editors both qualify. The case
    /// flips to published the moment its first membership appears.
    pub fn add_case(
        &self,
        actor: &Principal,
        quest_id: Uuid,
        case_id: Uuid,
    ) -> Result<(), AppError> {
        let quest = self.find_quest(quest_id)?;
        if self.store.find_case(case_id).is_none() {
            return Err(AppError::NotFound(anyhow::anyhow!("Case not found")));
        }
        if !self.capabilities(actor, &quest).can_author {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Author capability required to add cases to this quest"
            )));
        }
        self.store.add_case_to_quest(quest_id, case_id)?;
        tracing::info!(quest_id = %quest_id, case_id = %case_id, "case added to quest");
        Ok(())
    }

    /// Remove a case from a quest. Requires edit capability: authors may add
    /// but not remove, since removal affects other authors' published
    /// content.
    pub fn remove_case(
        &self,
        actor: &Principal,
        quest_id: Uuid,
        case_id: Uuid,
    ) -> Result<(), AppError> {
        let quest = self.find_quest(quest_id)?;
        if !self.capabilities(actor, &quest).can_edit {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Edit capability required to remove cases from this quest"
            )));
        }
        self.store.remove_case_from_quest(quest_id, case_id)?;
        tracing::info!(quest_id = %quest_id, case_id = %case_id, "case removed from quest");
        Ok(())
    }

    /// Replace the quest's case ordering with a permutation of the current
    /// members.
    pub fn reorder(
        &self,
        actor: &Principal,
        quest_id: Uuid,
        new_order: Vec<Uuid>,
    ) -> Result<(), AppError> {
        let quest = self.find_quest(quest_id)?;
        if !self.capabilities(actor, &quest).can_edit {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Edit capability required to reorder this quest"
            )));
        }
        self.store.reorder_quest_cases(quest_id, new_order)
    }
}
