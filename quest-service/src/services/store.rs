//! In-memory backing store.
//!
//! Stands in for the durable storage layer while providing the atomic units
//! the domain requires of it:
//! - membership add/remove/reorder is atomic per quest (DashMap entry
//!   locking), so concurrent adds of the same (quest, case) pair yield
//!   exactly one success and one conflict;
//! - token redemption is a shard-locked compare-and-increment that cannot
//!   run past `max_uses`.
//!
//! The quest -> ordered-case-id vector is the single source of truth for
//! quest/case membership. Publication state is always computed from it.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use service_core::error::AppError;

use crate::models::{Case, GroupKind, GroupMembership, Principal, Quest, QuestAccessToken, Role};

#[derive(Clone, Default)]
pub struct Store {
    principals: Arc<DashMap<Uuid, Principal>>,
    quests: Arc<DashMap<Uuid, Quest>>,
    cases: Arc<DashMap<Uuid, Case>>,
    /// quest_id -> ordered case ids.
    quest_cases: Arc<DashMap<Uuid, Vec<Uuid>>>,
    /// (principal_id, quest_id) -> membership record with tier and grant time.
    group_memberships: Arc<DashMap<(Uuid, Uuid), GroupMembership>>,
    tokens: Arc<DashMap<Uuid, QuestAccessToken>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Principals ====================

    /// Register or refresh a principal record handed over by the identity
    /// system. Role and group grants accumulated here survive the refresh.
    pub fn upsert_principal(&self, principal: Principal) -> Principal {
        match self.principals.get_mut(&principal.principal_id) {
            Some(mut existing) => {
                existing.institution_id = principal.institution_id;
                existing.email = principal.email;
                // Keep the higher of the stored role and the incoming one.
                if principal.role > existing.role {
                    existing.role = principal.role;
                }
                existing.clone()
            }
            None => {
                self.principals
                    .insert(principal.principal_id, principal.clone());
                principal
            }
        }
    }

    pub fn find_principal(&self, principal_id: Uuid) -> Option<Principal> {
        self.principals.get(&principal_id).map(|p| p.clone())
    }

    /// Raise the principal's role if `role` is strictly higher.
    pub fn elevate_role(&self, principal_id: Uuid, role: Role) -> Result<(), AppError> {
        let mut principal = self
            .principals
            .get_mut(&principal_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Principal not found")))?;
        if role > principal.role {
            principal.role = role;
        }
        Ok(())
    }

    // ==================== Quests ====================

    pub fn insert_quest(&self, quest: Quest) {
        self.quest_cases.insert(quest.quest_id, Vec::new());
        self.quests.insert(quest.quest_id, quest);
    }

    pub fn find_quest(&self, quest_id: Uuid) -> Option<Quest> {
        self.quests.get(&quest_id).map(|q| q.clone())
    }

    pub fn list_quests(&self) -> Vec<Quest> {
        self.quests.iter().map(|q| q.clone()).collect()
    }

    // ==================== Cases ====================

    pub fn insert_case(&self, case: Case) {
        self.cases.insert(case.case_id, case);
    }

    pub fn find_case(&self, case_id: Uuid) -> Option<Case> {
        self.cases.get(&case_id).map(|c| c.clone())
    }

    pub fn update_case(&self, case: Case) {
        self.cases.insert(case.case_id, case);
    }

    pub fn cases_owned_by(&self, owner_id: Uuid) -> Vec<Case> {
        let mut owned: Vec<Case> = self
            .cases
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .map(|c| c.clone())
            .collect();
        owned.sort_by_key(|c| c.created_utc);
        owned
    }

    /// Remove a case and every membership referencing it. Memberships go
    /// first so no quest ever lists a case that no longer exists.
    pub fn remove_case(&self, case_id: Uuid) -> Option<Case> {
        for mut entry in self.quest_cases.iter_mut() {
            entry.value_mut().retain(|id| *id != case_id);
        }
        self.cases.remove(&case_id).map(|(_, c)| c)
    }

    // ==================== Quest/case memberships ====================

    /// Ordered case ids of a quest.
    pub fn quest_case_ids(&self, quest_id: Uuid) -> Vec<Uuid> {
        self.quest_cases
            .get(&quest_id)
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }

    /// Number of quests currently containing the case.
    pub fn membership_count(&self, case_id: Uuid) -> usize {
        self.quest_cases
            .iter()
            .filter(|entry| entry.value().contains(&case_id))
            .count()
    }

    /// Quests currently containing the case.
    pub fn quests_containing(&self, case_id: Uuid) -> Vec<Uuid> {
        self.quest_cases
            .iter()
            .filter(|entry| entry.value().contains(&case_id))
            .map(|entry| *entry.key())
            .collect()
    }

    /// Append the case to the quest's ordering. Uniqueness of the
    /// (quest, case) pair is checked under the entry lock, so two racing
    /// adds produce one success and one conflict.
    pub fn add_case_to_quest(&self, quest_id: Uuid, case_id: Uuid) -> Result<(), AppError> {
        let mut ids = self
            .quest_cases
            .get_mut(&quest_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quest not found")))?;
        if ids.contains(&case_id) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Case is already part of this quest"
            )));
        }
        ids.push(case_id);
        Ok(())
    }

    /// Remove the (quest, case) membership. Ordering of the remaining
    /// members is preserved.
    pub fn remove_case_from_quest(&self, quest_id: Uuid, case_id: Uuid) -> Result<(), AppError> {
        let mut ids = self
            .quest_cases
            .get_mut(&quest_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quest not found")))?;
        let before = ids.len();
        ids.retain(|id| *id != case_id);
        if ids.len() == before {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Case is not part of this quest"
            )));
        }
        Ok(())
    }

    /// Replace the quest's ordering. `new_order` must be a permutation of
    /// the current members; validated under the entry lock.
    pub fn reorder_quest_cases(
        &self,
        quest_id: Uuid,
        new_order: Vec<Uuid>,
    ) -> Result<(), AppError> {
        let mut ids = self
            .quest_cases
            .get_mut(&quest_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quest not found")))?;

        let mut current = ids.clone();
        let mut proposed = new_order.clone();
        current.sort();
        proposed.sort();
        if current != proposed {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "New order must be a permutation of the quest's current cases"
            )));
        }

        *ids = new_order;
        Ok(())
    }

    // ==================== Group memberships ====================

    pub fn group_membership(&self, principal_id: Uuid, quest_id: Uuid) -> Option<GroupKind> {
        self.group_membership_record(principal_id, quest_id)
            .map(|m| m.kind)
    }

    pub fn group_membership_record(
        &self,
        principal_id: Uuid,
        quest_id: Uuid,
    ) -> Option<GroupMembership> {
        self.group_memberships
            .get(&(principal_id, quest_id))
            .map(|m| m.clone())
    }

    /// Grant a permission tier, keeping an existing higher tier in place.
    /// The grant timestamp only moves when the tier actually changes.
    pub fn grant_group(&self, principal_id: Uuid, quest_id: Uuid, kind: GroupKind) {
        self.group_memberships
            .entry((principal_id, quest_id))
            .and_modify(|existing| {
                if kind > existing.kind {
                    existing.kind = kind;
                    existing.granted_utc = Utc::now();
                }
            })
            .or_insert_with(|| GroupMembership::new(principal_id, quest_id, kind));
    }

    pub fn quests_with_group(&self, principal_id: Uuid) -> Vec<(Uuid, GroupKind)> {
        self.group_memberships
            .iter()
            .filter(|entry| entry.key().0 == principal_id)
            .map(|entry| (entry.key().1, entry.value().kind))
            .collect()
    }

    // ==================== Access tokens ====================

    pub fn insert_token(&self, token: QuestAccessToken) {
        self.tokens.insert(token.token, token);
    }

    pub fn find_token(&self, token: Uuid) -> Option<QuestAccessToken> {
        self.tokens.get(&token).map(|t| t.clone())
    }

    pub fn list_quest_tokens(&self, quest_id: Uuid) -> Vec<QuestAccessToken> {
        let mut tokens: Vec<QuestAccessToken> = self
            .tokens
            .iter()
            .filter(|t| t.quest_id == quest_id)
            .map(|t| t.clone())
            .collect();
        tokens.sort_by_key(|t| t.created_utc);
        tokens
    }

    /// Atomic compare-and-increment redemption. The expiry and exhaustion
    /// checks and the increment happen under one shard write lock, so
    /// concurrent redemptions can never run past `max_uses`.
    pub fn redeem_token(&self, token: Uuid) -> Result<QuestAccessToken, AppError> {
        let mut entry = self
            .tokens
            .get_mut(&token)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invitation token not found")))?;

        let now = Utc::now();
        if now > entry.expires_utc {
            return Err(AppError::TokenExpired(format!(
                "Invitation expired at {}",
                entry.expires_utc.to_rfc3339()
            )));
        }
        if entry.used_by_count >= entry.max_uses {
            return Err(AppError::TokenExhausted(format!(
                "Invitation already used {} of {} times",
                entry.used_by_count, entry.max_uses
            )));
        }

        entry.used_by_count += 1;
        Ok(entry.clone())
    }
}
