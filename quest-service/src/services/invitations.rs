//! Invitation token issuance, redemption and audit listing.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use service_core::error::AppError;

use crate::models::{GroupKind, Principal, Quest, QuestAccessToken, Role, TokenStatus};

use super::quests::QuestService;
use super::store::Store;

/// What a successful redemption granted.
#[derive(Debug, Clone)]
pub struct RedemptionGrant {
    pub quest: Quest,
    pub role: Role,
    pub group: GroupKind,
}

/// A token with its status derived at listing time.
#[derive(Debug, Clone)]
pub struct TokenView {
    pub token: QuestAccessToken,
    pub status: TokenStatus,
}

#[derive(Clone)]
pub struct InvitationService {
    store: Store,
    quests: QuestService,
}

impl InvitationService {
    pub fn new(store: Store, quests: QuestService) -> Self {
        Self { store, quests }
    }

    /// Issue a token for a quest. Requires invite capability; the token must
    /// allow at least one use and expire in the future.
    pub fn issue(
        &self,
        actor: &Principal,
        quest_id: Uuid,
        role: Role,
        group: GroupKind,
        max_uses: u32,
        expires_utc: DateTime<Utc>,
    ) -> Result<QuestAccessToken, AppError> {
        let quest = self.quests.find_quest(quest_id)?;
        if !self.quests.capabilities(actor, &quest).can_invite {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Invite capability required for this quest"
            )));
        }
        if max_uses < 1 {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Max uses must be at least 1"
            )));
        }
        if expires_utc <= Utc::now() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Expiration must be in the future"
            )));
        }

        let token = QuestAccessToken::new(
            quest_id,
            role,
            group,
            max_uses,
            expires_utc,
            actor.principal_id,
        );
        self.store.insert_token(token.clone());
        metrics::counter!("quest_tokens_issued_total").increment(1);
        tracing::info!(
            quest_id = %quest_id,
            token = %token.token,
            role = role.as_str(),
            group = group.as_str(),
            max_uses,
            "invitation token issued"
        );
        Ok(token)
    }

    /// Redeem a token for the given principal. The use-count increment is
    /// atomic in the store; the resulting grants are visible to the next
    /// capability check.
    ///
    /// Domain eligibility for student/professor roles is enforced by the
    /// identity system before the principal ever reaches this service.
    pub fn redeem(
        &self,
        principal: &Principal,
        token_value: Uuid,
    ) -> Result<RedemptionGrant, AppError> {
        let token = self.store.redeem_token(token_value)?;

        let quest = self.quests.find_quest(token.quest_id)?;
        self.store
            .grant_group(principal.principal_id, token.quest_id, token.group);
        self.store.elevate_role(principal.principal_id, token.role)?;

        metrics::counter!("quest_tokens_redeemed_total").increment(1);
        tracing::info!(
            quest_id = %token.quest_id,
            principal_id = %principal.principal_id,
            group = token.group.as_str(),
            "invitation token redeemed"
        );

        Ok(RedemptionGrant {
            quest,
            role: token.role,
            group: token.group,
        })
    }

    /// All tokens for a quest, active and inert, for audit visibility.
    pub fn list_tokens(&self, actor: &Principal, quest_id: Uuid) -> Result<Vec<TokenView>, AppError> {
        let quest = self.quests.find_quest(quest_id)?;
        if !self.quests.capabilities(actor, &quest).can_invite {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Invite capability required to list this quest's invitations"
            )));
        }
        let now = Utc::now();
        Ok(self
            .store
            .list_quest_tokens(quest_id)
            .into_iter()
            .map(|token| TokenView {
                status: token.status_at(now),
                token,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    struct Fixture {
        store: Store,
        invitations: InvitationService,
        owner: Principal,
        quest: Quest,
    }

    fn fixture() -> Fixture {
        let store = Store::new();
        let quests = QuestService::new(store.clone());
        let invitations = InvitationService::new(store.clone(), quests.clone());
        let owner = Principal::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "prof@university.edu".into(),
            Role::Professor,
        );
        store.upsert_principal(owner.clone());
        let quest = quests
            .create_quest(&owner, "Neurology".into(), false)
            .unwrap();
        Fixture {
            store,
            invitations,
            owner,
            quest,
        }
    }

    fn guest(store: &Store) -> Principal {
        let p = Principal::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "guest@example.com".into(),
            Role::Guest,
        );
        store.upsert_principal(p.clone());
        p
    }

    #[test]
    fn issuance_requires_invite_capability() {
        let f = fixture();
        let outsider = guest(&f.store);

        let err = f
            .invitations
            .issue(
                &outsider,
                f.quest.quest_id,
                Role::Student,
                GroupKind::View,
                5,
                Utc::now() + Duration::days(7),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        // Failed issuance leaves the token list unchanged.
        assert!(f
            .invitations
            .list_tokens(&f.owner, f.quest.quest_id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn issuance_rejects_zero_uses_and_past_expiry() {
        let f = fixture();
        let err = f
            .invitations
            .issue(
                &f.owner,
                f.quest.quest_id,
                Role::Student,
                GroupKind::View,
                0,
                Utc::now() + Duration::days(7),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = f
            .invitations
            .issue(
                &f.owner,
                f.quest.quest_id,
                Role::Student,
                GroupKind::View,
                1,
                Utc::now() - Duration::hours(1),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn redemption_grants_group_and_elevates_role() {
        let f = fixture();
        let invitee = guest(&f.store);
        let token = f
            .invitations
            .issue(
                &f.owner,
                f.quest.quest_id,
                Role::Student,
                GroupKind::Author,
                1,
                Utc::now() + Duration::days(7),
            )
            .unwrap();

        let grant = f.invitations.redeem(&invitee, token.token).unwrap();
        assert_eq!(grant.group, GroupKind::Author);
        assert_eq!(
            f.store
                .group_membership(invitee.principal_id, f.quest.quest_id),
            Some(GroupKind::Author)
        );
        // Guest elevated to student.
        assert_eq!(
            f.store.find_principal(invitee.principal_id).unwrap().role,
            Role::Student
        );
    }

    #[test]
    fn redemption_never_downgrades_role_or_group() {
        let f = fixture();
        let invitee = guest(&f.store);
        f.store.elevate_role(invitee.principal_id, Role::Professor).unwrap();
        f.store
            .grant_group(invitee.principal_id, f.quest.quest_id, GroupKind::Editor);

        let token = f
            .invitations
            .issue(
                &f.owner,
                f.quest.quest_id,
                Role::Student,
                GroupKind::View,
                1,
                Utc::now() + Duration::days(7),
            )
            .unwrap();
        f.invitations.redeem(&invitee, token.token).unwrap();

        assert_eq!(
            f.store.find_principal(invitee.principal_id).unwrap().role,
            Role::Professor
        );
        assert_eq!(
            f.store
                .group_membership(invitee.principal_id, f.quest.quest_id),
            Some(GroupKind::Editor)
        );
    }

    #[test]
    fn unknown_expired_and_exhausted_are_distinguished() {
        let f = fixture();
        let invitee = guest(&f.store);

        let err = f.invitations.redeem(&invitee, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let expired = QuestAccessToken::new(
            f.quest.quest_id,
            Role::Student,
            GroupKind::View,
            5,
            Utc::now() - Duration::minutes(1),
            f.owner.principal_id,
        );
        let expired_value = expired.token;
        f.store.insert_token(expired);
        let err = f.invitations.redeem(&invitee, expired_value).unwrap_err();
        assert!(matches!(err, AppError::TokenExpired(_)));

        let token = f
            .invitations
            .issue(
                &f.owner,
                f.quest.quest_id,
                Role::Guest,
                GroupKind::View,
                1,
                Utc::now() + Duration::days(1),
            )
            .unwrap();
        f.invitations.redeem(&invitee, token.token).unwrap();
        let other = guest(&f.store);
        let err = f.invitations.redeem(&other, token.token).unwrap_err();
        assert!(matches!(err, AppError::TokenExhausted(_)));
    }

    #[test]
    fn listing_shows_inert_tokens_with_status() {
        let f = fixture();
        let invitee = guest(&f.store);
        let token = f
            .invitations
            .issue(
                &f.owner,
                f.quest.quest_id,
                Role::Guest,
                GroupKind::View,
                1,
                Utc::now() + Duration::days(1),
            )
            .unwrap();
        f.invitations.redeem(&invitee, token.token).unwrap();

        let listed = f.invitations.list_tokens(&f.owner, f.quest.quest_id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, TokenStatus::Exhausted);
        assert_eq!(listed[0].token.used_by_count, 1);
    }
}
