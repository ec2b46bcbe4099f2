//! Capability resolution.
//!
//! Pure mapping from (principal, quest, group membership) to what the
//! principal may do with the quest. Callers must fetch the membership fresh
//! from the store on every mutation attempt: a token redemption can change
//! it between calls, so resolved capabilities are never cached.

use crate::models::{GroupKind, Principal, Quest};

/// What a principal may do with one quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_view: bool,
    pub can_author: bool,
    pub can_edit: bool,
    pub can_invite: bool,
}

impl Capabilities {
    pub const ALL: Capabilities = Capabilities {
        can_view: true,
        can_author: true,
        can_edit: true,
        can_invite: true,
    };

    pub const NONE: Capabilities = Capabilities {
        can_view: false,
        can_author: false,
        can_edit: false,
        can_invite: false,
    };

    pub const VIEW_ONLY: Capabilities = Capabilities {
        can_view: true,
        can_author: false,
        can_edit: false,
        can_invite: false,
    };
}

/// Resolve capabilities, in precedence order: owner, editor, author,
/// view grant or institution visibility, nothing.
pub fn capabilities_for(
    principal: &Principal,
    quest: &Quest,
    membership: Option<GroupKind>,
) -> Capabilities {
    if principal.principal_id == quest.owner_id {
        return Capabilities::ALL;
    }

    match membership {
        Some(GroupKind::Editor) => Capabilities::ALL,
        Some(GroupKind::Author) => Capabilities {
            can_view: true,
            can_author: true,
            can_edit: false,
            can_invite: false,
        },
        Some(GroupKind::View) => Capabilities::VIEW_ONLY,
        None => {
            if quest.visible_to_institution && principal.institution_id == quest.institution_id {
                Capabilities::VIEW_ONLY
            } else {
                Capabilities::NONE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use uuid::Uuid;

    fn principal(institution_id: Uuid) -> Principal {
        Principal::new(
            Uuid::new_v4(),
            institution_id,
            "someone@example.edu".into(),
            Role::Student,
        )
    }

    fn quest(owner_id: Uuid, institution_id: Uuid, visible: bool) -> Quest {
        Quest::new("Cardiology".into(), owner_id, institution_id, visible)
    }

    #[test]
    fn owner_gets_everything() {
        let institution = Uuid::new_v4();
        let p = principal(institution);
        let q = quest(p.principal_id, institution, false);
        assert_eq!(capabilities_for(&p, &q, None), Capabilities::ALL);
    }

    #[test]
    fn editor_gets_everything() {
        let institution = Uuid::new_v4();
        let p = principal(institution);
        let q = quest(Uuid::new_v4(), institution, false);
        assert_eq!(
            capabilities_for(&p, &q, Some(GroupKind::Editor)),
            Capabilities::ALL
        );
    }

    #[test]
    fn author_may_add_but_not_edit_or_invite() {
        let institution = Uuid::new_v4();
        let p = principal(institution);
        let q = quest(Uuid::new_v4(), institution, false);
        let caps = capabilities_for(&p, &q, Some(GroupKind::Author));
        assert!(caps.can_view);
        assert!(caps.can_author);
        assert!(!caps.can_edit);
        assert!(!caps.can_invite);
    }

    #[test]
    fn view_grant_is_read_only() {
        let institution = Uuid::new_v4();
        let p = principal(institution);
        let q = quest(Uuid::new_v4(), institution, false);
        assert_eq!(
            capabilities_for(&p, &q, Some(GroupKind::View)),
            Capabilities::VIEW_ONLY
        );
    }

    #[test]
    fn institution_visibility_grants_view_to_same_institution_only() {
        let institution = Uuid::new_v4();
        let p = principal(institution);

        let same = quest(Uuid::new_v4(), institution, true);
        assert_eq!(capabilities_for(&p, &same, None), Capabilities::VIEW_ONLY);

        let other = quest(Uuid::new_v4(), Uuid::new_v4(), true);
        assert_eq!(capabilities_for(&p, &other, None), Capabilities::NONE);

        let hidden = quest(Uuid::new_v4(), institution, false);
        assert_eq!(capabilities_for(&p, &hidden, None), Capabilities::NONE);
    }

    #[test]
    fn ownership_beats_a_lower_membership() {
        let institution = Uuid::new_v4();
        let p = principal(institution);
        let q = quest(p.principal_id, institution, false);
        assert_eq!(
            capabilities_for(&p, &q, Some(GroupKind::View)),
            Capabilities::ALL
        );
    }
}
