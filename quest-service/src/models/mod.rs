pub mod access_token;
pub mod case;
pub mod group;
pub mod principal;
pub mod quest;

pub use access_token::{QuestAccessToken, TokenStatus};
pub use case::{Case, Complexity, PublicationState};
pub use group::{GroupKind, GroupMembership};
pub use principal::{Principal, Role};
pub use quest::Quest;
