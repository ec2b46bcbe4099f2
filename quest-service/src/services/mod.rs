pub mod cases;
pub mod invitations;
pub mod metrics;
pub mod permissions;
pub mod quests;
pub mod quiz;
pub mod store;

pub use cases::{CaseService, CaseUpdate, CaseView, NewCase};
pub use invitations::{InvitationService, RedemptionGrant, TokenView};
pub use metrics::{get_metrics, init_metrics};
pub use permissions::{capabilities_for, Capabilities};
pub use quests::QuestService;
pub use quiz::{CaseSnapshot, QuizSession, SessionStatus, SubmitOutcome, Submission};
pub use store::Store;
