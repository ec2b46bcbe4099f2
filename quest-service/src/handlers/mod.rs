pub mod cases;
pub mod health;
pub mod invitations;
pub mod principals;
pub mod quests;
pub mod sessions;

pub use health::{health_check, metrics_handler};
