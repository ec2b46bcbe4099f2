pub mod cases;
pub mod invitations;
pub mod principals;
pub mod quests;
pub mod sessions;
