//! Case model - a single reasoning exercise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Complexity tier of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Undergraduate,
    Graduate,
    Postgraduate,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Undergraduate => "undergraduate",
            Complexity::Graduate => "graduate",
            Complexity::Postgraduate => "postgraduate",
        }
    }
}

/// Derived publication state. Never persisted: it is a pure function of how
/// many quests currently contain the case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationState {
    Draft,
    Published,
}

impl PublicationState {
    pub fn from_membership_count(count: usize) -> Self {
        if count > 0 {
            PublicationState::Published
        } else {
            PublicationState::Draft
        }
    }
}

/// A clinical-reasoning case. `image_ref` is an opaque reference to an
/// externally stored attachment; this service never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
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
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}
