use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::services::{QuizSession, SessionStatus, SubmitOutcome, Submission};

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, message = "Answer is required"))]
    pub answer: String,
}

/// The current case as shown to the learner; the canonical answer stays
/// server-side until submission.
#[derive(Debug, Serialize)]
pub struct SessionCaseResponse {
    pub case_id: Uuid,
    pub title: String,
    pub prompt: String,
    pub image_ref: Option<String>,
    pub answered: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub quest_id: Uuid,
    pub status: SessionStatus,
    pub index: usize,
    pub total: usize,
    pub score: u32,
    /// Present while the session is in progress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_case: Option<SessionCaseResponse>,
}

impl From<&QuizSession> for SessionResponse {
    fn from(session: &QuizSession) -> Self {
        let current_case = match session.status() {
            SessionStatus::Completed => None,
            SessionStatus::InProgress => {
                let case = session.current_case();
                Some(SessionCaseResponse {
                    case_id: case.case_id,
                    title: case.title.clone(),
                    prompt: case.prompt.clone(),
                    image_ref: case.image_ref.clone(),
                    answered: matches!(session.current_submission(), Submission::Answered { .. }),
                })
            }
        };
        Self {
            session_id: session.session_id,
            quest_id: session.quest_id,
            status: session.status(),
            index: session.index(),
            total: session.total(),
            score: session.score(),
            current_case,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub correct: bool,
    pub canonical_answer: String,
    pub score: u32,
}

impl SubmitAnswerResponse {
    pub fn new(outcome: SubmitOutcome, score: u32) -> Self {
        Self {
            correct: outcome.correct,
            canonical_answer: outcome.canonical_answer,
            score,
        }
    }
}
