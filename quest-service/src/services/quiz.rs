//! Quiz session engine.
//!
//! A session is a per-learner walk over a snapshot of a quest's ordered
//! cases, taken at start time. It never mutates quest, case or membership
//! data, and is never shared between principals, so no locking is needed
//! inside the engine itself.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use service_core::error::AppError;

use crate::models::Case;

/// Case data frozen into the session at start.
#[derive(Debug, Clone)]
pub struct CaseSnapshot {
    pub case_id: Uuid,
    pub title: String,
    pub prompt: String,
    pub image_ref: Option<String>,
    pub answer: String,
    pub alternative_answers: Vec<String>,
}

impl From<Case> for CaseSnapshot {
    fn from(case: Case) -> Self {
        Self {
            case_id: case.case_id,
            title: case.title,
            prompt: case.prompt,
            image_ref: case.image_ref,
            answer: case.answer,
            alternative_answers: case.alternative_answers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

/// Per-case submission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Unanswered,
    Answered { correct: bool },
}

/// Result of a submission: whether it matched, and the canonical answer so
/// the caller can show it either way.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub correct: bool,
    pub canonical_answer: String,
}

/// Trim and case-fold; matching is exact after normalization, never fuzzy.
fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    pub session_id: Uuid,
    pub principal_id: Uuid,
    pub quest_id: Uuid,
    cases: Vec<CaseSnapshot>,
    submissions: Vec<Submission>,
    index: usize,
    score: u32,
    status: SessionStatus,
    /// Whether the case at `index` has been answered since it was last
    /// navigated to. Guards against double submission within one visit while
    /// allowing a revisited case to be answered again.
    submitted_this_visit: bool,
    pub started_utc: DateTime<Utc>,
}

impl QuizSession {
    pub fn start(
        principal_id: Uuid,
        quest_id: Uuid,
        cases: Vec<CaseSnapshot>,
    ) -> Result<Self, AppError> {
        if cases.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Quest has no cases to play"
            )));
        }
        let submissions = vec![Submission::Unanswered; cases.len()];
        Ok(Self {
            session_id: Uuid::new_v4(),
            principal_id,
            quest_id,
            submissions,
            cases,
            index: 0,
            score: 0,
            status: SessionStatus::InProgress,
            submitted_this_visit: false,
            started_utc: Utc::now(),
        })
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total(&self) -> usize {
        self.cases.len()
    }

    pub fn current_case(&self) -> &CaseSnapshot {
        &self.cases[self.index]
    }

    pub fn current_submission(&self) -> Submission {
        self.submissions[self.index]
    }

    fn ensure_in_progress(&self) -> Result<(), AppError> {
        if self.status == SessionStatus::Completed {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Session is already completed"
            )));
        }
        Ok(())
    }

    /// Evaluate a submission for the current case. One submission per visit:
    /// submitting twice without navigating is a conflict, but a case
    /// revisited via `previous` may be answered again, replacing the earlier
    /// answer and its score contribution exactly once.
    pub fn submit(&mut self, raw_answer: &str) -> Result<SubmitOutcome, AppError> {
        self.ensure_in_progress()?;
        if self.submitted_this_visit {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Current case was already answered; advance or go back first"
            )));
        }

        let case = &self.cases[self.index];
        let submitted = normalize(raw_answer);
        let correct = submitted == normalize(&case.answer)
            || case
                .alternative_answers
                .iter()
                .any(|alt| normalize(alt) == submitted);

        // Replacing an earlier answer: back out its score contribution
        // before counting the new one.
        if let Submission::Answered { correct: was_correct } = self.submissions[self.index] {
            if was_correct {
                self.score -= 1;
            }
        }
        if correct {
            self.score += 1;
        }
        self.submissions[self.index] = Submission::Answered { correct };
        self.submitted_this_visit = true;

        Ok(SubmitOutcome {
            correct,
            canonical_answer: case.answer.clone(),
        })
    }

    /// Move to the next case, or complete the session from the last one.
    /// Only valid once the current case has been answered.
    pub fn advance(&mut self) -> Result<(), AppError> {
        self.ensure_in_progress()?;
        if self.submissions[self.index] == Submission::Unanswered {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Current case has not been answered yet"
            )));
        }
        if self.index + 1 == self.cases.len() {
            self.status = SessionStatus::Completed;
        } else {
            self.index += 1;
            self.submitted_this_visit = false;
        }
        Ok(())
    }

    /// Step back one case. Does not touch the answered state or score of the
    /// case being returned to.
    pub fn previous(&mut self) -> Result<(), AppError> {
        self.ensure_in_progress()?;
        if self.index == 0 {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Already at the first case"
            )));
        }
        self.index -= 1;
        self.submitted_this_visit = false;
        Ok(())
    }

    /// Complete the session immediately, answered or not.
    pub fn finish_early(&mut self) -> Result<(), AppError> {
        self.ensure_in_progress()?;
        self.status = SessionStatus::Completed;
        Ok(())
    }
}
