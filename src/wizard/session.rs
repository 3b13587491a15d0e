// Per-user wizard state and the terminal submission record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque per-user identifier supplied by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Awaiting the answer for step `cursor`.
    InProgress,
    /// All steps answered; the terminal record has not flushed yet.
    Completed,
    /// Discarded; never persisted.
    Aborted,
}

/// Mutable per-user wizard state, owned by the session store and mutated
/// only within a single event's handling scope.
///
/// Invariant: `answers.len() == cursor` while the session is in progress.
/// The mutators below are the only way to move the cursor, so a violation
/// indicates a navigation bug.
#[derive(Debug, Clone)]
pub struct WizardSession {
    pub user_id: UserId,
    pub handle: Option<String>,
    cursor: usize,
    answers: Vec<String>,
    status: SessionStatus,
}

impl WizardSession {
    pub fn new(user_id: UserId, handle: Option<String>) -> Self {
        Self {
            user_id,
            handle,
            cursor: 0,
            answers: Vec::new(),
            status: SessionStatus::InProgress,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Append the answer for the current step and advance the cursor.
    pub fn record_answer(&mut self, answer: String) {
        debug_assert_eq!(self.status, SessionStatus::InProgress);
        self.answers.push(answer);
        self.cursor += 1;
        debug_assert_eq!(self.answers.len(), self.cursor);
    }

    /// Undo the most recent answer, returning it. `None` at step 0.
    pub fn step_back(&mut self) -> Option<String> {
        if self.cursor == 0 {
            return None;
        }
        let undone = self.answers.pop();
        debug_assert!(undone.is_some(), "cursor ahead of recorded answers");
        self.cursor -= 1;
        debug_assert_eq!(self.answers.len(), self.cursor);
        undone
    }

    pub fn mark_completed(&mut self) {
        self.status = SessionStatus::Completed;
    }

    pub fn mark_aborted(&mut self) {
        self.status = SessionStatus::Aborted;
    }
}

/// Terminal record of a finalized submission, immutable once written.
/// A user has at most one; resubmission overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub user_id: UserId,
    pub handle: Option<String>,
    pub answers: Vec<String>,
    pub submit_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_back_maintain_invariant() {
        let mut session = WizardSession::new(UserId(7), None);
        assert_eq!(session.cursor(), 0);
        assert!(session.answers().is_empty());

        session.record_answer("a".to_string());
        session.record_answer("b".to_string());
        assert_eq!(session.cursor(), 2);
        assert_eq!(session.answers().len(), session.cursor());

        assert_eq!(session.step_back(), Some("b".to_string()));
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.answers(), ["a".to_string()]);
    }

    #[test]
    fn step_back_at_zero_is_noop() {
        let mut session = WizardSession::new(UserId(7), None);
        assert_eq!(session.step_back(), None);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn submission_record_round_trips_through_json() {
        let record = SubmissionRecord {
            user_id: UserId(42),
            handle: Some("founder".to_string()),
            answers: vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
            submit_time: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: SubmissionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
