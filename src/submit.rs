// Submission finalizer - assembles the answer set, notifies, persists

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};

use crate::store::{SessionStore, StoreError};
use crate::wizard::session::{SubmissionRecord, WizardSession};

const ANSWER_LABELS: [&str; 5] = [
    "Deck",
    "LinkedIn",
    "Github",
    "Wallet",
    "Additional Materials",
];

pub const THANK_YOU: &str = "Thank you! We have received your submission. \
    We will review and get back to you shortly with next steps.";

#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Receives the formatted record of each finalized submission, e.g. a
/// review channel. Failures are logged, never retried in the user flow.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, formatted: &str) -> Result<(), NotifyError>;
}

/// Default sink: writes the record to the structured log.
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn send(&self, formatted: &str) -> Result<(), NotifyError> {
        info!(submission = %formatted, "new submission");
        Ok(())
    }
}

pub struct SubmissionFinalizer {
    sink: Arc<dyn NotificationSink>,
    store: Arc<SessionStore>,
}

impl SubmissionFinalizer {
    pub fn new(sink: Arc<dyn NotificationSink>, store: Arc<SessionStore>) -> Self {
        Self { sink, store }
    }

    /// Finalize a completed session: notify the sink, then write the
    /// terminal record (overwriting any prior record for the user). The
    /// record write happens before the caller discards the session, so a
    /// crash in between leaves a record plus a stale session that resume
    /// handling replaces. A write failure keeps the session alive for a
    /// later retry without re-asking questions.
    pub async fn finalize(&self, session: &WizardSession) -> Result<SubmissionRecord, StoreError> {
        let record = SubmissionRecord {
            user_id: session.user_id,
            handle: session.handle.clone(),
            answers: session.answers().to_vec(),
            submit_time: Utc::now(),
        };

        if let Err(e) = self.sink.send(&format_notification(&record)).await {
            error!(user = %record.user_id, error = %e, "notification send failed");
        }

        self.store.write_record(record.clone()).await?;
        info!(user = %record.user_id, "submission finalized");
        Ok(record)
    }
}

fn handle_line(record: &SubmissionRecord) -> String {
    match &record.handle {
        Some(handle) => format!("@{handle}"),
        None => "-".to_string(),
    }
}

fn answer_lines(record: &SubmissionRecord) -> String {
    ANSWER_LABELS
        .iter()
        .zip(record.answers.iter())
        .map(|(label, answer)| format!("{label}: {answer}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The single formatted record handed to the notification sink.
pub fn format_notification(record: &SubmissionRecord) -> String {
    format!(
        "New Submission:\n\nHandle: {}\n{}",
        handle_line(record),
        answer_lines(record)
    )
}

/// The stored-record view shown on re-entry, ahead of the Resubmit offer.
pub fn format_resume_view(record: &SubmissionRecord) -> String {
    format!(
        "According to our records, you submitted an application on {}:\n\nHandle: {}\n{}",
        record.submit_time.format("%Y-%m-%d %H:%M:%S UTC"),
        handle_line(record),
        answer_lines(record)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::session::UserId;

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            user_id: UserId(9),
            handle: Some("founder".to_string()),
            answers: vec![
                "https://files.example/deck.pdf".into(),
                "https://linkedin.com/in/f".into(),
                "https://github.com/f".into(),
                "0x1185cB5122Edad199BdBC0cbd7a0457E448f23c7".into(),
                "None".into(),
            ],
            submit_time: Utc::now(),
        }
    }

    #[test]
    fn notification_lists_every_labelled_answer() {
        let text = format_notification(&record());
        assert!(text.starts_with("New Submission:"));
        assert!(text.contains("Handle: @founder"));
        assert!(text.contains("Deck: https://files.example/deck.pdf"));
        assert!(text.contains("Additional Materials: None"));
    }

    #[test]
    fn missing_handle_renders_as_dash() {
        let mut r = record();
        r.handle = None;
        assert!(format_notification(&r).contains("Handle: -"));
    }

    #[test]
    fn resume_view_names_the_submit_time() {
        let r = record();
        let text = format_resume_view(&r);
        assert!(text.contains("you submitted an application on"));
        assert!(text.contains("UTC"));
        assert!(text.contains("Wallet: 0x1185"));
    }
}
