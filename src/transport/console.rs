// Console transport - a line-based harness for running the wizard locally

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::transport::{Inbound, InboundEvent, Outbound, OutboundSender, SendError};
use crate::wizard::dispatcher::Dispatcher;
use crate::wizard::session::UserId;

/// Prints outbound messages to stdout, buttons rendered as labels.
pub struct ConsoleSender;

#[async_trait]
impl OutboundSender for ConsoleSender {
    async fn send(&self, _user: UserId, message: Outbound) -> Result<(), SendError> {
        match message {
            Outbound::Prompt(text) | Outbound::Notice(text) => println!("{text}\n"),
            Outbound::PromptWithButtons { text, buttons } => {
                let labels: Vec<String> = buttons
                    .iter()
                    .map(|b| format!("[{}]", b.label()))
                    .collect();
                println!("{text}\n{}\n", labels.join(" "));
            }
        }
        Ok(())
    }
}

async fn parse_line(line: &str) -> Option<InboundEvent> {
    match line {
        "/start" => return Some(InboundEvent::CommandStart),
        _ => {}
    }
    let lower = line.to_ascii_lowercase();
    match lower.as_str() {
        "back" => return Some(InboundEvent::Back),
        "skip" => return Some(InboundEvent::Skip),
        "abort" => return Some(InboundEvent::Abort),
        "resubmit" => return Some(InboundEvent::Resubmit),
        "start" => return Some(InboundEvent::StartButton),
        _ => {}
    }
    if let Some(path) = line.strip_prefix("upload ") {
        let path = path.trim();
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let name = Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.to_string());
                return Some(InboundEvent::Document { name, bytes });
            }
            Err(e) => {
                warn!(path = %path, error = %e, "could not read upload");
                println!("(could not read {path}: {e})");
                return None;
            }
        }
    }
    Some(InboundEvent::Text(line.to_string()))
}

/// Read stdin line by line and feed the dispatcher until EOF.
///
/// Buttons are "pressed" by typing their label; `upload <path>` sends the
/// file at `path` as a document.
pub async fn run(
    dispatcher: Arc<Dispatcher>,
    user: UserId,
    handle: Option<String>,
) -> Result<()> {
    println!(
        "PitchDesk console. Send /start to begin, type a button label to press it, \
         'upload <path>' to send a document, Ctrl-D to exit.\n"
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(event) = parse_line(trimmed).await {
            dispatcher
                .dispatch(Inbound {
                    user,
                    handle: handle.clone(),
                    event,
                })
                .await;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn button_labels_parse_case_insensitively() {
        assert_eq!(parse_line("/start").await, Some(InboundEvent::CommandStart));
        assert_eq!(parse_line("Back").await, Some(InboundEvent::Back));
        assert_eq!(parse_line("SKIP").await, Some(InboundEvent::Skip));
        assert_eq!(parse_line("abort").await, Some(InboundEvent::Abort));
        assert_eq!(parse_line("Resubmit").await, Some(InboundEvent::Resubmit));
        assert_eq!(parse_line("Start").await, Some(InboundEvent::StartButton));
    }

    #[tokio::test]
    async fn everything_else_is_text() {
        assert_eq!(
            parse_line("https://github.com/founder").await,
            Some(InboundEvent::Text("https://github.com/founder".to_string()))
        );
    }
}
