// Transport boundary - inbound event and outbound message model
//
// The chat transport itself (delivery, retries, webhooks) is an external
// collaborator; the engine only consumes tagged inbound events and hands
// outbound messages to an `OutboundSender`.

pub mod console;

use async_trait::async_trait;
use thiserror::Error;

use crate::wizard::session::UserId;

/// One event from the chat transport, tagged with its sender.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub user: UserId,
    /// Chat handle, when the transport knows one.
    pub handle: Option<String>,
    pub event: InboundEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// The `/start` command.
    CommandStart,
    Text(String),
    Document { name: String, bytes: Vec<u8> },
    /// Button actions.
    Back,
    Skip,
    Abort,
    Resubmit,
    StartButton,
}

/// Inline button attached to a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Start,
    Back,
    Skip,
    Abort,
    Resubmit,
}

impl Button {
    pub fn label(&self) -> &'static str {
        match self {
            Button::Start => "Start",
            Button::Back => "Back",
            Button::Skip => "Skip",
            Button::Abort => "Abort",
            Button::Resubmit => "Resubmit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Prompt(String),
    PromptWithButtons { text: String, buttons: Vec<Button> },
    Notice(String),
}

impl Outbound {
    pub fn with_buttons(text: impl Into<String>, buttons: Vec<Button>) -> Self {
        Outbound::PromptWithButtons {
            text: text.into(),
            buttons,
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Outbound::Notice(text.into())
    }
}

#[derive(Debug, Error)]
#[error("transport send failed: {0}")]
pub struct SendError(pub String);

/// Delivers outbound messages to a user. Delivery failures are the
/// transport's concern; the dispatcher logs them and moves on.
#[async_trait]
pub trait OutboundSender: Send + Sync {
    async fn send(&self, user: UserId, message: Outbound) -> Result<(), SendError>;
}
