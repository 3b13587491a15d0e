// Navigation controller - the per-user wizard state machine
//
// Transition decisions are pure (`decide`), enrichment and commit are the
// effectful half (`apply`). The split keeps Back/Skip/Abort independently
// testable and gives the dispatcher a hook to emit a progress notice before
// slow enrichment work starts.

use std::sync::Arc;

use tracing::{info, warn};

use crate::transport::{Button, Outbound};
use crate::verify::balance::is_wallet_address;
use crate::verify::{BalanceSource, DocumentRelocator};
use crate::wizard::session::{SessionStatus, WizardSession};
use crate::wizard::steps::{EnrichKind, InputKind, StepRegistry, StepSpec};

/// Raw payload of an `Answer` event.
#[derive(Debug, Clone)]
pub enum RawAnswer {
    Text(String),
    Document { name: String, bytes: Vec<u8> },
}

/// Navigation events against an in-progress session.
#[derive(Debug, Clone)]
pub enum NavEvent {
    Answer(RawAnswer),
    Skip,
    Back,
    Abort,
}

/// Wallet gating policy for the balance-verification step.
#[derive(Debug, Clone)]
pub struct WalletPolicy {
    /// Minimum balance in whole tokens.
    pub min_tokens: u64,
    pub symbol: String,
}

impl Default for WalletPolicy {
    fn default() -> Self {
        Self {
            min_tokens: 10,
            symbol: "PITCH".to_string(),
        }
    }
}

/// What `decide` concluded for one event. Owns everything `apply` needs.
#[derive(Debug)]
pub enum Plan {
    /// No state change; show a notice, optionally re-emit the step prompt.
    Reject { notice: String, reprompt: bool },
    /// Append `answer` and advance.
    Record { answer: String },
    /// Relocate the document, then record the public link.
    RelocateThenRecord { name: String, bytes: Vec<u8> },
    /// Verify the balance of `address`, then record the address.
    VerifyBalanceThenRecord { address: String },
    StepBack,
    AbortSession,
}

impl Plan {
    /// Notice worth delivering before slow enrichment work begins.
    pub fn progress_notice(&self) -> Option<Outbound> {
        match self {
            Plan::RelocateThenRecord { .. } => Some(Outbound::notice(
                "We are processing the file, please wait...",
            )),
            _ => None,
        }
    }
}

/// Where the session ended up after a plan was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    InProgress,
    /// All steps answered; hand off to the submission finalizer.
    ReadyToFinalize,
    Aborted,
}

#[derive(Debug)]
pub struct Applied {
    pub replies: Vec<Outbound>,
    pub disposition: Disposition,
}

pub struct NavigationController {
    registry: StepRegistry,
    relocator: Arc<dyn DocumentRelocator>,
    balance: Arc<dyn BalanceSource>,
    wallet: WalletPolicy,
}

impl NavigationController {
    pub fn new(
        registry: StepRegistry,
        relocator: Arc<dyn DocumentRelocator>,
        balance: Arc<dyn BalanceSource>,
        wallet: WalletPolicy,
    ) -> Self {
        Self {
            registry,
            relocator,
            balance,
            wallet,
        }
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Pure transition decision for one event against an in-progress
    /// session. Callers must not feed events to completed or aborted
    /// sessions; those are the finalizer's and dispatcher's business.
    pub fn decide(&self, session: &WizardSession, event: NavEvent) -> Plan {
        debug_assert_eq!(session.status(), SessionStatus::InProgress);
        debug_assert!(session.cursor() < self.registry.count());
        let step = self.registry.step_at(session.cursor());

        match event {
            NavEvent::Answer(raw) => match validate(step, raw) {
                Err(notice) => Plan::Reject {
                    notice,
                    reprompt: true,
                },
                Ok(valid) => match (step.enrich, valid) {
                    (EnrichKind::RelocateDocument, Validated::Document { name, bytes }) => {
                        Plan::RelocateThenRecord { name, bytes }
                    }
                    (EnrichKind::VerifyWalletBalance, Validated::Text(address)) => {
                        Plan::VerifyBalanceThenRecord { address }
                    }
                    (_, Validated::Text(answer)) => Plan::Record { answer },
                    // A File step without relocation is not in the registry;
                    // store the name if one ever appears.
                    (_, Validated::Document { name, .. }) => Plan::Record { answer: name },
                },
            },
            NavEvent::Skip => {
                if step.skippable {
                    Plan::Record {
                        answer: step.skip_placeholder.to_string(),
                    }
                } else {
                    Plan::Reject {
                        notice: "This question cannot be skipped.".to_string(),
                        reprompt: false,
                    }
                }
            }
            NavEvent::Back => {
                if session.cursor() == 0 {
                    Plan::Reject {
                        notice: "You are already at the first question.".to_string(),
                        reprompt: false,
                    }
                } else {
                    Plan::StepBack
                }
            }
            NavEvent::Abort => Plan::AbortSession,
        }
    }

    /// Apply a plan: run enrichment if any, mutate the session, produce
    /// outbound replies. Enrichment failures are recovered locally as
    /// notices; nothing here is fatal.
    pub async fn apply(&self, session: &mut WizardSession, plan: Plan) -> Applied {
        match plan {
            Plan::Reject { notice, reprompt } => {
                let mut replies = vec![Outbound::notice(notice)];
                if reprompt {
                    replies.push(self.prompt_for(session.cursor()));
                }
                Applied {
                    replies,
                    disposition: Disposition::InProgress,
                }
            }
            Plan::Record { answer } => self.commit(session, answer),
            Plan::RelocateThenRecord { name, bytes } => {
                match self.relocator.relocate(bytes, &name).await {
                    Ok(file) => self.commit(session, file.url),
                    Err(error) => {
                        warn!(
                            user = %session.user_id,
                            step = session.cursor(),
                            %error,
                            "document relocation failed"
                        );
                        Applied {
                            replies: vec![Outbound::notice(
                                "We could not process the file. Please try uploading it again.",
                            )],
                            disposition: Disposition::InProgress,
                        }
                    }
                }
            }
            Plan::VerifyBalanceThenRecord { address } => {
                match self.balance.balance_of(&address).await {
                    Ok(amount) => {
                        if amount.raw >= amount.whole_tokens_raw(self.wallet.min_tokens) {
                            self.commit(session, address)
                        } else {
                            info!(
                                user = %session.user_id,
                                balance = %amount,
                                required = self.wallet.min_tokens,
                                "wallet below required balance"
                            );
                            Applied {
                                replies: vec![Outbound::notice(format!(
                                    "Insufficient {} balance: minimum {} required, current \
                                     balance {}. Please try another wallet.",
                                    self.wallet.symbol, self.wallet.min_tokens, amount
                                ))],
                                disposition: Disposition::InProgress,
                            }
                        }
                    }
                    Err(error) => {
                        warn!(user = %session.user_id, %error, "balance lookup failed");
                        Applied {
                            replies: vec![Outbound::notice(
                                "Error checking balance. Please try again.",
                            )],
                            disposition: Disposition::InProgress,
                        }
                    }
                }
            }
            Plan::StepBack => {
                let undone = session.step_back();
                debug_assert!(undone.is_some());
                info!(
                    user = %session.user_id,
                    step = session.cursor(),
                    "stepped back"
                );
                Applied {
                    replies: vec![self.prompt_for(session.cursor())],
                    disposition: Disposition::InProgress,
                }
            }
            Plan::AbortSession => {
                session.mark_aborted();
                info!(user = %session.user_id, "session aborted");
                Applied {
                    replies: vec![Outbound::notice(
                        "You aborted the submission. You can always restart by sending /start.",
                    )],
                    disposition: Disposition::Aborted,
                }
            }
        }
    }

    /// Decide and apply in one go.
    pub async fn handle(&self, session: &mut WizardSession, event: NavEvent) -> Applied {
        let plan = self.decide(session, event);
        self.apply(session, plan).await
    }

    fn commit(&self, session: &mut WizardSession, answer: String) -> Applied {
        session.record_answer(answer);
        if session.cursor() == self.registry.count() {
            session.mark_completed();
            info!(user = %session.user_id, "all steps answered");
            Applied {
                replies: Vec::new(),
                disposition: Disposition::ReadyToFinalize,
            }
        } else {
            info!(
                user = %session.user_id,
                step = session.cursor(),
                "advanced to next step"
            );
            Applied {
                replies: vec![self.prompt_for(session.cursor())],
                disposition: Disposition::InProgress,
            }
        }
    }

    /// Prompt for step `index` with its buttons, derived from the state
    /// machine alone: Back whenever there is a step behind, Skip whenever
    /// the step allows it, Abort always.
    pub fn prompt_for(&self, index: usize) -> Outbound {
        let mut buttons = Vec::new();
        if index > 0 {
            buttons.push(Button::Back);
        }
        if self.registry.step_at(index).skippable {
            buttons.push(Button::Skip);
        }
        buttons.push(Button::Abort);
        Outbound::with_buttons(self.prompt_text(index), buttons)
    }

    fn prompt_text(&self, index: usize) -> String {
        self.registry
            .step_at(index)
            .prompt
            .replace("{min}", &self.wallet.min_tokens.to_string())
            .replace("{symbol}", &self.wallet.symbol)
    }
}

enum Validated {
    Text(String),
    Document { name: String, bytes: Vec<u8> },
}

fn validate(step: &StepSpec, raw: RawAnswer) -> Result<Validated, String> {
    match (step.input, raw) {
        (InputKind::File, RawAnswer::Document { name, bytes }) => {
            if name.to_ascii_lowercase().ends_with(".pdf") {
                Ok(Validated::Document { name, bytes })
            } else {
                Err("Please upload a PDF file.".to_string())
            }
        }
        (InputKind::File, RawAnswer::Text(_)) => Err("Please upload a PDF file.".to_string()),
        (InputKind::FreeText, RawAnswer::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Err("Please answer with a text message.".to_string())
            } else {
                Ok(Validated::Text(trimmed.to_string()))
            }
        }
        (InputKind::FreeText, RawAnswer::Document { .. }) => {
            Err("Please answer with a text message.".to_string())
        }
        (InputKind::WalletAddress, RawAnswer::Text(text)) => {
            let trimmed = text.trim();
            if is_wallet_address(trimmed) {
                Ok(Validated::Text(trimmed.to_string()))
            } else {
                Err("Please provide a valid wallet address.".to_string())
            }
        }
        (InputKind::WalletAddress, RawAnswer::Document { .. }) => {
            Err("Please provide a valid wallet address.".to_string())
        }
    }
}
