// Event dispatcher - per-user serialization and session entry handling
//
// One inbound event is processed at a time per user: the lane lock is held
// across enrichment and finalization, so a Back or Abort arriving while an
// Answer is still verifying waits for that Answer to commit. Different
// users' lanes are independent.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, info_span, Instrument};

use crate::store::SessionStore;
use crate::submit::{format_resume_view, SubmissionFinalizer, THANK_YOU};
use crate::telemetry::generate_correlation_id;
use crate::transport::{Button, Inbound, InboundEvent, Outbound, OutboundSender};
use crate::wizard::engine::{Disposition, NavEvent, NavigationController, RawAnswer};
use crate::wizard::session::{SessionStatus, UserId, WizardSession};

const START_NUDGE: &str = "Send /start or tap the Start button to get started.";
const FLUSH_FAILURE: &str =
    "We could not save your submission just now. Please try again in a moment.";

pub struct Dispatcher {
    engine: NavigationController,
    store: Arc<SessionStore>,
    finalizer: SubmissionFinalizer,
    sender: Arc<dyn OutboundSender>,
    lanes: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl Dispatcher {
    pub fn new(
        engine: NavigationController,
        store: Arc<SessionStore>,
        finalizer: SubmissionFinalizer,
        sender: Arc<dyn OutboundSender>,
    ) -> Self {
        Self {
            engine,
            store,
            finalizer,
            sender,
            lanes: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one inbound event, serialized FIFO per user.
    pub async fn dispatch(&self, inbound: Inbound) {
        let lane = self.lane(inbound.user).await;
        let _guard = lane.lock().await;
        let span = info_span!(
            "dispatch",
            user = %inbound.user,
            correlation = %generate_correlation_id(),
        );
        self.process(inbound).instrument(span).await;
    }

    async fn lane(&self, user: UserId) -> Arc<Mutex<()>> {
        let mut lanes = self.lanes.lock().await;
        lanes
            .entry(user)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn process(&self, inbound: Inbound) {
        let Inbound {
            user,
            handle,
            event,
        } = inbound;
        match event {
            InboundEvent::CommandStart | InboundEvent::StartButton => {
                self.enter(user, handle).await;
            }
            InboundEvent::Resubmit => self.resubmit(user, handle).await,
            InboundEvent::Text(text) => {
                self.navigate(user, handle, NavEvent::Answer(RawAnswer::Text(text)))
                    .await;
            }
            InboundEvent::Document { name, bytes } => {
                self.navigate(
                    user,
                    handle,
                    NavEvent::Answer(RawAnswer::Document { name, bytes }),
                )
                .await;
            }
            InboundEvent::Back => self.navigate(user, handle, NavEvent::Back).await,
            InboundEvent::Skip => self.navigate(user, handle, NavEvent::Skip).await,
            InboundEvent::Abort => self.navigate(user, handle, NavEvent::Abort).await,
        }
    }

    /// Session entry: a prior terminal record is offered for resubmission
    /// instead of restarting; otherwise a fresh session begins at step 0.
    async fn enter(&self, user: UserId, handle: Option<String>) {
        if let Some(session) = self.store.session(user) {
            if session.status() == SessionStatus::Completed {
                // unflushed from an earlier failure; retry before anything else
                self.retry_flush(user, session).await;
                return;
            }
        }

        if let Some(record) = self.store.record(user).await {
            info!(user = %user, "returning user, offering resubmission");
            self.send(
                user,
                Outbound::with_buttons(format_resume_view(&record), vec![Button::Resubmit]),
            )
            .await;
            return;
        }

        self.fresh_session(user, handle).await;
    }

    /// Resubmit discards any stale session and starts over; the stored
    /// record stays until the new submission overwrites it.
    async fn resubmit(&self, user: UserId, handle: Option<String>) {
        self.store.remove_session(user);
        info!(user = %user, "resubmission started");
        self.fresh_session(user, handle).await;
    }

    async fn fresh_session(&self, user: UserId, handle: Option<String>) {
        let session = WizardSession::new(user, handle);
        self.store.put_session(session);
        info!(user = %user, "session entered at step 0");
        self.send(user, self.engine.prompt_for(0)).await;
    }

    async fn navigate(&self, user: UserId, handle: Option<String>, event: NavEvent) {
        let Some(mut session) = self.store.session(user) else {
            self.send(
                user,
                Outbound::with_buttons(START_NUDGE, vec![Button::Start]),
            )
            .await;
            return;
        };

        if session.status() == SessionStatus::Completed {
            self.retry_flush(user, session).await;
            return;
        }

        if handle.is_some() {
            session.handle = handle;
        }

        let plan = self.engine.decide(&session, event);
        if let Some(notice) = plan.progress_notice() {
            self.send(user, notice).await;
        }
        let applied = self.engine.apply(&mut session, plan).await;
        for reply in applied.replies {
            self.send(user, reply).await;
        }

        match applied.disposition {
            Disposition::InProgress => self.store.put_session(session),
            Disposition::ReadyToFinalize => self.finalize(user, session).await,
            Disposition::Aborted => self.store.remove_session(user),
        }
    }

    /// Record write precedes session discard; a failure keeps the session
    /// completed-but-unflushed so any later event retries the write.
    async fn finalize(&self, user: UserId, session: WizardSession) {
        match self.finalizer.finalize(&session).await {
            Ok(_) => {
                self.store.remove_session(user);
                self.send(user, Outbound::notice(THANK_YOU)).await;
            }
            Err(error) => {
                error!(user = %user, %error, "terminal record write failed");
                self.store.put_session(session);
                self.send(user, Outbound::notice(FLUSH_FAILURE)).await;
            }
        }
    }

    async fn retry_flush(&self, user: UserId, session: WizardSession) {
        info!(user = %user, "retrying unflushed submission");
        self.finalize(user, session).await;
    }

    async fn send(&self, user: UserId, message: Outbound) {
        if let Err(error) = self.sender.send(user, message).await {
            // delivery is the transport's concern; log and move on
            error!(user = %user, %error, "outbound delivery failed");
        }
    }
}
