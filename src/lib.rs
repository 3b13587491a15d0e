// PitchDesk Library - Application Intake Wizard
// This exposes the core components for testing and integration

pub mod config;
pub mod store;
pub mod submit;
pub mod telemetry;
pub mod transport;
pub mod verify;
pub mod wizard;

// Re-export key types for easy access
pub use config::PitchdeskConfig;
pub use store::{SessionStore, StoreError};
pub use submit::{
    format_notification, format_resume_view, LogNotificationSink, NotificationSink, NotifyError,
    SubmissionFinalizer, THANK_YOU,
};
pub use telemetry::{generate_correlation_id, init_telemetry};
pub use transport::{Button, Inbound, InboundEvent, Outbound, OutboundSender, SendError};
pub use verify::{
    BalanceError, BalanceSource, DocumentRelocator, DriveRelocator, EvmBalanceSource, PublicFile,
    RelocateError, TokenAmount,
};
pub use wizard::{
    Dispatcher, Disposition, EnrichKind, InputKind, NavEvent, NavigationController, RawAnswer,
    SessionStatus, StepRegistry, StepSpec, SubmissionRecord, UserId, WalletPolicy, WizardSession,
};
