pub mod dispatcher;
pub mod engine;
pub mod session;
pub mod steps;

pub use dispatcher::Dispatcher;
pub use engine::{Disposition, NavEvent, NavigationController, RawAnswer, WalletPolicy};
pub use session::{SessionStatus, SubmissionRecord, UserId, WizardSession};
pub use steps::{EnrichKind, InputKind, StepRegistry, StepSpec};
