//! Order settlement workflow.
//!
//! Drives a purchase intent across three independently failing backend
//! services, one step at a time:
//! 1. Create order
//! 2. Initialize transaction
//! 3. Process payment (after the payment sheet is shown)
//! 4. Verify payment
//!
//! There is no compensation: a failure after the order or transaction was
//! created leaves those records for the backend to reconcile. No step is
//! retried; retrying means submitting a new intent.

pub mod cancel;
pub mod checkout;
pub mod error;
pub mod intent;
pub mod machine;
pub mod outcome;
pub mod phase;
pub mod progress;
pub mod reporter;
pub mod session;

pub use cancel::CancelHandle;
pub use checkout::Checkout;
pub use error::{DECLINED_MESSAGE, ErrorKind, SettlementError, SubmitError, ValidationError};
pub use intent::{OrderIntent, coerce_quantity};
pub use machine::{SettlementConfig, SettlementMachine, Step};
pub use outcome::SettlementOutcome;
pub use phase::SettlementPhase;
pub use progress::{ProgressView, STEP_LABELS};
pub use reporter::{INTERRUPTED_MESSAGE, OutcomeReporter, TracingReporter};
pub use session::{Captured, PhaseTransition, SettlementSession, SettlementState};
