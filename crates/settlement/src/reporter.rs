//! Outcome reporting to the caller.

use std::sync::Arc;

use common::OrderId;

use crate::outcome::SettlementOutcome;

/// Reported when a session stops without reaching a terminal phase.
pub const INTERRUPTED_MESSAGE: &str = "Settlement was interrupted";

/// Receives the single terminal notification of each session.
pub trait OutcomeReporter: Send + Sync {
    /// The purchase went through; the caller should refresh its order list.
    fn on_success(&self, order_id: OrderId);

    /// The purchase failed with a user-facing message.
    fn on_failure(&self, message: &str);

    /// The caller cancelled. Nothing is shown to the user by default.
    fn on_cancelled(&self) {}
}

impl<R: OutcomeReporter + ?Sized> OutcomeReporter for Arc<R> {
    fn on_success(&self, order_id: OrderId) {
        (**self).on_success(order_id)
    }

    fn on_failure(&self, message: &str) {
        (**self).on_failure(message)
    }

    fn on_cancelled(&self) {
        (**self).on_cancelled()
    }
}

/// Dispatches an outcome to the matching reporter callback.
pub fn report<R: OutcomeReporter + ?Sized>(reporter: &R, outcome: &SettlementOutcome) {
    match outcome {
        SettlementOutcome::Succeeded { order_id } => reporter.on_success(*order_id),
        SettlementOutcome::Failed(err) => reporter.on_failure(&err.to_string()),
        SettlementOutcome::Cancelled => reporter.on_cancelled(),
    }
}

/// Reporter that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl OutcomeReporter for TracingReporter {
    fn on_success(&self, order_id: OrderId) {
        tracing::info!(%order_id, "order placed");
    }

    fn on_failure(&self, message: &str) {
        tracing::warn!(message, "order failed");
    }

    fn on_cancelled(&self) {
        tracing::info!("order cancelled");
    }
}
