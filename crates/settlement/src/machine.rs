//! Settlement state machine.

use std::time::Duration;

use transport::SettlementTransport;

use crate::cancel::CancelHandle;
use crate::error::{ErrorKind, SettlementError, ValidationError};
use crate::intent::OrderIntent;
use crate::outcome::SettlementOutcome;
use crate::phase::SettlementPhase;
use crate::session::{SettlementSession, SettlementState};

/// Tunables of the settlement workflow.
#[derive(Debug, Clone, Default)]
pub struct SettlementConfig {
    /// How long the payment sheet stays up before the charge is issued.
    pub payment_sheet_dwell: Duration,
}

/// Result of a single [`SettlementMachine::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The session moved to a new, non-terminal phase.
    Advanced(SettlementPhase),
    /// The session is terminal.
    Finished(SettlementOutcome),
}

/// Drives one settlement session through the transport.
///
/// Each [`step`](Self::step) performs exactly one transition. Calls are
/// strictly sequential since each one needs the id the previous produced.
/// Cancellation is checked before every call up to the charge point; once
/// the charge is issued the session runs through verification.
pub struct SettlementMachine<'a, T: ?Sized> {
    transport: &'a T,
    session: SettlementSession,
    config: SettlementConfig,
}

impl<'a, T> SettlementMachine<'a, T>
where
    T: SettlementTransport + ?Sized,
{
    /// Validates the intent and creates an idle session for it.
    ///
    /// An invalid intent never produces a session.
    pub fn new(
        transport: &'a T,
        intent: OrderIntent,
        config: SettlementConfig,
    ) -> Result<Self, ValidationError> {
        let request = intent.validate()?;
        let session = SettlementSession::new(intent, request);
        metrics::counter!("settlement_sessions_total").increment(1);

        Ok(Self {
            transport,
            session,
            config,
        })
    }

    pub fn session(&self) -> &SettlementSession {
        &self.session
    }

    pub fn phase(&self) -> SettlementPhase {
        self.session.phase()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.session.cancel_handle()
    }

    /// Performs one transition.
    ///
    /// After a terminal phase this returns the same outcome and touches nothing.
    pub async fn step(&mut self) -> Step {
        if let Some(outcome) = self.session.outcome() {
            return Step::Finished(outcome);
        }

        let next = self.next_state().await;
        let entered = self.session.enter(next);
        debug_assert!(entered, "settlement machine produced an illegal transition");

        match self.session.outcome() {
            Some(outcome) => {
                self.record_terminal(&outcome);
                Step::Finished(outcome)
            }
            None => Step::Advanced(self.session.phase()),
        }
    }

    /// Steps until the session is terminal, reporting every phase entered.
    #[tracing::instrument(
        skip_all,
        fields(
            session_id = %self.session.id(),
            buyer_id = %self.session.intent().buyer_id(),
            product_id = %self.session.intent().product_id(),
        )
    )]
    pub async fn run<F>(&mut self, mut on_phase: F) -> SettlementOutcome
    where
        F: FnMut(SettlementPhase),
    {
        loop {
            match self.step().await {
                Step::Advanced(phase) => on_phase(phase),
                Step::Finished(outcome) => {
                    on_phase(self.session.phase());
                    return outcome;
                }
            }
        }
    }

    /// Computes the state the current one leads to, issuing at most one call.
    async fn next_state(&self) -> SettlementState {
        let state = self.session.state();
        let cancel = self.session.cancel_handle();

        match *state {
            SettlementState::Idle => {
                if cancel.is_cancelled() {
                    return state.cancel();
                }
                SettlementState::CreatingOrder
            }
            SettlementState::CreatingOrder => {
                if cancel.is_cancelled() {
                    return state.cancel();
                }
                match self.transport.create_order(self.session.request()).await {
                    Ok(order) => SettlementState::InitializingTransaction { order_id: order.id },
                    Err(e) => state.fail(e),
                }
            }
            SettlementState::InitializingTransaction { order_id } => {
                if cancel.is_cancelled() {
                    return state.cancel();
                }
                match self.transport.create_transaction(order_id).await {
                    Ok(tx) => SettlementState::AwaitingPaymentUi {
                        order_id,
                        transaction_id: tx.id,
                    },
                    Err(e) => state.fail(e),
                }
            }
            SettlementState::AwaitingPaymentUi {
                order_id,
                transaction_id,
            } => {
                if !self.config.payment_sheet_dwell.is_zero() {
                    tokio::time::sleep(self.config.payment_sheet_dwell).await;
                }
                if !cancel.begin_charge() {
                    return state.cancel();
                }
                SettlementState::ProcessingPayment {
                    order_id,
                    transaction_id,
                }
            }
            SettlementState::ProcessingPayment {
                order_id,
                transaction_id,
            } => match self.transport.process_payment(transaction_id).await {
                Ok(_) => SettlementState::VerifyingPayment {
                    order_id,
                    transaction_id,
                },
                Err(e) => state.fail(e),
            },
            SettlementState::VerifyingPayment {
                order_id,
                transaction_id,
            } => match self.transport.verify_payment(transaction_id).await {
                Ok(verification) if verification.approved => SettlementState::Succeeded {
                    order_id,
                    transaction_id,
                },
                Ok(_) => state.fail(SettlementError::Declined { transaction_id }),
                Err(e) => state.fail(e),
            },
            SettlementState::Succeeded { .. }
            | SettlementState::Failed { .. }
            | SettlementState::Cancelled { .. } => state.clone(),
        }
    }

    fn record_terminal(&self, outcome: &SettlementOutcome) {
        let session_id = self.session.id();
        let duration = self
            .session
            .elapsed()
            .to_std()
            .unwrap_or_default()
            .as_secs_f64();
        metrics::histogram!("settlement_duration_seconds").record(duration);

        match outcome {
            SettlementOutcome::Succeeded { order_id } => {
                metrics::counter!("settlement_succeeded").increment(1);
                tracing::info!(%session_id, %order_id, duration, "settlement succeeded");
            }
            SettlementOutcome::Failed(err) => {
                record_failure(err.kind());
                tracing::warn!(
                    %session_id,
                    kind = %err.kind(),
                    error = %err,
                    order_id = ?self.session.order_id(),
                    transaction_id = ?self.session.transaction_id(),
                    "settlement failed"
                );
            }
            SettlementOutcome::Cancelled => {
                metrics::counter!("settlement_cancelled").increment(1);
                tracing::warn!(
                    %session_id,
                    order_id = ?self.session.order_id(),
                    "settlement cancelled"
                );
            }
        }
    }
}

/// Counts a failed settlement under its error kind.
pub(crate) fn record_failure(kind: ErrorKind) {
    metrics::counter!("settlement_failed", "kind" => kind.as_str()).increment(1);
}
