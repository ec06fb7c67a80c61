//! Caller boundary of the settlement workflow.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;
use transport::SettlementTransport;

use crate::cancel::CancelHandle;
use crate::error::{ErrorKind, SettlementError, SubmitError};
use crate::intent::OrderIntent;
use crate::machine::{self, SettlementConfig, SettlementMachine};
use crate::outcome::SettlementOutcome;
use crate::progress::ProgressView;
use crate::reporter::{self, INTERRUPTED_MESSAGE, OutcomeReporter};

/// Runs settlements for one purchase surface, one at a time.
///
/// Owns the in-flight flag that keeps a second submission out while a
/// session runs, publishes a [`ProgressView`] on every phase change, and
/// reports each session's outcome exactly once.
pub struct Checkout<T, R> {
    transport: T,
    reporter: R,
    config: SettlementConfig,
    in_flight: AtomicBool,
    current: Mutex<Option<CancelHandle>>,
    progress: watch::Sender<ProgressView>,
}

impl<T, R> Checkout<T, R>
where
    T: SettlementTransport,
    R: OutcomeReporter,
{
    pub fn new(transport: T, reporter: R, config: SettlementConfig) -> Self {
        let (progress, _) = watch::channel(ProgressView::cleared());
        Self {
            transport,
            reporter,
            config,
            in_flight: AtomicBool::new(false),
            current: Mutex::new(None),
            progress,
        }
    }

    /// Subscribes to the display model of the running session.
    pub fn subscribe(&self) -> watch::Receiver<ProgressView> {
        self.progress.subscribe()
    }

    /// Returns the display model right now.
    pub fn progress(&self) -> ProgressView {
        *self.progress.borrow()
    }

    /// False while a session is running; the submit control should be disabled.
    pub fn can_submit(&self) -> bool {
        !self.in_flight.load(Ordering::Acquire)
    }

    /// Requests cancellation of the running session.
    ///
    /// Returns false if nothing is running or the charge was already issued.
    pub fn cancel(&self) -> bool {
        match lock(&self.current).as_ref() {
            Some(handle) => handle.cancel(),
            None => false,
        }
    }

    /// Validates the intent and runs a fresh session to completion.
    ///
    /// Fails only if another session is in flight; every other ending is an
    /// outcome, already reported to the reporter.
    #[tracing::instrument(
        skip_all,
        fields(
            buyer_id = %intent.buyer_id(),
            product_id = %intent.product_id(),
            quantity = intent.quantity(),
        )
    )]
    pub async fn submit(&self, intent: OrderIntent) -> Result<SettlementOutcome, SubmitError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("submission refused, settlement already in flight");
            return Err(SubmitError::InFlight);
        }
        let mut guard = ExitGuard {
            checkout: self,
            reported: false,
        };

        let mut machine = match SettlementMachine::new(&self.transport, intent, self.config.clone())
        {
            Ok(machine) => machine,
            Err(e) => {
                tracing::info!(error = %e, "order intent rejected");
                machine::record_failure(ErrorKind::Validation);
                let outcome = SettlementOutcome::Failed(SettlementError::Validation(e));
                guard.report(&outcome);
                return Ok(outcome);
            }
        };
        *lock(&self.current) = Some(machine.cancel_handle());

        let outcome = machine
            .run(|phase| {
                self.progress.send_replace(ProgressView::from_phase(phase));
            })
            .await;
        guard.report(&outcome);

        Ok(outcome)
    }
}

fn lock(current: &Mutex<Option<CancelHandle>>) -> MutexGuard<'_, Option<CancelHandle>> {
    current.lock().unwrap_or_else(|e| e.into_inner())
}

/// Cleans up the caller boundary on every exit path of `submit`.
///
/// Also covers a panic in the transport and the submit future being dropped
/// mid-flight: the session is then reported once as interrupted.
struct ExitGuard<'a, T, R: OutcomeReporter> {
    checkout: &'a Checkout<T, R>,
    reported: bool,
}

impl<T, R: OutcomeReporter> ExitGuard<'_, T, R> {
    fn report(&mut self, outcome: &SettlementOutcome) {
        if !self.reported {
            self.reported = true;
            reporter::report(&self.checkout.reporter, outcome);
        }
    }
}

impl<T, R: OutcomeReporter> Drop for ExitGuard<'_, T, R> {
    fn drop(&mut self) {
        if !self.reported {
            self.reported = true;
            tracing::warn!("settlement stopped before reaching a terminal phase");
            self.checkout.reporter.on_failure(INTERRUPTED_MESSAGE);
        }
        self.checkout.progress.send_replace(ProgressView::cleared());
        *lock(&self.checkout.current) = None;
        self.checkout.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{BuyerId, ProductId};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use rust_decimal::Decimal;
    use transport::InMemoryTransport;

    use crate::reporter::TracingReporter;

    #[test]
    fn test_rejected_intent_counts_as_validation_failure() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let checkout = Checkout::new(
            InMemoryTransport::new(),
            TracingReporter,
            SettlementConfig::default(),
        );
        let intent = OrderIntent::new(BuyerId::new(1), ProductId::new(42), 0, Some(Decimal::ONE));

        let outcome = metrics::with_local_recorder(&recorder, || {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
                .block_on(checkout.submit(intent))
                .unwrap()
        });

        assert_eq!(outcome.error_kind(), Some(ErrorKind::Validation));
        assert!(
            handle
                .render()
                .contains(r#"settlement_failed{kind="validation"} 1"#)
        );
        assert!(checkout.can_submit());
    }
}
