//! Display model derived from the settlement phase.

use crate::phase::SettlementPhase;

/// The four caller-visible milestones, in order.
pub const STEP_LABELS: [&str; 4] = [
    "Create Order",
    "Initialize Transaction",
    "Process Payment",
    "Verify Payment",
];

/// What a UI should show for the current phase.
///
/// Always recomputed from the phase; holds no state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressView {
    /// Index into [`STEP_LABELS`]. `None` while the stepper is hidden.
    pub active_step: Option<usize>,
    /// A settlement is running.
    pub loading: bool,
    /// The payment sheet is on screen.
    pub showing_payment_sheet: bool,
    /// The charge is in flight behind the payment sheet.
    pub processing: bool,
}

impl ProgressView {
    /// Maps a phase to its display model.
    pub fn from_phase(phase: SettlementPhase) -> Self {
        let (active_step, showing_payment_sheet, processing) = match phase {
            SettlementPhase::Idle
            | SettlementPhase::Succeeded
            | SettlementPhase::Failed
            | SettlementPhase::Cancelled => return Self::cleared(),
            SettlementPhase::CreatingOrder => (0, false, false),
            SettlementPhase::InitializingTransaction => (1, false, false),
            SettlementPhase::AwaitingPaymentUi => (2, true, false),
            SettlementPhase::ProcessingPayment => (2, true, true),
            SettlementPhase::VerifyingPayment => (3, false, false),
        };

        Self {
            active_step: Some(active_step),
            loading: true,
            showing_payment_sheet,
            processing,
        }
    }

    /// The view with every transient flag off.
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Label of the active milestone.
    pub fn step_label(&self) -> Option<&'static str> {
        self.active_step.and_then(|i| STEP_LABELS.get(i).copied())
    }

    /// Caption shown on the payment sheet.
    pub fn payment_sheet_caption(&self) -> Option<&'static str> {
        match (self.showing_payment_sheet, self.processing) {
            (true, true) => Some("Processing payment..."),
            (true, false) => Some("Confirming your payment..."),
            (false, _) => None,
        }
    }
}

impl From<SettlementPhase> for ProgressView {
    fn from(phase: SettlementPhase) -> Self {
        Self::from_phase(phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_working_phases_map_to_milestones() {
        let steps: Vec<_> = [
            SettlementPhase::CreatingOrder,
            SettlementPhase::InitializingTransaction,
            SettlementPhase::AwaitingPaymentUi,
            SettlementPhase::ProcessingPayment,
            SettlementPhase::VerifyingPayment,
        ]
        .into_iter()
        .map(|p| ProgressView::from_phase(p).step_label())
        .collect();

        assert_eq!(
            steps,
            vec![
                Some("Create Order"),
                Some("Initialize Transaction"),
                Some("Process Payment"),
                Some("Process Payment"),
                Some("Verify Payment"),
            ]
        );
    }

    #[test]
    fn test_payment_sheet_only_around_charge() {
        let awaiting = ProgressView::from_phase(SettlementPhase::AwaitingPaymentUi);
        assert!(awaiting.showing_payment_sheet);
        assert!(!awaiting.processing);
        assert_eq!(
            awaiting.payment_sheet_caption(),
            Some("Confirming your payment...")
        );

        let processing = ProgressView::from_phase(SettlementPhase::ProcessingPayment);
        assert!(processing.showing_payment_sheet);
        assert!(processing.processing);
        assert_eq!(
            processing.payment_sheet_caption(),
            Some("Processing payment...")
        );

        let verifying = ProgressView::from_phase(SettlementPhase::VerifyingPayment);
        assert!(!verifying.showing_payment_sheet);
        assert!(verifying.payment_sheet_caption().is_none());
    }

    #[test]
    fn test_idle_and_terminal_phases_clear_everything() {
        for phase in [
            SettlementPhase::Idle,
            SettlementPhase::Succeeded,
            SettlementPhase::Failed,
            SettlementPhase::Cancelled,
        ] {
            assert_eq!(ProgressView::from(phase), ProgressView::cleared());
        }
        assert!(!ProgressView::cleared().loading);
    }
}
