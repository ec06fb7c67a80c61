//! Settlement phases.

use serde::{Deserialize, Serialize};

/// The discrete step a settlement session is in.
///
/// Phase transitions:
/// ```text
/// Idle ──► CreatingOrder ──► InitializingTransaction ──► AwaitingPaymentUi ──► ProcessingPayment ──► VerifyingPayment ──► Succeeded
///  │            │                    │                         │                       │                    │
///  │            ├────────────────────┼─────────────────────────┼───────────────────────┴────────────────────┴──► Failed
///  └────────────┴────────────────────┴─────────────────────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SettlementPhase {
    /// Session created, nothing issued yet.
    #[default]
    Idle,

    /// The order is being created.
    CreatingOrder,

    /// A transaction is being opened for the created order.
    InitializingTransaction,

    /// The payment sheet is shown; the charge has not been issued.
    AwaitingPaymentUi,

    /// The charge is in flight. Cancellation is no longer honored.
    ProcessingPayment,

    /// Asking the verifier whether the charge was approved.
    VerifyingPayment,

    /// Payment verified and approved (terminal state).
    Succeeded,

    /// A call failed or the payment was declined (terminal state).
    Failed,

    /// Cancelled by the caller before the charge (terminal state).
    Cancelled,
}

impl SettlementPhase {
    /// Position along the forward sequence.
    pub fn ordinal(&self) -> u8 {
        match self {
            SettlementPhase::Idle => 0,
            SettlementPhase::CreatingOrder => 1,
            SettlementPhase::InitializingTransaction => 2,
            SettlementPhase::AwaitingPaymentUi => 3,
            SettlementPhase::ProcessingPayment => 4,
            SettlementPhase::VerifyingPayment => 5,
            SettlementPhase::Succeeded | SettlementPhase::Failed | SettlementPhase::Cancelled => 6,
        }
    }

    /// Returns the next phase on the success path.
    pub fn next(&self) -> Option<SettlementPhase> {
        match self {
            SettlementPhase::Idle => Some(SettlementPhase::CreatingOrder),
            SettlementPhase::CreatingOrder => Some(SettlementPhase::InitializingTransaction),
            SettlementPhase::InitializingTransaction => Some(SettlementPhase::AwaitingPaymentUi),
            SettlementPhase::AwaitingPaymentUi => Some(SettlementPhase::ProcessingPayment),
            SettlementPhase::ProcessingPayment => Some(SettlementPhase::VerifyingPayment),
            SettlementPhase::VerifyingPayment => Some(SettlementPhase::Succeeded),
            SettlementPhase::Succeeded | SettlementPhase::Failed | SettlementPhase::Cancelled => {
                None
            }
        }
    }

    /// Returns true while the caller may still cancel (the charge has not been issued).
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            SettlementPhase::Idle
                | SettlementPhase::CreatingOrder
                | SettlementPhase::InitializingTransaction
                | SettlementPhase::AwaitingPaymentUi
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SettlementPhase::Succeeded | SettlementPhase::Failed | SettlementPhase::Cancelled
        )
    }

    /// Returns true if the session may move from `self` to `to`.
    pub fn can_advance_to(&self, to: SettlementPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        match to {
            SettlementPhase::Failed => *self != SettlementPhase::Idle,
            SettlementPhase::Cancelled => self.is_cancellable(),
            _ => self.next() == Some(to),
        }
    }

    /// Returns the phase name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementPhase::Idle => "Idle",
            SettlementPhase::CreatingOrder => "CreatingOrder",
            SettlementPhase::InitializingTransaction => "InitializingTransaction",
            SettlementPhase::AwaitingPaymentUi => "AwaitingPaymentUi",
            SettlementPhase::ProcessingPayment => "ProcessingPayment",
            SettlementPhase::VerifyingPayment => "VerifyingPayment",
            SettlementPhase::Succeeded => "Succeeded",
            SettlementPhase::Failed => "Failed",
            SettlementPhase::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for SettlementPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SettlementPhase; 9] = [
        SettlementPhase::Idle,
        SettlementPhase::CreatingOrder,
        SettlementPhase::InitializingTransaction,
        SettlementPhase::AwaitingPaymentUi,
        SettlementPhase::ProcessingPayment,
        SettlementPhase::VerifyingPayment,
        SettlementPhase::Succeeded,
        SettlementPhase::Failed,
        SettlementPhase::Cancelled,
    ];

    #[test]
    fn test_default_phase_is_idle() {
        assert_eq!(SettlementPhase::default(), SettlementPhase::Idle);
    }

    #[test]
    fn test_success_path_is_linear() {
        let mut phase = SettlementPhase::Idle;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            assert!(phase.can_advance_to(next));
            assert!(next.ordinal() > phase.ordinal());
            phase = next;
            seen.push(phase);
        }
        assert_eq!(phase, SettlementPhase::Succeeded);
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn test_no_skipping_transaction() {
        assert!(!SettlementPhase::CreatingOrder.can_advance_to(SettlementPhase::ProcessingPayment));
        assert!(!SettlementPhase::CreatingOrder.can_advance_to(SettlementPhase::AwaitingPaymentUi));
        assert!(!SettlementPhase::Idle.can_advance_to(SettlementPhase::Succeeded));
    }

    #[test]
    fn test_no_backward_moves() {
        assert!(!SettlementPhase::VerifyingPayment.can_advance_to(SettlementPhase::CreatingOrder));
        assert!(!SettlementPhase::AwaitingPaymentUi.can_advance_to(SettlementPhase::Idle));
    }

    #[test]
    fn test_terminal_phases_are_final() {
        for terminal in ALL.iter().filter(|p| p.is_terminal()) {
            for to in ALL {
                assert!(!terminal.can_advance_to(to), "{terminal} -> {to}");
            }
        }
    }

    #[test]
    fn test_cancellable_only_before_charge() {
        assert!(SettlementPhase::Idle.can_advance_to(SettlementPhase::Cancelled));
        assert!(SettlementPhase::AwaitingPaymentUi.can_advance_to(SettlementPhase::Cancelled));
        assert!(!SettlementPhase::ProcessingPayment.can_advance_to(SettlementPhase::Cancelled));
        assert!(!SettlementPhase::VerifyingPayment.can_advance_to(SettlementPhase::Cancelled));
    }

    #[test]
    fn test_failure_reachable_from_working_phases() {
        assert!(!SettlementPhase::Idle.can_advance_to(SettlementPhase::Failed));
        assert!(SettlementPhase::CreatingOrder.can_advance_to(SettlementPhase::Failed));
        assert!(SettlementPhase::VerifyingPayment.can_advance_to(SettlementPhase::Failed));
    }

    #[test]
    fn test_display() {
        assert_eq!(SettlementPhase::AwaitingPaymentUi.to_string(), "AwaitingPaymentUi");
        assert_eq!(SettlementPhase::Cancelled.to_string(), "Cancelled");
    }

    #[test]
    fn test_serialization() {
        let phase = SettlementPhase::ProcessingPayment;
        let json = serde_json::to_string(&phase).unwrap();
        let deserialized: SettlementPhase = serde_json::from_str(&json).unwrap();
        assert_eq!(phase, deserialized);
    }
}
