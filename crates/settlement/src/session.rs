//! Settlement session: the workflow's only mutable entity.

use chrono::{DateTime, Utc};
use common::{OrderId, SessionId, TransactionId};
use serde::{Deserialize, Serialize};
use transport::CreateOrderRequest;

use crate::cancel::CancelHandle;
use crate::error::SettlementError;
use crate::intent::OrderIntent;
use crate::outcome::SettlementOutcome;
use crate::phase::SettlementPhase;

/// The session state, tagged by phase and carrying what each phase has captured.
///
/// A transaction id only ever appears next to the order id it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementState {
    Idle,
    CreatingOrder,
    InitializingTransaction {
        order_id: OrderId,
    },
    AwaitingPaymentUi {
        order_id: OrderId,
        transaction_id: TransactionId,
    },
    ProcessingPayment {
        order_id: OrderId,
        transaction_id: TransactionId,
    },
    VerifyingPayment {
        order_id: OrderId,
        transaction_id: TransactionId,
    },
    Succeeded {
        order_id: OrderId,
        transaction_id: TransactionId,
    },
    Failed {
        captured: Captured,
        error: SettlementError,
    },
    Cancelled {
        captured: Captured,
    },
}

/// Identifiers captured before a session stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Captured {
    #[default]
    Nothing,
    Order(OrderId),
    OrderAndTransaction(OrderId, TransactionId),
}

impl Captured {
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            Captured::Nothing => None,
            Captured::Order(order_id) | Captured::OrderAndTransaction(order_id, _) => {
                Some(*order_id)
            }
        }
    }

    pub fn transaction_id(&self) -> Option<TransactionId> {
        match self {
            Captured::OrderAndTransaction(_, transaction_id) => Some(*transaction_id),
            _ => None,
        }
    }
}

impl SettlementState {
    /// Returns the plain phase of this state.
    pub fn phase(&self) -> SettlementPhase {
        match self {
            SettlementState::Idle => SettlementPhase::Idle,
            SettlementState::CreatingOrder => SettlementPhase::CreatingOrder,
            SettlementState::InitializingTransaction { .. } => {
                SettlementPhase::InitializingTransaction
            }
            SettlementState::AwaitingPaymentUi { .. } => SettlementPhase::AwaitingPaymentUi,
            SettlementState::ProcessingPayment { .. } => SettlementPhase::ProcessingPayment,
            SettlementState::VerifyingPayment { .. } => SettlementPhase::VerifyingPayment,
            SettlementState::Succeeded { .. } => SettlementPhase::Succeeded,
            SettlementState::Failed { .. } => SettlementPhase::Failed,
            SettlementState::Cancelled { .. } => SettlementPhase::Cancelled,
        }
    }

    /// Returns the identifiers captured so far.
    pub fn captured(&self) -> Captured {
        match self {
            SettlementState::Idle | SettlementState::CreatingOrder => Captured::Nothing,
            SettlementState::InitializingTransaction { order_id } => Captured::Order(*order_id),
            SettlementState::AwaitingPaymentUi {
                order_id,
                transaction_id,
            }
            | SettlementState::ProcessingPayment {
                order_id,
                transaction_id,
            }
            | SettlementState::VerifyingPayment {
                order_id,
                transaction_id,
            }
            | SettlementState::Succeeded {
                order_id,
                transaction_id,
            } => Captured::OrderAndTransaction(*order_id, *transaction_id),
            SettlementState::Failed { captured, .. } | SettlementState::Cancelled { captured } => {
                *captured
            }
        }
    }

    /// The failed state reached from here, keeping captured identifiers.
    pub(crate) fn fail(&self, error: impl Into<SettlementError>) -> SettlementState {
        SettlementState::Failed {
            captured: self.captured(),
            error: error.into(),
        }
    }

    /// The cancelled state reached from here, keeping captured identifiers.
    pub(crate) fn cancel(&self) -> SettlementState {
        SettlementState::Cancelled {
            captured: self.captured(),
        }
    }
}

/// One recorded phase change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: SettlementPhase,
    pub to: SettlementPhase,
    pub at: DateTime<Utc>,
}

/// One purchase attempt. Single-use: a retry needs a new session.
#[derive(Debug, Clone)]
pub struct SettlementSession {
    id: SessionId,
    intent: OrderIntent,
    request: CreateOrderRequest,
    state: SettlementState,
    started_at: DateTime<Utc>,
    history: Vec<PhaseTransition>,
    cancel: CancelHandle,
}

impl SettlementSession {
    /// Creates an idle session for an intent that already passed validation.
    pub(crate) fn new(intent: OrderIntent, request: CreateOrderRequest) -> Self {
        Self {
            id: SessionId::new(),
            intent,
            request,
            state: SettlementState::Idle,
            started_at: Utc::now(),
            history: Vec::new(),
            cancel: CancelHandle::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn intent(&self) -> &OrderIntent {
        &self.intent
    }

    pub(crate) fn request(&self) -> &CreateOrderRequest {
        &self.request
    }

    pub fn state(&self) -> &SettlementState {
        &self.state
    }

    pub fn phase(&self) -> SettlementPhase {
        self.state.phase()
    }

    /// Set once the order was created.
    pub fn order_id(&self) -> Option<OrderId> {
        self.state.captured().order_id()
    }

    /// Set once the transaction was opened.
    pub fn transaction_id(&self) -> Option<TransactionId> {
        self.state.captured().transaction_id()
    }

    /// Set only when the phase is Failed.
    pub fn last_error(&self) -> Option<&SettlementError> {
        match &self.state {
            SettlementState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Time since submission.
    pub fn elapsed(&self) -> chrono::TimeDelta {
        Utc::now() - self.started_at
    }

    /// Every phase change so far, oldest first.
    pub fn history(&self) -> &[PhaseTransition] {
        &self.history
    }

    /// Returns a handle that can cancel this session from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }

    /// Returns the terminal outcome, or `None` while the session is running.
    pub fn outcome(&self) -> Option<SettlementOutcome> {
        match &self.state {
            SettlementState::Succeeded { order_id, .. } => Some(SettlementOutcome::Succeeded {
                order_id: *order_id,
            }),
            SettlementState::Failed { error, .. } => Some(SettlementOutcome::Failed(error.clone())),
            SettlementState::Cancelled { .. } => Some(SettlementOutcome::Cancelled),
            _ => None,
        }
    }

    /// Moves to `next`. Illegal transitions are refused and logged.
    pub(crate) fn enter(&mut self, next: SettlementState) -> bool {
        let from = self.phase();
        let to = next.phase();
        if !from.can_advance_to(to) {
            tracing::error!(session_id = %self.id, %from, %to, "refused illegal phase transition");
            return false;
        }

        self.state = next;
        self.history.push(PhaseTransition {
            from,
            to,
            at: Utc::now(),
        });
        tracing::info!(
            session_id = %self.id,
            %from,
            %to,
            order_id = ?self.order_id(),
            transaction_id = ?self.transaction_id(),
            "settlement phase changed"
        );
        true
    }
}
