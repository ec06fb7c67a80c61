//! Terminal result of a settlement session.

use common::OrderId;

use crate::error::{ErrorKind, SettlementError};

/// How a settlement session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// Payment verified and approved.
    Succeeded { order_id: OrderId },

    /// Validation, a remote call, or verification failed.
    Failed(SettlementError),

    /// The caller cancelled before the charge point.
    Cancelled,
}

impl SettlementOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SettlementOutcome::Succeeded { .. })
    }

    /// Returns the created order on success.
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            SettlementOutcome::Succeeded { order_id } => Some(*order_id),
            _ => None,
        }
    }

    /// Returns the classification of a non-successful outcome.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            SettlementOutcome::Succeeded { .. } => None,
            SettlementOutcome::Failed(err) => Some(err.kind()),
            SettlementOutcome::Cancelled => Some(ErrorKind::Cancelled),
        }
    }

    /// Returns the user-facing failure message. Cancellation has none.
    pub fn message(&self) -> Option<String> {
        match self {
            SettlementOutcome::Failed(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_success_accessors() {
        let outcome = SettlementOutcome::Succeeded {
            order_id: OrderId::new(7),
        };
        assert!(outcome.is_success());
        assert_eq!(outcome.order_id(), Some(OrderId::new(7)));
        assert!(outcome.error_kind().is_none());
        assert!(outcome.message().is_none());
    }

    #[test]
    fn test_cancelled_has_kind_but_no_message() {
        let outcome = SettlementOutcome::Cancelled;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Cancelled));
        assert!(outcome.message().is_none());
    }

    #[test]
    fn test_failure_message() {
        let outcome = SettlementOutcome::Failed(ValidationError::UnknownPrice.into());
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Validation));
        assert_eq!(outcome.message().as_deref(), Some("Product price is unknown"));
    }
}
