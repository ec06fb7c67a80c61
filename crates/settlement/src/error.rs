//! Settlement error types.

use common::TransactionId;
use rust_decimal::Decimal;
use thiserror::Error;
use transport::TransportError;

/// Message shown when the verifier rejects the payment.
pub const DECLINED_MESSAGE: &str = "Payment was declined";

/// Reasons an order intent is rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Quantity is zero, negative, or too large.
    #[error("Quantity must be a positive whole number (got {quantity})")]
    InvalidQuantity { quantity: i64 },

    /// The product was fetched without a price.
    #[error("Product price is unknown")]
    UnknownPrice,

    /// The product carries a negative price.
    #[error("Product price cannot be negative (got {price})")]
    NegativePrice { price: Decimal },

    /// Unit price times quantity does not fit in a decimal.
    #[error("Order total is too large")]
    TotalTooLarge { quantity: i64 },
}

/// Why a settlement ended in failure.
///
/// Displays as the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// The intent failed pre-submission checks; nothing reached the network.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// One of the remote calls failed.
    #[error("{0}")]
    Remote(#[from] TransportError),

    /// Verification succeeded at the transport level but the payment was not approved.
    #[error("{}", DECLINED_MESSAGE)]
    Declined { transaction_id: TransactionId },
}

impl SettlementError {
    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SettlementError::Validation(_) => ErrorKind::Validation,
            SettlementError::Remote(_) => ErrorKind::Remote,
            SettlementError::Declined { .. } => ErrorKind::Declined,
        }
    }
}

/// Classification of how a settlement ended without succeeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Remote,
    Declined,
    Cancelled,
}

impl ErrorKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Remote => "remote",
            ErrorKind::Declined => "declined",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by the caller boundary before a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Another settlement is still running.
    #[error("A settlement is already in flight")]
    InFlight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_keeps_backend_message() {
        let err = SettlementError::from(TransportError::remote("card declined"));
        assert_eq!(err.to_string(), "card declined");
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[test]
    fn test_declined_message() {
        let err = SettlementError::Declined {
            transaction_id: TransactionId::new(3),
        };
        assert_eq!(err.to_string(), "Payment was declined");
        assert_eq!(err.kind(), ErrorKind::Declined);
    }

    #[test]
    fn test_validation_kind() {
        let err = SettlementError::from(ValidationError::UnknownPrice);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Product price is unknown");
    }
}
