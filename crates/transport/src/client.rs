//! The transport seam the settlement workflow drives.

use async_trait::async_trait;
use common::{OrderId, TransactionId};

use crate::error::TransportError;
use crate::model::{
    CreateOrderRequest, OrderReceipt, PaymentProcessed, PaymentVerification, TransactionReceipt,
};

/// The four remote operations, in the order the workflow issues them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateOrder,
    CreateTransaction,
    ProcessPayment,
    VerifyPayment,
}

impl Operation {
    /// Returns the operation name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateOrder => "create_order",
            Operation::CreateTransaction => "create_transaction",
            Operation::ProcessPayment => "process_payment",
            Operation::VerifyPayment => "verify_payment",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remote calls of the settlement workflow.
///
/// Each call is a single round trip. Implementations must not retry and
/// must unwrap backend error payloads into [`TransportError`].
#[async_trait]
pub trait SettlementTransport: Send + Sync {
    /// Creates an order for the buyer.
    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<OrderReceipt, TransportError>;

    /// Opens a transaction referencing an existing order.
    async fn create_transaction(
        &self,
        order_id: OrderId,
    ) -> Result<TransactionReceipt, TransportError>;

    /// Charges the transaction.
    async fn process_payment(
        &self,
        transaction_id: TransactionId,
    ) -> Result<PaymentProcessed, TransportError>;

    /// Asks whether the charge was approved.
    async fn verify_payment(
        &self,
        transaction_id: TransactionId,
    ) -> Result<PaymentVerification, TransportError>;
}

#[async_trait]
impl<T: SettlementTransport + ?Sized> SettlementTransport for std::sync::Arc<T> {
    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<OrderReceipt, TransportError> {
        (**self).create_order(request).await
    }

    async fn create_transaction(
        &self,
        order_id: OrderId,
    ) -> Result<TransactionReceipt, TransportError> {
        (**self).create_transaction(order_id).await
    }

    async fn process_payment(
        &self,
        transaction_id: TransactionId,
    ) -> Result<PaymentProcessed, TransportError> {
        (**self).process_payment(transaction_id).await
    }

    async fn verify_payment(
        &self,
        transaction_id: TransactionId,
    ) -> Result<PaymentVerification, TransportError> {
        (**self).verify_payment(transaction_id).await
    }
}
