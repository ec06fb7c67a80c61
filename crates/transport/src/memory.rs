//! In-memory settlement transport for tests and demos.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use common::{OrderId, TransactionId};
use rust_decimal::Decimal;
use tokio::sync::Notify;

use crate::client::{Operation, SettlementTransport};
use crate::error::TransportError;
use crate::model::{
    CreateOrderRequest, OrderReceipt, PaymentProcessed, PaymentVerification, TransactionReceipt,
};

/// Holds a call open until the test releases it.
///
/// The call signals [`CallGate::entered`] once it is in flight and then
/// waits for [`CallGate::release`].
#[derive(Debug, Default)]
pub struct CallGate {
    entered: Notify,
    release: Notify,
}

impl CallGate {
    /// Waits until the gated call is in flight.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Lets the gated call complete.
    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

#[derive(Debug)]
struct InMemoryTransportState {
    calls: Vec<Operation>,
    failures: HashMap<Operation, TransportError>,
    gates: HashMap<Operation, Arc<CallGate>>,
    orders: HashMap<OrderId, CreateOrderRequest>,
    transactions: HashMap<TransactionId, OrderId>,
    charged: Vec<TransactionId>,
    approve: bool,
    unit_price: Decimal,
    next_order_id: i64,
    next_transaction_id: i64,
}

impl Default for InMemoryTransportState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            failures: HashMap::new(),
            gates: HashMap::new(),
            orders: HashMap::new(),
            transactions: HashMap::new(),
            charged: Vec::new(),
            approve: true,
            unit_price: Decimal::ZERO,
            next_order_id: 0,
            next_transaction_id: 0,
        }
    }
}

/// Scriptable transport that records every call it receives.
///
/// Payments are approved unless [`InMemoryTransport::set_approve`] says otherwise.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<Mutex<InMemoryTransportState>>,
}

impl InMemoryTransport {
    /// Creates a transport where every call succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call to `op` fail with `error`.
    pub fn fail_on(&self, op: Operation, error: TransportError) {
        self.lock().failures.insert(op, error);
    }

    /// Lets calls to `op` succeed again.
    pub fn clear_failure(&self, op: Operation) {
        self.lock().failures.remove(&op);
    }

    /// Sets the `approved` flag returned by payment verification.
    pub fn set_approve(&self, approve: bool) {
        self.lock().approve = approve;
    }

    /// Sets the unit price used to compute transaction amounts.
    pub fn set_unit_price(&self, price: Decimal) {
        self.lock().unit_price = price;
    }

    /// Holds the next calls to `op` open until the returned gate is released.
    pub fn gate(&self, op: Operation) -> Arc<CallGate> {
        let gate = Arc::new(CallGate::default());
        self.lock().gates.insert(op, gate.clone());
        gate
    }

    /// Returns every call received, in order.
    pub fn calls(&self) -> Vec<Operation> {
        self.lock().calls.clone()
    }

    /// Returns how many times `op` was called.
    pub fn call_count(&self, op: Operation) -> usize {
        self.lock().calls.iter().filter(|c| **c == op).count()
    }

    /// Returns the number of orders created.
    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    /// Returns the number of transactions opened.
    pub fn transaction_count(&self) -> usize {
        self.lock().transactions.len()
    }

    /// Returns true if the transaction was charged.
    pub fn was_charged(&self, transaction_id: TransactionId) -> bool {
        self.lock().charged.contains(&transaction_id)
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryTransportState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records the call, waits on its gate if any, then returns the scripted failure.
    async fn enter(&self, op: Operation) -> Result<(), TransportError> {
        let gate = {
            let mut state = self.lock();
            state.calls.push(op);
            state.gates.get(&op).cloned()
        };
        if let Some(gate) = gate {
            gate.pass().await;
        }
        match self.lock().failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SettlementTransport for InMemoryTransport {
    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<OrderReceipt, TransportError> {
        self.enter(Operation::CreateOrder).await?;

        let mut state = self.lock();
        state.next_order_id += 1;
        let id = OrderId::new(state.next_order_id);
        state.orders.insert(id, request.clone());

        Ok(OrderReceipt {
            id,
            buyer_id: request.buyer_id,
            product_id: request.product_id,
            quantity: i64::from(request.quantity),
            status: "created".to_string(),
            order_date: Some(chrono::Utc::now().naive_utc()),
            completion_date: None,
        })
    }

    async fn create_transaction(
        &self,
        order_id: OrderId,
    ) -> Result<TransactionReceipt, TransportError> {
        self.enter(Operation::CreateTransaction).await?;

        let mut state = self.lock();
        let quantity = match state.orders.get(&order_id) {
            Some(order) => order.quantity,
            None => return Err(TransportError::validation("Order not found")),
        };
        if state.transactions.values().any(|o| *o == order_id) {
            return Err(TransportError::validation(
                "Transaction already exists for this order",
            ));
        }
        let amount = state
            .unit_price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| TransportError::validation("Order total is too large"))?;
        state.next_transaction_id += 1;
        let id = TransactionId::new(state.next_transaction_id);
        state.transactions.insert(id, order_id);

        Ok(TransactionReceipt {
            id,
            order_id,
            amount,
            status: "pending".to_string(),
            date: Some(chrono::Utc::now().naive_utc()),
        })
    }

    async fn process_payment(
        &self,
        transaction_id: TransactionId,
    ) -> Result<PaymentProcessed, TransportError> {
        self.enter(Operation::ProcessPayment).await?;

        let mut state = self.lock();
        if !state.transactions.contains_key(&transaction_id) {
            return Err(TransportError::validation("Transaction not found"));
        }
        state.charged.push(transaction_id);

        Ok(PaymentProcessed {
            transaction_id,
            status: "processing".to_string(),
            detail: Some("Payment processing started".to_string()),
        })
    }

    async fn verify_payment(
        &self,
        transaction_id: TransactionId,
    ) -> Result<PaymentVerification, TransportError> {
        self.enter(Operation::VerifyPayment).await?;

        let state = self.lock();
        if !state.transactions.contains_key(&transaction_id) {
            return Err(TransportError::validation("Transaction not found"));
        }
        let (tx_status, order_status) = if state.approve {
            ("approved", "completed")
        } else {
            ("denied", "cancelled")
        };

        Ok(PaymentVerification {
            transaction_id,
            approved: state.approve,
            tx_status: Some(tx_status.to_string()),
            order_status: Some(order_status.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportErrorKind;
    use common::{BuyerId, ProductId};

    fn order_request() -> CreateOrderRequest {
        CreateOrderRequest {
            buyer_id: BuyerId::new(1),
            product_id: ProductId::new(42),
            quantity: 2,
        }
    }

    #[tokio::test]
    async fn test_full_sequence_records_calls() {
        let transport = InMemoryTransport::new();
        transport.set_unit_price(Decimal::new(999, 2));

        let order = transport.create_order(&order_request()).await.unwrap();
        let tx = transport.create_transaction(order.id).await.unwrap();
        transport.process_payment(tx.id).await.unwrap();
        let verification = transport.verify_payment(tx.id).await.unwrap();

        assert!(verification.approved);
        assert_eq!(tx.amount, Decimal::new(1998, 2));
        assert!(transport.was_charged(tx.id));
        assert_eq!(
            transport.calls(),
            vec![
                Operation::CreateOrder,
                Operation::CreateTransaction,
                Operation::ProcessPayment,
                Operation::VerifyPayment,
            ]
        );
    }

    #[tokio::test]
    async fn test_scripted_failure_is_returned() {
        let transport = InMemoryTransport::new();
        transport.fail_on(Operation::CreateOrder, TransportError::validation("Buyer not found"));

        let err = transport.create_order(&order_request()).await.unwrap_err();
        assert_eq!(err.message(), "Buyer not found");
        assert_eq!(transport.order_count(), 0);
        assert_eq!(transport.call_count(Operation::CreateOrder), 1);
    }

    #[tokio::test]
    async fn test_second_transaction_for_order_is_rejected() {
        let transport = InMemoryTransport::new();
        let order = transport.create_order(&order_request()).await.unwrap();
        transport.create_transaction(order.id).await.unwrap();

        let err = transport.create_transaction(order.id).await.unwrap_err();
        assert_eq!(err.message(), "Transaction already exists for this order");
        assert_eq!(transport.transaction_count(), 1);
    }

    #[tokio::test]
    async fn test_overflowing_amount_is_rejected() {
        let transport = InMemoryTransport::new();
        transport.set_unit_price(Decimal::MAX);
        let order = transport.create_order(&order_request()).await.unwrap();

        let err = transport.create_transaction(order.id).await.unwrap_err();
        assert_eq!(err.kind(), TransportErrorKind::Validation);
        assert_eq!(transport.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_decline_is_a_successful_call() {
        let transport = InMemoryTransport::new();
        transport.set_approve(false);
        let order = transport.create_order(&order_request()).await.unwrap();
        let tx = transport.create_transaction(order.id).await.unwrap();

        let verification = transport.verify_payment(tx.id).await.unwrap();
        assert!(!verification.approved);
        assert_eq!(verification.order_status.as_deref(), Some("cancelled"));
    }

    #[tokio::test]
    async fn test_gate_holds_call_until_released() {
        let transport = InMemoryTransport::new();
        let gate = transport.gate(Operation::CreateOrder);

        let call = tokio::spawn({
            let transport = transport.clone();
            async move { transport.create_order(&order_request()).await }
        });

        gate.entered().await;
        assert_eq!(transport.order_count(), 0);
        gate.release();

        let order = call.await.unwrap().unwrap();
        assert_eq!(order.id, OrderId::new(1));
    }
}
