//! Request and response payloads exchanged with the marketplace backend.

use chrono::NaiveDateTime;
use common::{BuyerId, OrderId, ProductId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub buyer_id: BuyerId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// An order as returned by the order service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub id: OrderId,
    pub buyer_id: BuyerId,
    pub product_id: ProductId,
    /// Unconstrained on the backend, so any stored value is accepted.
    pub quantity: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub order_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub completion_date: Option<NaiveDateTime>,
}

/// Body of `POST /transactions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub order_id: OrderId,
}

/// A transaction as returned by the transaction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub id: TransactionId,
    pub order_id: OrderId,
    pub amount: Decimal,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
}

/// Response of `POST /payment/process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProcessed {
    pub transaction_id: TransactionId,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Response of `POST /payment/verify`.
///
/// `approved` is a business outcome: a successful call may still carry a decline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub transaction_id: TransactionId,
    pub approved: bool,
    #[serde(default)]
    pub tx_status: Option<String>,
    #[serde(default)]
    pub order_status: Option<String>,
}

/// A catalog product, as listed by `GET /products`.
///
/// Only the fields the settlement workflow reads are modeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_order_receipt_parses_backend_payload() {
        let json = r#"{
            "id": 7, "buyer_id": 1, "product_id": 42, "quantity": 2,
            "status": "created", "order_date": "2024-05-01T10:00:00.123456",
            "completion_date": null
        }"#;
        let order: OrderReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, OrderId::new(7));
        assert_eq!(order.status, "created");
        assert!(order.order_date.is_some());
        assert!(order.completion_date.is_none());
    }

    #[test]
    fn test_order_list_keeps_rows_with_odd_quantities() {
        let json = r#"[
            {"id": 7, "buyer_id": 1, "product_id": 42, "quantity": -1, "status": "created"},
            {"id": 8, "buyer_id": 1, "product_id": 42, "quantity": 2, "status": "completed"}
        ]"#;
        let orders: Vec<OrderReceipt> = serde_json::from_str(json).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].quantity, -1);
        assert_eq!(orders[1].id, OrderId::new(8));
    }

    #[test]
    fn test_transaction_amount_accepts_json_number() {
        let json = r#"{"id": 3, "order_id": 7, "amount": 19.98, "status": "pending"}"#;
        let tx: TransactionReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount, Decimal::new(1998, 2));
    }

    #[test]
    fn test_verification_reads_approved_flag() {
        let json = r#"{"transaction_id": 3, "approved": false, "tx_status": "denied", "order_status": "cancelled"}"#;
        let verification: PaymentVerification = serde_json::from_str(json).unwrap();
        assert!(!verification.approved);
        assert_eq!(verification.tx_status.as_deref(), Some("denied"));
    }

    #[test]
    fn test_product_without_price() {
        let product: Product = serde_json::from_str(r#"{"id": 42, "name": "Lamp"}"#).unwrap();
        assert!(product.price.is_none());
    }
}
