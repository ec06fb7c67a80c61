//! Transport client for the settlement workflow.
//!
//! Exposes the four remote calls the workflow drives, in order:
//! 1. Create order
//! 2. Create transaction
//! 3. Process payment
//! 4. Verify payment
//!
//! Every failure is normalized into a [`TransportError`] carrying a
//! human-readable message and a classification. No call is retried.

pub mod client;
pub mod error;
pub mod http;
pub mod memory;
pub mod model;

pub use client::{Operation, SettlementTransport};
pub use error::{TransportError, TransportErrorKind};
pub use http::HttpTransport;
pub use memory::{CallGate, InMemoryTransport};
pub use model::{
    CreateOrderRequest, CreateTransactionRequest, OrderReceipt, PaymentProcessed,
    PaymentVerification, Product, TransactionReceipt,
};
