//! Shared types for the marketplace settlement workflow.

pub mod types;

pub use types::{BuyerId, OrderId, ProductId, SessionId, TransactionId};
