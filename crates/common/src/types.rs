use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a newtype over a backend-assigned integer identifier.
macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw backend identifier.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw backend identifier.
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

backend_id!(
    /// Identifier of the buyer placing an order.
    BuyerId
);

backend_id!(
    /// Identifier of a catalog product.
    ProductId
);

backend_id!(
    /// Identifier the order service assigns to a created order.
    OrderId
);

backend_id!(
    /// Identifier the transaction service assigns to an opened transaction.
    TransactionId
);

/// Unique identifier for one settlement session.
///
/// Only used for diagnostics; the backend never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_new_creates_unique_ids() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn backend_ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&OrderId::new(17)).unwrap();
        assert_eq!(json, "17");

        let id: TransactionId = serde_json::from_str("42").unwrap();
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn backend_id_display_and_conversion() {
        let id = ProductId::from(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i64::from(id), 42);
        assert_eq!(BuyerId::new(1), BuyerId::from(1));
    }
}
