//! Order intent and its pre-submission checks.

use common::{BuyerId, ProductId};
use rust_decimal::Decimal;
use transport::{CreateOrderRequest, Product};

use crate::error::ValidationError;

/// A buyer's request to purchase a product.
///
/// Immutable: once handed to the workflow it is only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIntent {
    buyer_id: BuyerId,
    product_id: ProductId,
    quantity: i64,
    unit_price: Option<Decimal>,
}

impl OrderIntent {
    /// Creates an intent from raw parts.
    ///
    /// `unit_price` must come from a trusted source, never from user input.
    pub fn new(
        buyer_id: BuyerId,
        product_id: ProductId,
        quantity: i64,
        unit_price: Option<Decimal>,
    ) -> Self {
        Self {
            buyer_id,
            product_id,
            quantity,
            unit_price,
        }
    }

    /// Creates an intent for an already-fetched product, taking its price.
    pub fn for_product(buyer_id: BuyerId, product: &Product, quantity: u32) -> Self {
        Self::new(buyer_id, product.id, i64::from(quantity), product.price)
    }

    pub fn buyer_id(&self) -> BuyerId {
        self.buyer_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Option<Decimal> {
        self.unit_price
    }

    /// Returns unit price times quantity.
    ///
    /// `None` if the price is unknown or the product overflows a decimal.
    pub fn total(&self) -> Option<Decimal> {
        self.unit_price
            .and_then(|price| price.checked_mul(Decimal::from(self.quantity)))
    }

    /// Checks quantity and price bounds.
    ///
    /// On success returns the order request the workflow sends first.
    pub fn validate(&self) -> Result<CreateOrderRequest, ValidationError> {
        let quantity = u32::try_from(self.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(ValidationError::InvalidQuantity {
                quantity: self.quantity,
            })?;

        match self.unit_price {
            None => return Err(ValidationError::UnknownPrice),
            Some(price) if price < Decimal::ZERO => {
                return Err(ValidationError::NegativePrice { price });
            }
            Some(_) => {}
        }
        if self.total().is_none() {
            return Err(ValidationError::TotalTooLarge {
                quantity: self.quantity,
            });
        }

        Ok(CreateOrderRequest {
            buyer_id: self.buyer_id,
            product_id: self.product_id,
            quantity,
        })
    }
}

/// Coerces raw quantity input: anything unparsable or below one becomes 1.
pub fn coerce_quantity(input: &str) -> u32 {
    input
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|q| u32::try_from(q).ok())
        .filter(|q| *q > 0)
        .unwrap_or(1)
}
