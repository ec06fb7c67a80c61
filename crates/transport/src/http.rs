//! HTTP implementation of the settlement transport.

use std::time::Duration;

use async_trait::async_trait;
use common::{OrderId, ProductId, TransactionId};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::client::{Operation, SettlementTransport};
use crate::error::TransportError;
use crate::model::{
    CreateOrderRequest, CreateTransactionRequest, OrderReceipt, PaymentProcessed,
    PaymentVerification, Product, TransactionReceipt,
};

/// Per-call timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Talks to the marketplace backend over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport for `base_url` with the given per-call timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a transport around an existing client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Returns the backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Looks a product up in the catalog listing.
    ///
    /// The backend has no single-product read, so the listing is scanned.
    pub async fn fetch_product(&self, product_id: ProductId) -> Result<Product, TransportError> {
        let response = self.client.get(self.url("/products")).send().await?;
        let products: Vec<Product> = decode(response).await?;

        products
            .into_iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| TransportError::validation("Product not found"))
    }

    /// Lists all orders, used to refresh the order list after a purchase.
    pub async fn list_orders(&self) -> Result<Vec<OrderReceipt>, TransportError> {
        let response = self.client.get(self.url("/orders")).send().await?;
        decode(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SettlementTransport for HttpTransport {
    #[tracing::instrument(skip(self), fields(op = %Operation::CreateOrder))]
    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<OrderReceipt, TransportError> {
        let response = self
            .client
            .post(self.url("/orders"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    #[tracing::instrument(skip(self), fields(op = %Operation::CreateTransaction))]
    async fn create_transaction(
        &self,
        order_id: OrderId,
    ) -> Result<TransactionReceipt, TransportError> {
        let response = self
            .client
            .post(self.url("/transactions"))
            .json(&CreateTransactionRequest { order_id })
            .send()
            .await?;
        decode(response).await
    }

    #[tracing::instrument(skip(self), fields(op = %Operation::ProcessPayment))]
    async fn process_payment(
        &self,
        transaction_id: TransactionId,
    ) -> Result<PaymentProcessed, TransportError> {
        let response = self
            .client
            .post(self.url("/payment/process"))
            .query(&[("transaction_id", transaction_id.get())])
            .send()
            .await?;
        decode(response).await
    }

    #[tracing::instrument(skip(self), fields(op = %Operation::VerifyPayment))]
    async fn verify_payment(
        &self,
        transaction_id: TransactionId,
    ) -> Result<PaymentVerification, TransportError> {
        let response = self
            .client
            .post(self.url("/payment/verify"))
            .query(&[("transaction_id", transaction_id.get())])
            .send()
            .await?;
        decode(response).await
    }
}

/// Turns a response into a typed payload, or a normalized error.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let err = TransportError::from_status(status.as_u16(), &body);
        tracing::debug!(status = status.as_u16(), error = %err, "backend rejected call");
        return Err(err);
    }

    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| TransportError::remote(format!("Unexpected response from server: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let transport = HttpTransport::with_client(Client::new(), "http://localhost:8000/");
        assert_eq!(transport.base_url(), "http://localhost:8000");
        assert_eq!(transport.url("/orders"), "http://localhost:8000/orders");
    }
}
