//! Payment gateway port.
//!
//! This trait defines the interface for charge-processing services.
//! Implementations can be HTTP clients, simulated gateways, etc.

use crate::domain::Currency;

/// Error type for payment gateway calls that did not produce a charge.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("{0}")]
    Declined(String),

    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid payment request: {0}")]
    InvalidRequest(String),
}

/// A single charge against a payment source.
#[derive(Clone)]
pub struct ChargeRequest {
    /// Amount in minor currency units
    pub amount: i64,
    pub currency: Currency,
    /// Tokenized card or source produced by the client-side SDK
    pub source_token: String,
    /// Secret API key used to authenticate with the gateway
    pub credential: String,
}

impl std::fmt::Debug for ChargeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChargeRequest")
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("source_token", &self.source_token)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Outcome of a charge as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    pub transaction_id: String,
    pub paid: bool,
    pub failure_message: Option<String>,
}

/// Port trait for payment gateways.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Charges the source. Calls are never retried by the caller.
    async fn charge(&self, request: ChargeRequest) -> Result<Charge, PaymentError>;
}
