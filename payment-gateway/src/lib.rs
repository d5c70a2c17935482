//! Payment gateway adapters.
//!
//! Implementations of the [`PaymentGateway`] port:
//! - [`StripeGateway`] talks to a Stripe-compatible `/v1/charges` endpoint.
//! - [`SimulatedGateway`] answers in-process, using Stripe's well-known test
//!   tokens to pick an outcome. Used for local development and tests.
//!
//! [`Gateway`] lets the binary pick one at runtime from configuration.

mod simulated;
mod stripe;

pub use simulated::{
    SimulatedGateway, TOKEN_DECLINED, TOKEN_EXPIRED_CARD, TOKEN_INSUFFICIENT_FUNDS,
    TOKEN_UNAVAILABLE,
};
pub use stripe::{DEFAULT_API_BASE, StripeGateway};

use async_trait::async_trait;
use musicstore_types::{Charge, ChargeRequest, PaymentError, PaymentGateway};

/// A gateway chosen at startup.
pub enum Gateway {
    Stripe(StripeGateway),
    Simulated(SimulatedGateway),
}

#[async_trait]
impl PaymentGateway for Gateway {
    async fn charge(&self, request: ChargeRequest) -> Result<Charge, PaymentError> {
        match self {
            Gateway::Stripe(g) => g.charge(request).await,
            Gateway::Simulated(g) => g.charge(request).await,
        }
    }
}
