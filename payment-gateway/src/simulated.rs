//! In-process gateway for development and tests.

use std::sync::Mutex;

use async_trait::async_trait;
use musicstore_types::{Charge, ChargeRequest, PaymentError, PaymentGateway};
use uuid::Uuid;

/// Token that always fails with a generic decline.
pub const TOKEN_DECLINED: &str = "tok_chargeDeclined";
/// Token that fails for lack of funds.
pub const TOKEN_INSUFFICIENT_FUNDS: &str = "tok_chargeDeclinedInsufficientFunds";
/// Token that fails because the card expired.
pub const TOKEN_EXPIRED_CARD: &str = "tok_chargeDeclinedExpiredCard";
/// Token that behaves as if the gateway could not be reached.
pub const TOKEN_UNAVAILABLE: &str = "tok_unavailable";

/// Gateway that decides the outcome from the source token.
///
/// Any token other than the `TOKEN_*` constants is charged successfully.
/// Every request that reaches a charge outcome is recorded.
#[derive(Default)]
pub struct SimulatedGateway {
    charges: Mutex<Vec<(ChargeRequest, Charge)>>,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded requests and their outcomes, oldest first.
    pub fn charges(&self) -> Vec<(ChargeRequest, Charge)> {
        self.charges
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    fn decline_reason(token: &str) -> Option<&'static str> {
        match token {
            TOKEN_DECLINED => Some("Your card was declined."),
            TOKEN_INSUFFICIENT_FUNDS => Some("Your card has insufficient funds."),
            TOKEN_EXPIRED_CARD => Some("Your card has expired."),
            _ => None,
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<Charge, PaymentError> {
        if request.credential.trim().is_empty() {
            return Err(PaymentError::Unavailable("No API key provided".into()));
        }
        if request.source_token.trim().is_empty() {
            return Err(PaymentError::InvalidRequest(
                "Must provide source or customer.".into(),
            ));
        }
        if request.amount <= 0 {
            return Err(PaymentError::InvalidRequest(
                "Amount must be positive".into(),
            ));
        }
        if request.source_token == TOKEN_UNAVAILABLE {
            return Err(PaymentError::Unavailable("connection reset".into()));
        }

        let charge = Charge {
            transaction_id: format!("ch_{}", Uuid::new_v4().simple()),
            paid: Self::decline_reason(&request.source_token).is_none(),
            failure_message: Self::decline_reason(&request.source_token).map(String::from),
        };
        tracing::debug!(
            transaction_id = %charge.transaction_id,
            paid = charge.paid,
            amount = request.amount,
            "simulated charge"
        );

        if let Ok(mut charges) = self.charges.lock() {
            charges.push((request, charge.clone()));
        }
        Ok(charge)
    }
}

#[cfg(test)]
mod tests {
    use musicstore_types::Currency;

    use super::*;

    fn request(token: &str) -> ChargeRequest {
        ChargeRequest {
            amount: 1299,
            currency: Currency::AUD,
            source_token: token.into(),
            credential: "sk_test_simulated".into(),
        }
    }

    #[tokio::test]
    async fn test_regular_token_is_paid() {
        let gateway = SimulatedGateway::new();

        let charge = gateway.charge(request("tok_visa")).await.unwrap();

        assert!(charge.paid);
        assert!(charge.transaction_id.starts_with("ch_"));
        assert_eq!(gateway.charges().len(), 1);
        assert_eq!(gateway.charges()[0].0.amount, 1299);
    }

    #[tokio::test]
    async fn test_declined_token_reports_reason() {
        let gateway = SimulatedGateway::new();

        let charge = gateway
            .charge(request(TOKEN_INSUFFICIENT_FUNDS))
            .await
            .unwrap();

        assert!(!charge.paid);
        assert_eq!(
            charge.failure_message.as_deref(),
            Some("Your card has insufficient funds.")
        );
    }

    #[tokio::test]
    async fn test_unavailable_token_records_nothing() {
        let gateway = SimulatedGateway::new();

        let result = gateway.charge(request(TOKEN_UNAVAILABLE)).await;

        assert!(matches!(result, Err(PaymentError::Unavailable(_))));
        assert!(gateway.charges().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_fails() {
        let gateway = SimulatedGateway::new();
        let mut req = request("tok_visa");
        req.credential = String::new();

        assert!(matches!(
            gateway.charge(req).await,
            Err(PaymentError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let gateway = SimulatedGateway::new();
        let mut req = request("tok_visa");
        req.amount = 0;

        assert!(matches!(
            gateway.charge(req).await,
            Err(PaymentError::InvalidRequest(_))
        ));
    }
}
