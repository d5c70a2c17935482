//! Stripe-compatible charges adapter.

use std::time::Duration;

use async_trait::async_trait;
use musicstore_types::{Charge, ChargeRequest, PaymentError, PaymentGateway};
use serde::Deserialize;
use tracing::{instrument, warn};

/// Public Stripe API.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Charges through `POST {api_base}/v1/charges`.
pub struct StripeGateway {
    http: reqwest::Client,
    api_base: String,
}

#[derive(Deserialize)]
struct ChargeBody {
    id: String,
    paid: bool,
    failure_message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: Option<String>,
    /// Set on card errors: the failed charge's id
    charge: Option<String>,
}

impl StripeGateway {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn charges_url(&self) -> String {
        format!("{}/v1/charges", self.api_base)
    }
}

impl Default for StripeGateway {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, request), fields(amount = request.amount, currency = %request.currency))]
    async fn charge(&self, request: ChargeRequest) -> Result<Charge, PaymentError> {
        if request.amount <= 0 {
            return Err(PaymentError::InvalidRequest(
                "Amount must be positive".into(),
            ));
        }

        let form = [
            ("amount", request.amount.to_string()),
            ("currency", request.currency.code().to_string()),
            ("source", request.source_token),
        ];

        let resp = self
            .http
            .post(self.charges_url())
            .bearer_auth(&request.credential)
            .timeout(REQUEST_TIMEOUT)
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentError::Unavailable(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| PaymentError::Unavailable(e.to_string()))?;

        if status.is_success() {
            let charge: ChargeBody = serde_json::from_str(&body).map_err(|e| {
                PaymentError::Unavailable(format!("Unreadable charge response: {}", e))
            })?;
            return Ok(Charge {
                transaction_id: charge.id,
                paid: charge.paid,
                failure_message: charge.failure_message,
            });
        }

        let error = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|env| env.error)
            .map_err(|_| PaymentError::Unavailable(format!("HTTP {}", status)))?;
        let message = error
            .message
            .unwrap_or_else(|| format!("HTTP {}", status));

        match error.kind.as_str() {
            // A card error still produces a (failed) charge.
            "card_error" => {
                warn!(%message, "card declined");
                Ok(Charge {
                    transaction_id: error.charge.unwrap_or_default(),
                    paid: false,
                    failure_message: Some(message),
                })
            }
            "invalid_request_error" if status.as_u16() == 400 => {
                Err(PaymentError::InvalidRequest(message))
            }
            _ => Err(PaymentError::Unavailable(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Form, Json, Router,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::post,
    };
    use musicstore_types::Currency;

    use super::*;

    /// Minimal stand-in for the charges endpoint.
    async fn charges(
        headers: HeaderMap,
        Form(form): Form<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if auth != "Bearer sk_test_123" {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": {"type": "invalid_request_error", "message": "Invalid API Key provided"}
                })),
            );
        }

        match form.get("source").map(String::as_str) {
            Some("tok_chargeDeclined") => (
                StatusCode::PAYMENT_REQUIRED,
                Json(serde_json::json!({
                    "error": {
                        "type": "card_error",
                        "message": "Your card was declined.",
                        "charge": "ch_declined"
                    }
                })),
            ),
            Some("tok_missing") => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": {"type": "invalid_request_error", "message": "No such token: 'tok_missing'"}
                })),
            ),
            _ => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "id": format!("ch_{}_{}", form["amount"], form["currency"]),
                    "paid": true,
                    "failure_message": null
                })),
            ),
        }
    }

    async fn start_stub() -> String {
        let app = Router::new().route("/v1/charges", post(charges));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn request(token: &str, credential: &str) -> ChargeRequest {
        ChargeRequest {
            amount: 2500,
            currency: Currency::AUD,
            source_token: token.into(),
            credential: credential.into(),
        }
    }

    #[tokio::test]
    async fn test_successful_charge() {
        let gateway = StripeGateway::new(start_stub().await);

        let charge = gateway
            .charge(request("tok_visa", "sk_test_123"))
            .await
            .unwrap();

        assert!(charge.paid);
        assert_eq!(charge.transaction_id, "ch_2500_aud");
    }

    #[tokio::test]
    async fn test_card_error_is_unpaid_charge() {
        let gateway = StripeGateway::new(start_stub().await);

        let charge = gateway
            .charge(request("tok_chargeDeclined", "sk_test_123"))
            .await
            .unwrap();

        assert!(!charge.paid);
        assert_eq!(charge.transaction_id, "ch_declined");
        assert_eq!(
            charge.failure_message.as_deref(),
            Some("Your card was declined.")
        );
    }

    #[tokio::test]
    async fn test_bad_token_is_invalid_request() {
        let gateway = StripeGateway::new(start_stub().await);

        let result = gateway
            .charge(request("tok_missing", "sk_test_123"))
            .await;

        assert!(matches!(result, Err(PaymentError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_wrong_key_is_unavailable() {
        let gateway = StripeGateway::new(start_stub().await);

        let result = gateway.charge(request("tok_visa", "sk_wrong")).await;

        assert!(matches!(result, Err(PaymentError::Unavailable(msg)) if msg.contains("Invalid API Key")));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_unavailable() {
        // Nothing listens on port 9 locally.
        let gateway = StripeGateway::new("http://127.0.0.1:9");

        let result = gateway.charge(request("tok_visa", "sk_test_123")).await;

        assert!(matches!(result, Err(PaymentError::Unavailable(_))));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let gateway = StripeGateway::new("http://localhost:12111/");
        assert_eq!(gateway.charges_url(), "http://localhost:12111/v1/charges");
    }
}
