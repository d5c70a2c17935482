//! Configuration loading from environment.

use std::env;
use std::num::NonZeroU32;

use anyhow::{Context, bail};
use musicstore_hex::inbound::DEFAULT_REQUESTS_PER_MINUTE;
use musicstore_types::Currency;

/// Credential used with the simulated gateway when none is configured.
const SIMULATED_CREDENTIAL: &str = "sk_test_simulated";

/// Which payment gateway adapter to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
    Simulated,
    Stripe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub gateway: GatewayKind,
    /// Secret key sent with every charge
    pub payment_credential: String,
    pub stripe_api_base: String,
    pub currency: Currency,
    /// `None` allows any origin
    pub cors_origin: Option<String>,
    pub seed_sample_data: bool,
    pub rate_limit_per_minute: NonZeroU32,
    /// Reverse proxies whose `X-Forwarded-For` entries identify clients
    pub trusted_proxy_hops: usize,
    pub log_format: LogFormat,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        // Empty values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => 3000,
        };

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let gateway = match var("PAYMENT_GATEWAY").as_deref().map(str::trim) {
            None | Some("simulated") => GatewayKind::Simulated,
            Some("stripe") => GatewayKind::Stripe,
            Some(other) => bail!(
                "PAYMENT_GATEWAY must be \"simulated\" or \"stripe\", got {:?}",
                other
            ),
        };

        let payment_credential = match (var("STRIPE_SECRET_KEY"), gateway) {
            (Some(key), _) => key,
            (None, GatewayKind::Simulated) => SIMULATED_CREDENTIAL.to_string(),
            (None, GatewayKind::Stripe) => {
                bail!("STRIPE_SECRET_KEY is required when PAYMENT_GATEWAY=stripe")
            }
        };

        let stripe_api_base = var("STRIPE_API_BASE")
            .unwrap_or_else(|| payment_gateway::DEFAULT_API_BASE.to_string());

        let currency = match var("PAYMENT_CURRENCY") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("PAYMENT_CURRENCY: {}", e))?,
            None => Currency::AUD,
        };

        let seed_sample_data = match var("SEED_SAMPLE_DATA") {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("SEED_SAMPLE_DATA must be true or false, got {:?}", raw))?,
            None => true,
        };

        let rate_limit_per_minute = match var("RATE_LIMIT_PER_MINUTE") {
            Some(raw) => raw.trim().parse().with_context(|| {
                format!(
                    "RATE_LIMIT_PER_MINUTE must be a positive integer, got {:?}",
                    raw
                )
            })?,
            None => DEFAULT_REQUESTS_PER_MINUTE,
        };

        let trusted_proxy_hops = match var("TRUSTED_PROXY_HOPS") {
            Some(raw) => raw.trim().parse().with_context(|| {
                format!("TRUSTED_PROXY_HOPS must be a whole number, got {:?}", raw)
            })?,
            None => 0,
        };

        let log_format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("LOG_FORMAT must be \"text\" or \"json\", got {:?}", other),
        };

        Ok(Self {
            port,
            database_url,
            gateway,
            payment_credential,
            stripe_api_base,
            currency,
            cors_origin: var("CORS_ORIGIN"),
            seed_sample_data,
            rate_limit_per_minute,
            trusted_proxy_hops,
            log_format,
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.gateway, GatewayKind::Simulated);
        assert_eq!(config.payment_credential, "sk_test_simulated");
        assert_eq!(config.stripe_api_base, "https://api.stripe.com");
        assert_eq!(config.currency, Currency::AUD);
        assert!(config.cors_origin.is_none());
        assert!(config.seed_sample_data);
        assert_eq!(config.rate_limit_per_minute.get(), 100);
        assert_eq!(config.trusted_proxy_hops, 0);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_database_url_required() {
        let err = load(&[]).err().unwrap();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_stripe_requires_secret_key() {
        let err = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("PAYMENT_GATEWAY", "stripe"),
        ])
        .err()
        .unwrap();
        assert!(err.to_string().contains("STRIPE_SECRET_KEY"));

        let config = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("PAYMENT_GATEWAY", "stripe"),
            ("STRIPE_SECRET_KEY", "sk_live_123"),
        ])
        .unwrap();
        assert_eq!(config.gateway, GatewayKind::Stripe);
        assert_eq!(config.payment_credential, "sk_live_123");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/musicstore"),
            ("PORT", "8080"),
            ("PAYMENT_CURRENCY", "usd"),
            ("CORS_ORIGIN", "https://shop.example.com"),
            ("SEED_SAMPLE_DATA", "false"),
            ("RATE_LIMIT_PER_MINUTE", "20"),
            ("TRUSTED_PROXY_HOPS", "1"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.currency, Currency::USD);
        assert_eq!(
            config.cors_origin.as_deref(),
            Some("https://shop.example.com")
        );
        assert!(!config.seed_sample_data);
        assert_eq!(config.rate_limit_per_minute.get(), 20);
        assert_eq!(config.trusted_proxy_hops, 1);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let base = ("DATABASE_URL", "sqlite::memory:");

        assert!(load(&[base, ("PORT", "http")]).is_err());
        assert!(load(&[base, ("PAYMENT_GATEWAY", "paypal")]).is_err());
        assert!(load(&[base, ("PAYMENT_CURRENCY", "JPY")]).is_err());
        assert!(load(&[base, ("SEED_SAMPLE_DATA", "maybe")]).is_err());
        assert!(load(&[base, ("RATE_LIMIT_PER_MINUTE", "0")]).is_err());
        assert!(load(&[base, ("TRUSTED_PROXY_HOPS", "-1")]).is_err());
        assert!(load(&[base, ("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = load(&[("DATABASE_URL", "sqlite::memory:"), ("CORS_ORIGIN", "")]).unwrap();
        assert!(config.cors_origin.is_none());
    }
}
