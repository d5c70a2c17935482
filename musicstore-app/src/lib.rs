//! # Music Store Application
//!
//! Wires the configured repository and payment gateway into the HTTP server.
//! The `musicstore-server` binary adds logging and the listener on top.

pub mod config;

use musicstore_hex::inbound::{HttpServer, ServerSettings};
use musicstore_repo::{Repo, build_repo};
use payment_gateway::{Gateway, SimulatedGateway, StripeGateway};

use config::{Config, GatewayKind};

/// Builds the payment gateway selected by configuration.
pub fn build_gateway(config: &Config) -> Gateway {
    match config.gateway {
        GatewayKind::Simulated => Gateway::Simulated(SimulatedGateway::new()),
        GatewayKind::Stripe => Gateway::Stripe(StripeGateway::new(&config.stripe_api_base)),
    }
}

/// Connects the repository, seeds it if asked, and assembles the server.
pub async fn build_server(config: &Config) -> anyhow::Result<HttpServer<Repo, Gateway>> {
    let repo = build_repo(&config.database_url).await?;

    if config.seed_sample_data && repo.seed_sample_data().await? {
        tracing::info!("Seeded sample catalog");
    }

    let settings = ServerSettings {
        payment_credential: config.payment_credential.clone(),
        currency: config.currency,
    };

    let mut server = HttpServer::new(repo, build_gateway(config), settings)
        .with_rate_limit(config.rate_limit_per_minute)
        .with_trusted_proxy_hops(config.trusted_proxy_hops);
    if let Some(origin) = &config.cors_origin {
        server = server.with_cors_origin(origin)?;
    }

    Ok(server)
}
