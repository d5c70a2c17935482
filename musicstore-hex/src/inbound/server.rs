//! HTTP Server configuration and startup.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    Json, Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use musicstore_types::{PaymentGateway, Store};

use super::handlers::{self, AppState};
use super::rate_limit::{DEFAULT_REQUESTS_PER_MINUTE, RateLimiterState, rate_limit_middleware};
use crate::openapi::ApiDoc;
use crate::{CartService, CatalogService};

/// HTTP Server for the Music Store API.
pub struct HttpServer<S: Store, G: PaymentGateway> {
    state: Arc<AppState<S, G>>,
    rate_limiter: Arc<RateLimiterState>,
    requests_per_minute: NonZeroU32,
    trusted_proxy_hops: usize,
    cors: CorsLayer,
}

impl<S: Store, G: PaymentGateway> HttpServer<S, G> {
    /// Creates a server over one store and gateway.
    ///
    /// Defaults: 100 requests per minute per client keyed by peer address,
    /// any CORS origin.
    pub fn new(store: S, gateway: G, settings: ServerSettings) -> Self {
        let cart = CartService::new(store.clone(), gateway, settings.currency);
        let catalog = CatalogService::new(store);

        Self {
            state: Arc::new(AppState {
                cart,
                catalog,
                payment_credential: settings.payment_credential,
            }),
            rate_limiter: Arc::new(RateLimiterState::default()),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            trusted_proxy_hops: 0,
            cors: cors_any(),
        }
    }

    /// Replaces the per-client request quota.
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self.rebuild_rate_limiter()
    }

    /// Trusts this many reverse proxies' `X-Forwarded-For` entries when
    /// telling clients apart.
    pub fn with_trusted_proxy_hops(mut self, hops: usize) -> Self {
        self.trusted_proxy_hops = hops;
        self.rebuild_rate_limiter()
    }

    fn rebuild_rate_limiter(mut self) -> Self {
        self.rate_limiter = Arc::new(
            RateLimiterState::per_minute(self.requests_per_minute)
                .with_trusted_proxy_hops(self.trusted_proxy_hops),
        );
        self
    }

    /// Restricts CORS to a single origin.
    pub fn with_cors_origin(mut self, origin: &str) -> anyhow::Result<Self> {
        let origin: HeaderValue = origin
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", origin, e))?;
        self.cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any);
        Ok(self)
    }

    /// Shared application state, for callers that need the services directly.
    pub fn state(&self) -> &Arc<AppState<S, G>> {
        &self.state
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api-docs/openapi.json", get(openapi_json))
            .route("/api/genres", get(handlers::list_genres::<S, G>))
            .route("/api/albums", get(handlers::list_albums::<S, G>))
            .route("/api/albums/{id}", get(handlers::get_album::<S, G>))
            .route(
                "/api/carts/{cart_id}",
                get(handlers::get_cart::<S, G>).delete(handlers::empty_cart::<S, G>),
            )
            .route(
                "/api/carts/{cart_id}/items",
                post(handlers::add_to_cart::<S, G>),
            )
            .route(
                "/api/carts/{cart_id}/checkout",
                post(handlers::checkout::<S, G>),
            )
            .route(
                "/api/cart-items/{id}",
                delete(handlers::remove_cart_item::<S, G>),
            )
            .route("/api/orders/{id}", get(handlers::get_order::<S, G>))
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(self.cors.clone())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let app = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

/// Per-deployment settings the services need.
#[derive(Clone)]
pub struct ServerSettings {
    /// Secret key sent with every charge
    pub payment_credential: String,
    pub currency: musicstore_types::Currency,
}

fn cors_any() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
