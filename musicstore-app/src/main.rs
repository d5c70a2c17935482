//! # Music Store Server
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Install logging (and OTLP export when configured)
//! - Initialize the repository adapter and payment gateway
//! - Start the HTTP server

use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use musicstore_app::{
    build_server,
    config::{Config, LogFormat},
};

fn init_tracer(endpoint: &str) -> anyhow::Result<sdktrace::SdkTracerProvider> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());
    Ok(provider)
}

fn init_logging(config: &Config) -> anyhow::Result<Option<sdktrace::SdkTracerProvider>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,musicstore_app=debug,musicstore_hex=debug".into());

    let fmt = match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    let provider = config.otlp_endpoint.as_deref().map(init_tracer).transpose()?;
    let telemetry = provider.as_ref().map(|p| {
        use opentelemetry::trace::TracerProvider as _;
        tracing_opentelemetry::layer().with_tracer(p.tracer("musicstore-server"))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt)
        .with(telemetry)
        .try_init()?;

    Ok(provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let otel_provider = init_logging(&config)?;

    tracing::info!("Starting music store server on port {}", config.port);
    tracing::info!(gateway = ?config.gateway, currency = %config.currency, "Payment settings");

    // Connects, migrates and seeds the repository
    let server = build_server(&config).await?;
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        let _ = provider.shutdown();
    }
    Ok(())
}
