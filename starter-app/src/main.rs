//! # Starter Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter
//! - Build the payment gateway and identity provider adapters
//! - Create the application service
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use anyhow::Context;
use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    metrics::SdkMeterProvider, propagation::TraceContextPropagator, trace as sdktrace,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use starter_hex::{AppService, HttpServer};
use starter_repo::{ClerkConfig, ClerkIdentity, RazorpayConfig, RazorpayGateway, build_repo};

use config::{Config, LogFormat};

/// OpenTelemetry providers kept alive for the lifetime of the process.
struct Telemetry {
    tracer: sdktrace::Tracer,
    tracer_provider: sdktrace::SdkTracerProvider,
    meter_provider: SdkMeterProvider,
}

impl Telemetry {
    fn shutdown(self) {
        let _ = self.tracer_provider.shutdown();
        let _ = self.meter_provider.shutdown();
    }
}

fn init_telemetry(endpoint: &str) -> anyhow::Result<Telemetry> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("failed to create OTLP span exporter")?;

    let tracer_provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .build();
    global::set_tracer_provider(tracer_provider.clone());

    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("failed to create OTLP metric exporter")?;

    // HTTP metrics layer reads the global meter provider
    let meter_provider = SdkMeterProvider::builder()
        .with_periodic_exporter(metric_exporter)
        .build();
    global::set_meter_provider(meter_provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok(Telemetry {
        tracer: tracer_provider.tracer("starter-service"),
        tracer_provider,
        meter_provider,
    })
}

fn init_tracing(config: &Config) -> anyhow::Result<Option<Telemetry>> {
    let telemetry = config
        .otlp_endpoint
        .as_deref()
        .map(init_telemetry)
        .transpose()?;
    let otel_layer = telemetry
        .as_ref()
        .map(|t| tracing_opentelemetry::layer().with_tracer(t.tracer.clone()));

    let json = config.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,starter_app=debug,starter_hex=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .with(otel_layer)
        .init();

    Ok(telemetry)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    let telemetry = init_tracing(&config)?;

    tracing::info!("Starting starter server on port {}", config.port);
    if telemetry.is_some() {
        tracing::info!("Exporting telemetry over OTLP");
    }

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;

    let mut razorpay = RazorpayConfig::new(
        &config.razorpay_key_id,
        &config.razorpay_key_secret,
        &config.razorpay_webhook_secret,
    );
    if let Some(url) = &config.razorpay_api_url {
        razorpay = razorpay.with_api_base_url(url);
    }
    let gateway = RazorpayGateway::new(razorpay)?;

    let mut clerk = ClerkConfig::new(
        &config.clerk_secret_key,
        config.clerk_webhook_secret.clone(),
    );
    if let Some(url) = &config.clerk_api_url {
        clerk = clerk.with_api_base_url(url);
    }
    if clerk.webhook_secret.is_none() {
        tracing::warn!("CLERK_WEBHOOK_SECRET not set; identity webhooks will be refused");
    }
    let identity = ClerkIdentity::new(clerk, &config.clerk_jwt_key)?;

    // Create the application service
    let service = AppService::new(repo, Arc::new(gateway), Arc::new(identity));

    // Create and run the HTTP server
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces and metrics are flushed before exit
    if let Some(telemetry) = telemetry {
        telemetry.shutdown();
    }
    Ok(())
}
