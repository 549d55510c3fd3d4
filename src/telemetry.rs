//! Tracing subscriber setup with optional OTLP span export

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;

/// Keeps the span exporter alive; flushes and shuts it down on drop.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Flush all pending spans
    pub fn flush(&self) {
        if let Some(ref provider) = self.provider
            && let Err(e) = provider.force_flush()
        {
            warn!("Failed to flush pending spans: {}", e);
        }
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        self.flush();
        if let Some(provider) = self.provider.take()
            && let Err(e) = provider.shutdown()
        {
            warn!("Failed to shut down span exporter: {}", e);
        }
    }
}

/// Level directive for the subscriber; `verbose` forces `debug`
pub fn filter_directive(logging: &LoggingConfig, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        logging.level.clone()
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Spans are exported
/// over OTLP/HTTP only when `logging.otlp_endpoint` is set.
pub fn init_telemetry(logging: &LoggingConfig, verbose: bool) -> Result<TelemetryGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(logging, verbose)));

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if logging.format == "json" {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    let provider = match &logging.otlp_endpoint {
        Some(endpoint) => {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_http()
                .with_endpoint(endpoint)
                .build()
                .with_context(|| format!("Failed to create OTLP exporter for {endpoint}"))?;

            Some(
                SdkTracerProvider::builder()
                    .with_batch_exporter(exporter)
                    .with_resource(
                        opentelemetry_sdk::Resource::builder()
                            .with_service_name(logging.service_name.clone())
                            .build(),
                    )
                    .build(),
            )
        }
        None => None,
    };

    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(logging.service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(otel_layer)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(TelemetryGuard { provider })
}
