//! Telemetry wiring for the server process.
//!
//! Sets up diagnostic logging and builds the span exporter and log sink that
//! back [`shared::telemetry::Telemetry`]. Completed spans are shipped over
//! OTLP/gRPC through a batch span processor when a collector endpoint is
//! configured; delivery failures stay inside the OpenTelemetry SDK and never
//! reach request handling.

use crate::config::Config;
use anyhow::{Context as _, Result};
use opentelemetry::trace::{Span as _, SpanBuilder, Status, Tracer as _, TracerProvider as _};
use opentelemetry::{Context, KeyValue, Value};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use shared::models::{Span, SpanKind, SpanStatus};
use shared::telemetry::{JsonLinesFileSink, SpanExporter, Telemetry, TracingSpanExporter};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Installs the global `tracing` subscriber for diagnostic output.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Builds the telemetry bundle described by `config`.
///
/// # Errors
///
/// Returns an error if the structured log file cannot be opened or the
/// request counters cannot be registered.
pub fn build_telemetry(config: &Config) -> Result<Telemetry> {
    let sink = JsonLinesFileSink::open(&config.log_file)
        .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;

    let exporter = build_span_exporter(config);
    let telemetry = Telemetry::new(config.service_name.as_str(), exporter, Arc::new(sink))
        .context("Failed to register request counters")?;
    Ok(telemetry)
}

/// Builds the span exporter for `config`.
///
/// Falls back to [`TracingSpanExporter`] when no endpoint is configured or the
/// OTLP exporter cannot be created.
#[must_use]
pub fn build_span_exporter(config: &Config) -> Arc<dyn SpanExporter> {
    let Some(endpoint) = config.otlp_endpoint.as_deref() else {
        tracing::info!("No OTLP endpoint configured, spans go to diagnostic output");
        return Arc::new(TracingSpanExporter);
    };

    match OtlpSpanExporter::new(endpoint, &config.service_name) {
        Ok(exporter) => {
            tracing::info!(endpoint, "OTLP span exporter configured");
            Arc::new(exporter)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to create OTLP exporter, spans go to diagnostic output"
            );
            Arc::new(TracingSpanExporter)
        }
    }
}

/// Span exporter that replays completed spans into an OpenTelemetry tracer.
pub struct OtlpSpanExporter {
    provider: SdkTracerProvider,
    tracer: SdkTracer,
}

impl OtlpSpanExporter {
    /// Creates an exporter batching spans to the collector at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the OTLP exporter cannot be built.
    pub fn new(endpoint: &str, service_name: &str) -> Result<Self> {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .with_timeout(Duration::from_secs(3))
            .build()?;

        let provider = SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(
                Resource::builder_empty()
                    .with_service_name(service_name.to_string())
                    .with_attributes([KeyValue::new(
                        "service.version",
                        env!("CARGO_PKG_VERSION"),
                    )])
                    .build(),
            )
            .build();
        let tracer = provider.tracer(service_name.to_string());

        Ok(Self { provider, tracer })
    }
}

impl SpanExporter for OtlpSpanExporter {
    fn export(&self, span: Span) {
        let events = span
            .events
            .iter()
            .map(|event| {
                opentelemetry::trace::Event::new(
                    event.name.clone(),
                    SystemTime::from(event.timestamp),
                    to_key_values(&event.attributes),
                    0,
                )
            })
            .collect();

        let builder = SpanBuilder::from_name(span.name.clone())
            .with_kind(to_otel_kind(span.kind))
            .with_start_time(SystemTime::from(span.start_time))
            .with_attributes(to_key_values(&span.attributes))
            .with_events(events);

        let mut otel_span = self.tracer.build_with_context(builder, &Context::new());
        if let Some(status) = to_otel_status(span.status) {
            otel_span.set_status(status);
        }
        otel_span.end_with_timestamp(SystemTime::from(span.end_time));
    }

    fn shutdown(&self) {
        if let Err(e) = self.provider.shutdown() {
            tracing::warn!(error = %e, "Failed to flush spans on shutdown");
        }
    }
}

impl std::fmt::Debug for OtlpSpanExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtlpSpanExporter").finish_non_exhaustive()
    }
}

fn to_otel_kind(kind: SpanKind) -> opentelemetry::trace::SpanKind {
    match kind {
        SpanKind::Internal => opentelemetry::trace::SpanKind::Internal,
        SpanKind::Server => opentelemetry::trace::SpanKind::Server,
    }
}

fn to_otel_status(status: SpanStatus) -> Option<Status> {
    match status {
        SpanStatus::Unset => None,
        SpanStatus::Ok => Some(Status::Ok),
        SpanStatus::Error => Some(Status::error("")),
    }
}

fn to_key_values(attributes: &[(String, serde_json::Value)]) -> Vec<KeyValue> {
    attributes
        .iter()
        .map(|(key, value)| KeyValue::new(key.clone(), to_otel_value(value)))
        .collect()
}

fn to_otel_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::I64(i),
            None => Value::F64(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Value::from(s.clone()),
        other => Value::from(other.to_string()),
    }
}
