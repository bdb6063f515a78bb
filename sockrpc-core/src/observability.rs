//! Logging, tracing and metrics setup
//!
//! The response pipeline reports through the `tracing` crate: every encoding
//! attempt is a `debug` event and every normalized encoding failure is an
//! `error` event, both tagged with the call's log signature. This module wires
//! those events (and the encoder's OpenTelemetry metrics) to an exporter.
//!
//! Call `init_observability` once at process start. Libraries and tests that
//! never call it still work; their events and metrics go to no-op sinks.
//!
//! # Environment Variables
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: Collector endpoint
//! - `RUST_LOG`: Log level filter (e.g., "info", "sockrpc_server=debug")
//!
//! ```rust,no_run
//! use sockrpc_core::ObservabilityConfig;
//!
//! let config = ObservabilityConfig::new("greeter")
//!     .with_endpoint("http://localhost:4317")
//!     .with_log_level("debug");
//!
//! sockrpc_core::init_observability(config).expect("Failed to init observability");
//! // ... serve calls ...
//! sockrpc_core::shutdown_observability();
//! ```

use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Providers installed by `init_observability`, kept for shutdown
struct Providers {
    tracer: Option<SdkTracerProvider>,
    meter: Option<SdkMeterProvider>,
}

static PROVIDERS: OnceLock<Providers> = OnceLock::new();

/// Observability configuration
///
/// # Defaults
///
/// - Service name: "sockrpc"
/// - Service version: the crate version
/// - OTLP endpoint: `$OTEL_EXPORTER_OTLP_ENDPOINT` or "http://localhost:4317"
/// - Traces and metrics enabled, JSON log output
/// - Log level: `$RUST_LOG` or "info"
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name attached to every span and metric
    pub service_name: String,
    /// Service version attached to every span and metric
    pub service_version: String,
    /// gRPC endpoint of the OpenTelemetry collector
    pub otlp_endpoint: String,
    /// Export spans over OTLP
    pub enable_traces: bool,
    /// Export metrics over OTLP
    pub enable_metrics: bool,
    /// Emit log lines as JSON (plain text otherwise)
    pub json_logs: bool,
    /// EnvFilter directive used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "sockrpc".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            enable_traces: true,
            enable_metrics: true,
            json_logs: true,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl ObservabilityConfig {
    /// Create a configuration with a custom service name and default settings
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    pub fn with_json_logs(mut self, enable: bool) -> Self {
        self.json_logs = enable;
        self
    }

    fn resource(&self) -> opentelemetry_sdk::Resource {
        opentelemetry_sdk::Resource::builder_empty()
            .with_attributes(vec![
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                    self.service_name.clone(),
                ),
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                    self.service_version.clone(),
                ),
            ])
            .build()
    }
}

/// Install the global tracing subscriber and OpenTelemetry providers
///
/// Call once. A second call fails because the global subscriber is already
/// set, and leaves the providers of the first call in place.
pub fn init_observability(config: ObservabilityConfig) -> Result<(), InitError> {
    let tracer_provider = if config.enable_traces {
        Some(build_tracer_provider(&config)?)
    } else {
        None
    };
    let meter_provider = if config.enable_metrics {
        match build_meter_provider(&config) {
            Ok(provider) => Some(provider),
            Err(err) => {
                shutdown_providers(tracer_provider.as_ref(), None);
                return Err(err);
            }
        }
    } else {
        None
    };

    install(&config, tracer_provider, meter_provider)?;

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        metrics = config.enable_metrics,
        "Observability initialized"
    );

    Ok(())
}

/// Set up the subscriber, then publish the providers as globals
///
/// Providers are only published once the subscriber is in place. On failure
/// they are shut down instead.
fn install(
    config: &ObservabilityConfig,
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
) -> Result<(), InitError> {
    let tracer = tracer_provider.as_ref().map(|provider| {
        use opentelemetry::trace::TracerProvider as _;
        provider.tracer(config.service_name.clone())
    });

    if let Err(err) = init_tracing_subscriber(config, tracer) {
        shutdown_providers(tracer_provider.as_ref(), meter_provider.as_ref());
        return Err(err);
    }

    if let Some(provider) = &tracer_provider {
        global::set_tracer_provider(provider.clone());
    }
    if let Some(provider) = &meter_provider {
        global::set_meter_provider(provider.clone());
    }
    let _ = PROVIDERS.set(Providers {
        tracer: tracer_provider,
        meter: meter_provider,
    });
    Ok(())
}

fn build_tracer_provider(config: &ObservabilityConfig) -> Result<SdkTracerProvider, InitError> {
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(config.resource())
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build();

    Ok(provider)
}

fn build_meter_provider(config: &ObservabilityConfig) -> Result<SdkMeterProvider, InitError> {
    use opentelemetry_otlp::WithExportConfig;

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(Duration::from_secs(30))
        .build();

    let provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(config.resource())
        .build();

    Ok(provider)
}

fn init_tracing_subscriber(
    config: &ObservabilityConfig,
    tracer: Option<opentelemetry_sdk::trace::Tracer>,
) -> Result<(), InitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    // Option<Layer> is itself a layer, so disabled parts drop out here
    let telemetry_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));
    let (json_layer, text_layer) = if config.json_logs {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .json();
        (Some(layer), None)
    } else {
        let layer = tracing_subscriber::fmt::layer().with_target(true);
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    Ok(())
}

/// Flush pending spans and metrics and stop the exporters
///
/// Does nothing if `init_observability` never ran. Calling it again only
/// logs a warning per provider.
pub fn shutdown_observability() {
    let Some(providers) = PROVIDERS.get() else {
        return;
    };
    tracing::info!("Shutting down observability");
    shutdown_providers(providers.tracer.as_ref(), providers.meter.as_ref());
}

fn shutdown_providers(tracer: Option<&SdkTracerProvider>, meter: Option<&SdkMeterProvider>) {
    if let Some(provider) = tracer {
        if let Err(err) = provider.shutdown() {
            tracing::warn!(error = %err, "Tracer provider shutdown failed");
        }
    }
    if let Some(provider) = meter {
        if let Err(err) = provider.shutdown() {
            tracing::warn!(error = %err, "Meter provider shutdown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.service_name, "sockrpc");
        assert!(config.enable_traces);
        assert!(config.enable_metrics);
        assert!(config.json_logs);
    }

    #[test]
    fn test_custom_config() {
        let config = ObservabilityConfig::new("greeter")
            .with_endpoint("http://custom:4317")
            .with_log_level("debug")
            .with_version("1.0.0")
            .with_traces(false)
            .with_json_logs(false);

        assert_eq!(config.service_name, "greeter");
        assert_eq!(config.otlp_endpoint, "http://custom:4317");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.service_version, "1.0.0");
        assert!(!config.enable_traces);
        assert!(!config.json_logs);
    }

    // Both steps share the process-wide subscriber, so they live in one test
    #[test]
    fn test_init_then_failed_reinit_stops_new_providers() {
        // Only installs the local subscriber; nothing tries to reach a collector
        let config = ObservabilityConfig::new("test-none")
            .with_traces(false)
            .with_metrics(false);
        assert!(init_observability(config.clone()).is_ok());

        // The subscriber is taken now, so the fresh provider must not leak
        let meter_provider = SdkMeterProvider::builder().build();
        let result = install(&config, None, Some(meter_provider.clone()));

        assert!(result.is_err());
        assert!(meter_provider.shutdown().is_err());
        assert!(PROVIDERS
            .get()
            .map(|providers| providers.meter.is_none())
            .unwrap_or(false));
    }

    #[test]
    fn test_shutdown_without_exporters() {
        shutdown_observability();
        shutdown_observability();
    }
}
