//! Telemetry logic.
//! Support tracing, metrics and logging.
use metrics::{Unit, gauge};
use metrics_exporter_prometheus::{
    BuildError, PrometheusBuilder, PrometheusHandle,
};
use opentelemetry::global;
use opentelemetry::trace::TraceError;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::LogExporter;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::logs::{LogError, SdkLogger};
use opentelemetry_sdk::trace::SdkTracerProvider;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use std::time::Duration;

use crate::config;
use crate::error::BootstrapError;

const DEFAULT_FILTER: &str = "info";

fn ressources() -> Resource {
    Resource::builder().with_service_name("buildtrack").build()
}

/// Create tracer for OLTP.
pub fn setup_tracer(endpoint: &str) -> Result<SdkTracerProvider, TraceError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(ressources())
        .build())
}

/// Create recorder for Prometheus metrics.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    metrics::describe_gauge!(
        "process_cpu_usage",
        Unit::Percent,
        "CPU usage of the process in percentage."
    );
    metrics::describe_gauge!(
        "process_memory_used_bytes",
        Unit::Bytes,
        "Total process memory in bytes."
    );
    metrics::describe_counter!(
        "users_created_total",
        Unit::Count,
        "Users provisioned, labelled by the write that created the profile."
    );
    metrics::describe_counter!(
        "welcome_notifications_failed_total",
        Unit::Count,
        "Welcome notifications that could not be queued."
    );
    metrics::describe_counter!(
        "profile_updates_skipped_total",
        Unit::Count,
        "Profile updates left with no writable field."
    );

    let mut system = System::new_with_specifics(RefreshKind::nothing());
    let pid = Pid::from_u32(std::process::id());

    // Create a loop to update system information.
    // Wait 10 seconds before update it.
    tokio::spawn(async move {
        loop {
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                ProcessRefreshKind::nothing().with_memory().with_cpu(),
            );

            if let Some(process) = system.process(pid) {
                let memory_used = process.memory() as f64;
                let cpu_usage = process.cpu_usage() as f64;

                gauge!("process_memory_used_bytes").set(memory_used);
                gauge!("process_cpu_usage").set(cpu_usage);
            }

            sleep(Duration::from_secs(10)).await;
        }
    });

    PrometheusBuilder::new().install_recorder()
}

/// Create OLTP exporter for logs.
pub fn setup_logging(
    endpoint: &str,
) -> Result<OpenTelemetryTracingBridge<SdkLoggerProvider, SdkLogger>, LogError>
{
    let exporter = LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;
    let provider: SdkLoggerProvider = SdkLoggerProvider::builder()
        .with_resource(ressources())
        .with_batch_exporter(exporter)
        .build();
    Ok(OpenTelemetryTracingBridge::new(&provider))
}

/// Handles kept alive for as long as telemetry should be exported.
#[derive(Default)]
pub struct TelemetryGuard {
    /// Render with [`PrometheusHandle::render`] to expose metrics.
    pub metrics: Option<PrometheusHandle>,
    tracer: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(tracer) = self.tracer.take() {
            if let Err(err) = tracer.shutdown() {
                tracing::warn!(error = %err, "failed to flush traces");
            }
        }
    }
}

/// Install the global subscriber, and the exporters `config` asks for.
///
/// `RUST_LOG` overrides the default `info` filter. Must run inside a Tokio
/// runtime when metrics are enabled.
pub fn init(
    config: Option<&config::Telemetry>,
) -> Result<TelemetryGuard, BootstrapError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let endpoint = config.and_then(|c| c.otlp_endpoint.as_deref());

    let mut guard = TelemetryGuard::default();

    let bridge = match endpoint {
        Some(endpoint) => {
            let tracer =
                setup_tracer(endpoint).map_err(BootstrapError::telemetry)?;
            global::set_tracer_provider(tracer.clone());
            guard.tracer = Some(tracer);

            Some(setup_logging(endpoint).map_err(BootstrapError::telemetry)?)
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(bridge)
        .try_init()
        .map_err(BootstrapError::telemetry)?;

    if config.is_some_and(|c| c.metrics) {
        guard.metrics =
            Some(setup_metrics_recorder().map_err(BootstrapError::telemetry)?);
    }

    tracing::info!(otlp = endpoint.is_some(), "telemetry initialized");
    Ok(guard)
}
