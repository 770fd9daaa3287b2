//! Telemetry adapters - Observability implementations.

use application::dto::ProvisionPath;
use application::ports::outbound::TelemetryPort;

const USERS_CREATED: &str = "users_created_total";
const WELCOME_FAILED: &str = "welcome_notifications_failed_total";
const UPDATES_SKIPPED: &str = "profile_updates_skipped_total";

/// Telemetry adapter emitting `metrics` counters alongside tracing events.
///
/// Counters go to whatever recorder is installed; without one they are
/// no-ops.
#[derive(Default)]
pub struct MetricsTelemetry;

impl MetricsTelemetry {
    /// Create a new [`MetricsTelemetry`].
    pub fn new() -> Self {
        Self
    }
}

impl TelemetryPort for MetricsTelemetry {
    fn record_user_created(&self, user_id: &str, path: ProvisionPath) {
        tracing::info!(user_id, path = path.as_str(), "user created");
        metrics::counter!(USERS_CREATED, "path" => path.as_str()).increment(1);
    }

    fn record_welcome_failed(&self, user_id: &str) {
        tracing::debug!(user_id, "welcome notification failure recorded");
        metrics::counter!(WELCOME_FAILED).increment(1);
    }

    fn record_update_skipped(&self, user_id: &str) {
        tracing::debug!(user_id, "empty profile update recorded");
        metrics::counter!(UPDATES_SKIPPED).increment(1);
    }
}
