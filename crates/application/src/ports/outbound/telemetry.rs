//! Interface for observability.

use crate::dto::ProvisionPath;

/// Port for telemetry/observability operations.
pub trait TelemetryPort: Send + Sync {
    /// Record a new user, and which write materialized the profile.
    fn record_user_created(&self, user_id: &str, path: ProvisionPath);

    /// Record a welcome notification that could not be sent.
    fn record_welcome_failed(&self, user_id: &str);

    /// Record an update request that had nothing left to write.
    fn record_update_skipped(&self, user_id: &str);
}
