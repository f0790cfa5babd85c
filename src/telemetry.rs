//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `profile_client_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `operation`: RPC invoked ("get_by_id", "get_by_contact", "create")
//! - `status`: outcome: "ok" or the error kind (see [`ProfileError::kind`](crate::ProfileError::kind))

/// Total operations issued through a client.
///
/// Labels: `operation`, `status`.
pub const REQUESTS_TOTAL: &str = "profile_client_requests_total";

/// Operation duration in seconds, including time spent waiting on the deadline.
///
/// Labels: `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "profile_client_request_duration_seconds";

/// Milliseconds in `duration`, saturating at `u64::MAX`, for log fields.
pub(crate) fn duration_to_u64_ms(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
