//! Metrics sink port (§4.12).
//!
//! No concrete metrics backend is specified; this port lets `tracing` events
//! be bridged to one later without the domain or application layers taking a
//! dependency on a specific metrics crate.

/// Labeled numeric observation emitted by a component.
pub trait MetricsSink: Send + Sync {
    /// Increment a named counter by `value`.
    fn increment_counter(&self, name: &str, value: u64, labels: &[(&str, &str)]);

    /// Record a single observation into a named histogram (e.g. duration_ms).
    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]);

    /// Set a named gauge to an absolute value (e.g. outbox queue depth).
    fn set_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]);
}
