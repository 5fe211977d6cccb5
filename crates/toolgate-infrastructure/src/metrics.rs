//! Tracing-event bridge implementation of the [`MetricsSink`] port (§4.12).
//!
//! No concrete metrics backend is wired yet; per the port's doc comment this
//! emits structured `tracing` events an operator can scrape with any
//! `tracing`-compatible metrics layer (e.g. `tracing-opentelemetry`) without
//! this crate or the domain depending on one directly.

use toolgate_domain::ports::MetricsSink;

fn format_labels(labels: &[(&str, &str)]) -> String {
    labels.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(",")
}

/// Bridges counter/histogram/gauge observations to `tracing::info!` events.
#[derive(Debug, Default)]
pub struct TracingMetricsSink;

impl TracingMetricsSink {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for TracingMetricsSink {
    fn increment_counter(&self, name: &str, value: u64, labels: &[(&str, &str)]) {
        tracing::info!(metric.kind = "counter", metric.name = name, metric.value = value, metric.labels = %format_labels(labels), "metric");
    }

    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        tracing::info!(metric.kind = "histogram", metric.name = name, metric.value = value, metric.labels = %format_labels(labels), "metric");
    }

    fn set_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        tracing::info!(metric.kind = "gauge", metric.name = name, metric.value = value, metric.labels = %format_labels(labels), "metric");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_without_panicking() {
        let sink = TracingMetricsSink::new();
        sink.increment_counter("toolgate.calls_total", 1, &[("tool", "file_read")]);
        sink.record_histogram("toolgate.call_duration_ms", 12.5, &[("tool", "file_read")]);
        sink.set_gauge("toolgate.outbox_depth", 3.0, &[]);
    }
}
