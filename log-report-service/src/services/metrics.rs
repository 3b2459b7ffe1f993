//! Prometheus metrics for log-report-service.
//!
//! Recording functions are no-ops until [`init_metrics`] has run, so library
//! callers and unit tests need no setup.

use crate::pipeline::ReportKind;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;
use std::time::Duration;

struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    upstream_latency_seconds: HistogramVec,
    upstream_errors_total: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Initialize all metrics. Safe to call more than once; later calls are ignored.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new(
            "log_report_requests_total",
            "Report requests by variant and outcome",
        ),
        &["kind", "outcome"],
    )?;

    let upstream_latency_seconds = HistogramVec::new(
        HistogramOpts::new(
            "log_report_upstream_latency_seconds",
            "Latency of the text-generation call in seconds",
        )
        .buckets(vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0]),
        &["kind"],
    )?;

    let upstream_errors_total = IntCounterVec::new(
        Opts::new(
            "log_report_upstream_errors_total",
            "Failed text-generation calls by variant and error type",
        ),
        &["kind", "error_type"],
    )?;

    registry.register(Box::new(requests_total.clone()))?;
    registry.register(Box::new(upstream_latency_seconds.clone()))?;
    registry.register(Box::new(upstream_errors_total.clone()))?;

    let _ = METRICS.set(Metrics {
        registry,
        requests_total,
        upstream_latency_seconds,
        upstream_errors_total,
    });

    Ok(())
}

pub fn record_request(kind: ReportKind, outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.requests_total
            .with_label_values(&[kind.as_str(), outcome])
            .inc();
    }
}

pub fn observe_upstream_latency(kind: ReportKind, elapsed: Duration) {
    if let Some(m) = METRICS.get() {
        m.upstream_latency_seconds
            .with_label_values(&[kind.as_str()])
            .observe(elapsed.as_secs_f64());
    }
}

pub fn record_upstream_error(kind: ReportKind, error_type: &str) {
    if let Some(m) = METRICS.get() {
        m.upstream_errors_total
            .with_label_values(&[kind.as_str(), error_type])
            .inc();
    }
}

/// Render the registry in the Prometheus text format.
pub fn get_metrics() -> String {
    let Some(m) = METRICS.get() else {
        return "# Metrics registry not initialized\n".to_string();
    };

    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&m.registry.gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return format!("# Failed to encode metrics: {}\n", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Metrics output is not UTF-8: {}", e);
        String::new()
    })
}
