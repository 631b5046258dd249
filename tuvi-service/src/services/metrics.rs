//! Prometheus metrics for tuvi-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    provider_latency_seconds: HistogramVec,
    provider_errors_total: IntCounterVec,
    lunar_fallbacks_total: IntCounter,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

fn build() -> Result<Metrics, prometheus::Error> {
    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new("tuvi_requests_total", "Total HTTP requests by endpoint and status"),
        &["endpoint", "status"],
    )?;

    let provider_latency_seconds = HistogramVec::new(
        HistogramOpts::new(
            "genai_provider_latency_seconds",
            "AI provider API latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["provider", "operation"],
    )?;

    let provider_errors_total = IntCounterVec::new(
        Opts::new("genai_provider_errors_total", "Total AI provider errors"),
        &["provider", "error_type"],
    )?;

    let lunar_fallbacks_total = IntCounter::new(
        "lunar_conversion_fallbacks_total",
        "Birth dates that could not be converted to the lunar calendar",
    )?;

    registry.register(Box::new(requests_total.clone()))?;
    registry.register(Box::new(provider_latency_seconds.clone()))?;
    registry.register(Box::new(provider_errors_total.clone()))?;
    registry.register(Box::new(lunar_fallbacks_total.clone()))?;

    Ok(Metrics {
        registry,
        requests_total,
        provider_latency_seconds,
        provider_errors_total,
        lunar_fallbacks_total,
    })
}

fn metrics() -> Option<&'static Metrics> {
    METRICS
        .get_or_init(|| match build() {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize metrics");
                None
            }
        })
        .as_ref()
}

/// Initialize all metrics. Safe to call more than once.
pub fn init_metrics() {
    if metrics().is_some() {
        tracing::info!("Prometheus metrics initialized");
    }
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let Some(m) = metrics() else {
        return "# Metrics registry not initialized\n".to_string();
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    if let Err(e) = encoder.encode(&m.registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
        format!("# Failed to convert metrics to UTF-8: {}\n", e)
    })
}

/// Record a finished HTTP request.
pub fn record_request(endpoint: &str, status: u16) {
    if let Some(m) = metrics() {
        let status = status.to_string();
        m.requests_total
            .with_label_values(&[endpoint, status.as_str()])
            .inc();
    }
}

/// Record provider latency.
pub fn record_provider_latency(provider: &str, operation: &str, duration_secs: f64) {
    if let Some(m) = metrics() {
        m.provider_latency_seconds
            .with_label_values(&[provider, operation])
            .observe(duration_secs);
    }
}

/// Record a provider error.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(m) = metrics() {
        m.provider_errors_total
            .with_label_values(&[provider, error_type])
            .inc();
    }
}

pub fn record_lunar_fallback() {
    if let Some(m) = metrics() {
        m.lunar_fallbacks_total.inc();
    }
}
