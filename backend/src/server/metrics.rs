//! Prometheus request metrics, compiled in with the `metrics` feature.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};

const NAMESPACE: &str = "karigari";
const ENDPOINT: &str = "/metrics";

/// Request metrics middleware that also serves `GET /metrics`.
///
/// # Errors
/// Returns [`std::io::Error`] when the collectors cannot be registered.
pub(crate) fn build_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new(NAMESPACE)
        .endpoint(ENDPOINT)
        .build()
        .map_err(|err| std::io::Error::other(format!("metrics registration failed: {err}")))
}
