//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): forwarded requests by forwarder, status
//! - `proxy_upstream_duration_seconds` (histogram): upstream exchange latency
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one forwarded request.
pub fn record_forward(forwarder: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "forwarder" => forwarder,
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!("proxy_upstream_duration_seconds", "forwarder" => forwarder)
        .record(start.elapsed().as_secs_f64());
}
