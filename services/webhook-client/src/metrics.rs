//! Prometheus metrics exposition
//!
//! - `webhook_deliveries_total` (counter): label `outcome`
//! - `oauth_requests_total` (counter): labels `phase`, `outcome`
//! - `message_log_errors_total` (counter): label `op`

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Record the outcome of a webhook delivery: `valid`, `invalid_hmac` or `malformed`.
pub fn record_webhook(outcome: &'static str) {
    metrics::counter!("webhook_deliveries_total", "outcome" => outcome).increment(1);
}

/// Record an OAuth handler outcome: `redirect`, `invalid_hmac` or `error`.
pub fn record_oauth(phase: &'static str, outcome: &'static str) {
    metrics::counter!("oauth_requests_total", "phase" => phase, "outcome" => outcome)
        .increment(1);
}

/// Record a failed message log operation: `append` or `read`.
pub fn record_log_error(op: &'static str) {
    metrics::counter!("message_log_errors_total", "op" => op).increment(1);
}
