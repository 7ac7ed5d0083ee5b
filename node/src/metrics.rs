//! # Prometheus Metrics
//!
//! Counters for signing and callback verification, scraped from `/metrics`
//! on the dedicated metrics port. Everything lives in a private
//! [`prometheus::Registry`] with the `donation` prefix.
//!
//! No label ever carries a txnid, amount, or donor field.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metric handles for the service. Cheap to clone.
#[derive(Clone)]
pub struct DonationMetrics {
    registry: Registry,
    /// Payment requests signed and returned to a client.
    pub payments_signed_total: IntCounter,
    /// Callbacks whose hash matched.
    pub callbacks_verified_total: IntCounter,
    /// Callbacks whose hash (or key) did not match.
    pub callbacks_rejected_total: IntCounter,
    /// Requests refused for missing fields.
    pub validation_errors_total: IntCounter,
    /// Resolved callback outcomes, labelled by `disposition`.
    pub outcomes_total: IntCounterVec,
    /// Time spent normalizing and hashing a payment request.
    pub signing_latency_seconds: Histogram,
}

impl DonationMetrics {
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("donation".into()), None)
            .expect("failed to create prometheus registry");

        let payments_signed_total = IntCounter::new(
            "payments_signed_total",
            "Total number of payment requests signed",
        )
        .expect("metric creation");
        registry
            .register(Box::new(payments_signed_total.clone()))
            .expect("metric registration");

        let callbacks_verified_total = IntCounter::new(
            "callbacks_verified_total",
            "Total number of gateway callbacks with a matching hash",
        )
        .expect("metric creation");
        registry
            .register(Box::new(callbacks_verified_total.clone()))
            .expect("metric registration");

        let callbacks_rejected_total = IntCounter::new(
            "callbacks_rejected_total",
            "Total number of gateway callbacks that failed verification",
        )
        .expect("metric creation");
        registry
            .register(Box::new(callbacks_rejected_total.clone()))
            .expect("metric registration");

        let validation_errors_total = IntCounter::new(
            "validation_errors_total",
            "Total number of requests rejected for missing required fields",
        )
        .expect("metric creation");
        registry
            .register(Box::new(validation_errors_total.clone()))
            .expect("metric registration");

        let outcomes_total = IntCounterVec::new(
            Opts::new("outcomes_total", "Resolved callback outcomes by disposition"),
            &["disposition"],
        )
        .expect("metric creation");
        registry
            .register(Box::new(outcomes_total.clone()))
            .expect("metric registration");

        // Hashing is sub-millisecond.
        let signing_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "signing_latency_seconds",
                "Time to normalize and hash a payment request, in seconds",
            )
            .buckets(vec![
                0.000_01, 0.000_025, 0.000_05, 0.000_1, 0.000_25, 0.000_5, 0.001, 0.005, 0.01,
            ]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(signing_latency_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            payments_signed_total,
            callbacks_verified_total,
            callbacks_rejected_total,
            validation_errors_total,
            outcomes_total,
            signing_latency_seconds,
        }
    }

    /// Renders every registered metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for DonationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared metrics handle passed to axum handlers as state.
pub type SharedMetrics = Arc<DonationMetrics>;

/// Serves `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_are_prefixed() {
        let metrics = DonationMetrics::new();
        metrics.payments_signed_total.inc();
        metrics
            .outcomes_total
            .with_label_values(&["success"])
            .inc();

        let text = metrics.encode().unwrap();
        assert!(text.contains("donation_payments_signed_total 1"));
        assert!(text.contains("donation_outcomes_total{disposition=\"success\"} 1"));
    }

    #[test]
    fn registries_are_independent() {
        let a = DonationMetrics::new();
        let b = DonationMetrics::new();
        a.callbacks_rejected_total.inc();
        assert_eq!(b.callbacks_rejected_total.get(), 0);
    }
}
