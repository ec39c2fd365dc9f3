use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};
use tracing::trace;

use crate::errors::ServiceError;

lazy_static! {
    pub static ref REQUEST_SUBMISSIONS: IntCounterVec = register_int_counter_vec!(
        "request_submissions_total",
        "Total number of submitted requests",
        &["kind"]
    )
    .expect("metric can be created");

    pub static ref REQUEST_APPROVALS: IntCounterVec = register_int_counter_vec!(
        "request_approvals_total",
        "Total number of approved requests",
        &["kind"]
    )
    .expect("metric can be created");

    pub static ref REQUEST_REJECTIONS: IntCounterVec = register_int_counter_vec!(
        "request_rejections_total",
        "Total number of rejected requests",
        &["kind"]
    )
    .expect("metric can be created");

    pub static ref REQUEST_TRANSITION_FAILURES: IntCounterVec = register_int_counter_vec!(
        "request_transition_failures_total",
        "Total number of failed request operations",
        &["kind", "error"]
    )
    .expect("metric can be created");

    pub static ref STOCK_ADJUSTMENTS: IntCounterVec = register_int_counter_vec!(
        "stock_adjustments_total",
        "Total number of stock quantity changes",
        &["direction"]
    )
    .expect("metric can be created");
}

/// Counts a failed operation on a request of `kind` and hands the error back.
pub fn record_failure(kind: &str, err: ServiceError) -> ServiceError {
    trace!(kind, error = err.kind(), "recording request failure");
    REQUEST_TRANSITION_FAILURES
        .with_label_values(&[kind, err.kind()])
        .inc();
    err
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
