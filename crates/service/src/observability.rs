use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "resource_operations_total",
        "Resource service operations by entity, operation and outcome",
        &["entity", "operation", "outcome"]
    )
    .expect("register resource_operations_total")
});

pub static OPERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "resource_operation_duration_seconds",
        "Resource service operation duration in seconds",
        &["entity", "operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("register resource_operation_duration_seconds")
});

/// Record one finished operation. `outcome` is `ok` or a `ServiceError::kind`.
pub fn record(entity: &str, operation: &str, outcome: &str, elapsed_secs: f64) {
    OPERATIONS_TOTAL.with_label_values(&[entity, operation, outcome]).inc();
    OPERATION_DURATION.with_label_values(&[entity, operation]).observe(elapsed_secs);
}

/// Render the default registry in the text exposition format.
pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).map_err(|e| format!("metrics encode error: {e}"))?;
    String::from_utf8(buffer).map_err(|e| format!("metrics encode error: {e}"))
}
