// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics,
    GALLERY_ENTRIES,
    GALLERY_OPERATIONS,
    REQUESTS_TOTAL,
    REQUEST_DURATION,
    UPSTREAM_CALLS,
    UPSTREAM_DURATION,
};

/// Helper to record gateway request metrics
pub fn record_request(method: &str, endpoint: &str, status_code: u16, duration_secs: f64) {
    let status = status_code.to_string();
    REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status])
        .inc();

    REQUEST_DURATION
        .with_label_values(&[method, endpoint, &status])
        .observe(duration_secs);
}

/// Helper to record processing service call metrics
pub fn record_upstream_call(endpoint: &str, outcome: &str, duration_secs: f64) {
    UPSTREAM_CALLS
        .with_label_values(&[endpoint, outcome])
        .inc();

    UPSTREAM_DURATION
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}

/// Helper to record gallery operations
pub fn record_gallery_operation(operation: &str, count: u64) {
    if count > 0 {
        GALLERY_OPERATIONS
            .with_label_values(&[operation])
            .inc_by(count as f64);
    }
}

pub fn update_gallery_entries(count: usize) {
    GALLERY_ENTRIES.set(count as f64);
}
