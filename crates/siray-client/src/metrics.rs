//! Request metrics.
//!
//! Counters and latency histograms for API and store calls. Nothing is
//! exported from here; install a `metrics` recorder in the host process to
//! collect them.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total API requests by method and status.
    pub const REQUESTS_TOTAL: &str = "siray_requests_total";

    /// Request latency in seconds by method.
    pub const LATENCY_SECONDS: &str = "siray_request_latency_seconds";

    /// Status queries issued by the poller.
    pub const POLLS_TOTAL: &str = "siray_task_polls_total";

    /// Object store calls by operation and outcome.
    pub const STORE_CALLS_TOTAL: &str = "siray_store_calls_total";

    /// Object store call latency in seconds by operation.
    pub const STORE_LATENCY_SECONDS: &str = "siray_store_latency_seconds";
}

/// Record metrics for a completed API request. Status 0 means no response.
pub fn record_request(method: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "method" => method.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record one status query.
pub fn record_poll(kind: &str) {
    counter!(names::POLLS_TOTAL, "kind" => kind.to_string()).increment(1);
}

/// Record one object store call.
pub fn record_store_call(operation: &str, success: bool, latency_ms: f64) {
    counter!(
        names::STORE_CALLS_TOTAL,
        "operation" => operation.to_string(),
        "outcome" => if success { "ok" } else { "error" }
    )
    .increment(1);

    histogram!(
        names::STORE_LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_request("GET", 200, 12.0);
        record_request("POST", 0, 1.0);
        record_poll("image");
        record_store_call("UploadPart", false, 3.0);
    }
}
