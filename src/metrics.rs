use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::{
    opts, register_histogram_vec, register_int_counter_vec, register_int_gauge, Encoder,
    HistogramVec, IntCounterVec, IntGauge, TextEncoder,
};

pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!(
            "reelgate_requests_total",
            "Total number of HTTP requests processed by the gateway"
        ),
        &["method", "route", "status"]
    )
    .unwrap()
});

pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "reelgate_request_duration_seconds",
        "Histogram of HTTP request durations in seconds",
        &["method", "route"]
    )
    .unwrap()
});

/// Composite upstream health: 1 when every backend probe passes, 0 otherwise.
pub static SERVICE_HEALTH: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(opts!(
        "reelgate_service_health_status",
        "Aggregate health of upstream services: 1=healthy, 0=degraded"
    ))
    .unwrap()
});

pub fn gather_metrics() -> Result<String> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode(&metric_families, &mut buffer)?;

    Ok(String::from_utf8(buffer)?)
}
