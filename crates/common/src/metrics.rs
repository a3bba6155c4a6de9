use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static PLACES_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "placeshare_places_created_total",
        "Total places committed by the write coordinator"
    )
    .expect("register places_created_total")
});

pub static PLACES_DELETED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "placeshare_places_deleted_total",
        "Total places deleted by the write coordinator"
    )
    .expect("register places_deleted_total")
});

pub static MEDIA_COMPENSATIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "placeshare_media_compensations_total",
        "Uploaded media released because the owning record was never committed"
    )
    .expect("register media_compensations_total")
});

pub static COMPENSATION_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "placeshare_compensation_failures_total",
        "Compensating media deletes that failed and left an orphaned blob"
    )
    .expect("register compensation_failures_total")
});

pub static MEDIA_ORPHANED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "placeshare_media_orphaned_total",
        "Media left behind after a committed delete; needs out-of-band cleanup"
    )
    .expect("register media_orphaned_total")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_encoded_output() {
        MEDIA_ORPHANED_TOTAL.inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("placeshare_media_orphaned_total"));
    }
}
