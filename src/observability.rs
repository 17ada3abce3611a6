use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: availability lookups served.
pub const AVAILABILITY_QUERIES_TOTAL: &str = "roomgrid_availability_queries_total";

/// Counter: reservations committed.
pub const RESERVATIONS_TOTAL: &str = "roomgrid_reservations_total";

/// Counter: reservation attempts rejected because the range was taken or
/// misaligned. The expected, frequent outcome on a busy system.
pub const RESERVATION_CONFLICTS_TOTAL: &str = "roomgrid_reservation_conflicts_total";

/// Histogram: reserve_range latency in seconds, check and write included.
pub const RESERVATION_DURATION_SECONDS: &str = "roomgrid_reservation_duration_seconds";

/// Counter: usage-grid queries served.
pub const USAGE_QUERIES_TOTAL: &str = "roomgrid_usage_queries_total";

/// Counter: bookings removed by room cascade deletes.
pub const CASCADE_DELETED_BOOKINGS_TOTAL: &str = "roomgrid_cascade_deleted_bookings_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
