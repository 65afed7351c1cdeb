//! Prometheus Metrics Module
//!
//! Live session metrics, recorded through the `metrics` facade. Without an
//! installed recorder every call is a no-op.
//!
//! # Metrics Categories
//!
//! - **Sessions**: sessions opened and currently open
//! - **Messages**: messages received by response type
//! - **Faults**: faults pushed to the error channel by kind
//! - **Latency**: time spent running listeners per message
//!
//! # Integration
//!
//! `lenses` exposes the metrics at `/metrics` when `LENSES_METRICS_PORT`
//! is set.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::infrastructure::live::ResponseType;

// =============================================================================
// Exporter
// =============================================================================

static EXPORTER_ADDR: OnceLock<SocketAddr> = OnceLock::new();

/// Install the Prometheus recorder with an HTTP listener on `port`.
///
/// Later calls are no-ops returning the address of the first exporter.
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns an error if the recorder or listener cannot be installed.
pub fn init_metrics(port: u16) -> Result<SocketAddr, BuildError> {
    if let Some(addr) = EXPORTER_ADDR.get() {
        return Ok(*addr);
    }

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    register_metrics();

    tracing::info!(addr = %addr, "Prometheus exporter listening");
    Ok(*EXPORTER_ADDR.get_or_init(|| addr))
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "lenses_live_sessions_total",
        "Total live sessions started"
    );
    describe_gauge!(
        "lenses_live_sessions_open",
        "Number of live sessions currently reading"
    );
    describe_counter!(
        "lenses_live_messages_received_total",
        "Total messages decoded by response type"
    );
    describe_counter!(
        "lenses_live_faults_total",
        "Total faults reported on the error channel by kind"
    );
    describe_histogram!(
        "lenses_live_dispatch_seconds",
        "Time spent running listeners for one message"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record a session start.
pub fn record_session_opened() {
    counter!("lenses_live_sessions_total").increment(1);
    gauge!("lenses_live_sessions_open").increment(1.0);
}

/// Record a session teardown.
pub fn record_session_closed() {
    gauge!("lenses_live_sessions_open").decrement(1.0);
}

/// Record a decoded message.
pub fn record_message_received(typ: ResponseType) {
    counter!(
        "lenses_live_messages_received_total",
        "type" => typ.as_str()
    )
    .increment(1);
}

/// Record a fault pushed to the error channel.
pub fn record_fault(kind: &'static str) {
    counter!("lenses_live_faults_total", "kind" => kind).increment(1);
}

/// Record listener dispatch duration.
pub fn record_dispatch_duration(typ: ResponseType, duration: Duration) {
    histogram!(
        "lenses_live_dispatch_seconds",
        "type" => typ.as_str()
    )
    .record(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_noop() {
        record_session_opened();
        record_message_received(ResponseType::Record);
        record_fault("decode");
        record_dispatch_duration(ResponseType::End, Duration::from_millis(3));
        record_session_closed();
    }
}
