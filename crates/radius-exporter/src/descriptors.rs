//! Metric descriptor table
//!
//! Maps each FreeRADIUS statistics attribute to its exported metric. The
//! table is immutable and handed to the [`Collector`](crate::Collector).

use crate::stats::Statistics;
use radius_proto::freeradius::attr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Prometheus metric type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// One exported statistic
#[derive(Debug, Clone, Copy)]
pub struct MetricDescriptor {
    /// FreeRADIUS vendor attribute the value comes from
    pub attribute: u8,
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    /// Reads the value out of a statistics snapshot, `None` when not reported
    pub value: fn(&Statistics) -> Option<f64>,
}

/// Per-target liveness gauge
pub const UP_NAME: &str = "freeradius_up";
pub const UP_HELP: &str = "Boolean gauge of 1 if freeradius was reachable, or 0 if not";

/// Remote Stats-Error, exported as a label
pub const STATS_ERROR_NAME: &str = "freeradius_stats_error";
pub const STATS_ERROR_HELP: &str = "Stats error as label with a const value of 1";

/// Every statistic the exporter knows about
pub fn describe() -> &'static [MetricDescriptor] {
    DESCRIPTORS
}

fn int(value: Option<u32>) -> Option<f64> {
    value.map(f64::from)
}

fn epoch(value: Option<SystemTime>) -> Option<f64> {
    value
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as f64)
}

const fn counter(
    attribute: u8,
    name: &'static str,
    help: &'static str,
    value: fn(&Statistics) -> Option<f64>,
) -> MetricDescriptor {
    MetricDescriptor {
        attribute,
        name,
        help,
        kind: MetricKind::Counter,
        value,
    }
}

const fn gauge(
    attribute: u8,
    name: &'static str,
    help: &'static str,
    value: fn(&Statistics) -> Option<f64>,
) -> MetricDescriptor {
    MetricDescriptor {
        attribute,
        name,
        help,
        kind: MetricKind::Gauge,
        value,
    }
}

#[rustfmt::skip]
static DESCRIPTORS: &[MetricDescriptor] = &[
    // Access
    counter(attr::TOTAL_ACCESS_REQUESTS, "freeradius_total_access_requests", "Total access requests",
        |s| int(s.access.requests)),
    counter(attr::TOTAL_ACCESS_ACCEPTS, "freeradius_total_access_accepts", "Total access accepts",
        |s| int(s.access.accepts)),
    counter(attr::TOTAL_ACCESS_REJECTS, "freeradius_total_access_rejects", "Total access rejects",
        |s| int(s.access.rejects)),
    counter(attr::TOTAL_ACCESS_CHALLENGES, "freeradius_total_access_challenges", "Total access challenges",
        |s| int(s.access.challenges)),
    // Auth
    counter(attr::TOTAL_AUTH_RESPONSES, "freeradius_total_auth_responses", "Total auth responses",
        |s| int(s.auth.responses)),
    counter(attr::TOTAL_AUTH_DUPLICATE_REQUESTS, "freeradius_total_auth_duplicate_requests",
        "Total auth duplicate requests", |s| int(s.auth.duplicate_requests)),
    counter(attr::TOTAL_AUTH_MALFORMED_REQUESTS, "freeradius_total_auth_malformed_requests",
        "Total auth malformed requests", |s| int(s.auth.malformed_requests)),
    counter(attr::TOTAL_AUTH_INVALID_REQUESTS, "freeradius_total_auth_invalid_requests",
        "Total auth invalid requests", |s| int(s.auth.invalid_requests)),
    counter(attr::TOTAL_AUTH_DROPPED_REQUESTS, "freeradius_total_auth_dropped_requests",
        "Total auth dropped requests", |s| int(s.auth.dropped_requests)),
    counter(attr::TOTAL_AUTH_UNKNOWN_TYPES, "freeradius_total_auth_unknown_types",
        "Total auth unknown types", |s| int(s.auth.unknown_types)),
    // Proxy access
    counter(attr::TOTAL_PROXY_ACCESS_REQUESTS, "freeradius_total_proxy_access_requests",
        "Total proxy access requests", |s| int(s.proxy_access.requests)),
    counter(attr::TOTAL_PROXY_ACCESS_ACCEPTS, "freeradius_total_proxy_access_accepts",
        "Total proxy access accepts", |s| int(s.proxy_access.accepts)),
    counter(attr::TOTAL_PROXY_ACCESS_REJECTS, "freeradius_total_proxy_access_rejects",
        "Total proxy access rejects", |s| int(s.proxy_access.rejects)),
    counter(attr::TOTAL_PROXY_ACCESS_CHALLENGES, "freeradius_total_proxy_access_challenges",
        "Total proxy access challenges", |s| int(s.proxy_access.challenges)),
    // Proxy auth
    counter(attr::TOTAL_PROXY_AUTH_RESPONSES, "freeradius_total_proxy_auth_responses",
        "Total proxy auth responses", |s| int(s.proxy_auth.responses)),
    counter(attr::TOTAL_PROXY_AUTH_DUPLICATE_REQUESTS, "freeradius_total_proxy_auth_duplicate_requests",
        "Total proxy auth duplicate requests", |s| int(s.proxy_auth.duplicate_requests)),
    counter(attr::TOTAL_PROXY_AUTH_MALFORMED_REQUESTS, "freeradius_total_proxy_auth_malformed_requests",
        "Total proxy auth malformed requests", |s| int(s.proxy_auth.malformed_requests)),
    counter(attr::TOTAL_PROXY_AUTH_INVALID_REQUESTS, "freeradius_total_proxy_auth_invalid_requests",
        "Total proxy auth invalid requests", |s| int(s.proxy_auth.invalid_requests)),
    counter(attr::TOTAL_PROXY_AUTH_DROPPED_REQUESTS, "freeradius_total_proxy_auth_dropped_requests",
        "Total proxy auth dropped requests", |s| int(s.proxy_auth.dropped_requests)),
    counter(attr::TOTAL_PROXY_AUTH_UNKNOWN_TYPES, "freeradius_total_proxy_auth_unknown_types",
        "Total proxy auth unknown types", |s| int(s.proxy_auth.unknown_types)),
    // Accounting
    counter(attr::TOTAL_ACCOUNTING_REQUESTS, "freeradius_total_acct_requests", "Total acct requests",
        |s| int(s.accounting.requests)),
    counter(attr::TOTAL_ACCOUNTING_RESPONSES, "freeradius_total_acct_responses", "Total acct responses",
        |s| int(s.accounting.responses)),
    counter(attr::TOTAL_ACCT_DUPLICATE_REQUESTS, "freeradius_total_acct_duplicate_requests",
        "Total acct duplicate requests", |s| int(s.accounting.duplicate_requests)),
    counter(attr::TOTAL_ACCT_MALFORMED_REQUESTS, "freeradius_total_acct_malformed_requests",
        "Total acct malformed requests", |s| int(s.accounting.malformed_requests)),
    counter(attr::TOTAL_ACCT_INVALID_REQUESTS, "freeradius_total_acct_invalid_requests",
        "Total acct invalid requests", |s| int(s.accounting.invalid_requests)),
    counter(attr::TOTAL_ACCT_DROPPED_REQUESTS, "freeradius_total_acct_dropped_requests",
        "Total acct dropped requests", |s| int(s.accounting.dropped_requests)),
    counter(attr::TOTAL_ACCT_UNKNOWN_TYPES, "freeradius_total_acct_unknown_types",
        "Total acct unknown types", |s| int(s.accounting.unknown_types)),
    // Proxy accounting
    counter(attr::TOTAL_PROXY_ACCOUNTING_REQUESTS, "freeradius_total_proxy_acct_requests",
        "Total proxy acct requests", |s| int(s.proxy_accounting.requests)),
    counter(attr::TOTAL_PROXY_ACCOUNTING_RESPONSES, "freeradius_total_proxy_acct_responses",
        "Total proxy acct responses", |s| int(s.proxy_accounting.responses)),
    counter(attr::TOTAL_PROXY_ACCT_DUPLICATE_REQUESTS, "freeradius_total_proxy_acct_duplicate_requests",
        "Total proxy acct duplicate requests", |s| int(s.proxy_accounting.duplicate_requests)),
    counter(attr::TOTAL_PROXY_ACCT_MALFORMED_REQUESTS, "freeradius_total_proxy_acct_malformed_requests",
        "Total proxy acct malformed requests", |s| int(s.proxy_accounting.malformed_requests)),
    counter(attr::TOTAL_PROXY_ACCT_INVALID_REQUESTS, "freeradius_total_proxy_acct_invalid_requests",
        "Total proxy acct invalid requests", |s| int(s.proxy_accounting.invalid_requests)),
    counter(attr::TOTAL_PROXY_ACCT_DROPPED_REQUESTS, "freeradius_total_proxy_acct_dropped_requests",
        "Total proxy acct dropped requests", |s| int(s.proxy_accounting.dropped_requests)),
    counter(attr::TOTAL_PROXY_ACCT_UNKNOWN_TYPES, "freeradius_total_proxy_acct_unknown_types",
        "Total proxy acct unknown types", |s| int(s.proxy_accounting.unknown_types)),
    // Internal queues
    gauge(attr::QUEUE_LEN_INTERNAL, "freeradius_queue_len_internal", "Internal queue length",
        |s| int(s.internal.queue_len_internal)),
    gauge(attr::QUEUE_LEN_PROXY, "freeradius_queue_len_proxy", "Proxy queue length",
        |s| int(s.internal.queue_len_proxy)),
    gauge(attr::QUEUE_LEN_AUTH, "freeradius_queue_len_auth", "Auth queue length",
        |s| int(s.internal.queue_len_auth)),
    gauge(attr::QUEUE_LEN_ACCT, "freeradius_queue_len_acct", "Acct queue length",
        |s| int(s.internal.queue_len_acct)),
    gauge(attr::QUEUE_LEN_DETAIL, "freeradius_queue_len_detail", "Detail queue length",
        |s| int(s.internal.queue_len_detail)),
    // Server
    gauge(attr::STATS_LAST_PACKET_RECV, "freeradius_last_packet_recv",
        "Epoch timestamp when the last packet was received", |s| epoch(s.server.last_packet_recv)),
    gauge(attr::STATS_LAST_PACKET_SENT, "freeradius_last_packet_sent",
        "Epoch timestamp when the last packet was sent", |s| epoch(s.server.last_packet_sent)),
    gauge(attr::STATS_START_TIME, "freeradius_start_time",
        "Epoch timestamp when the server was started", |s| epoch(s.server.start_time)),
    gauge(attr::STATS_HUP_TIME, "freeradius_hup_time",
        "Epoch timestamp when the server hang up (If start == hup, it hasn't been hup'd yet)",
        |s| epoch(s.server.hup_time)),
    gauge(attr::STATS_SERVER_STATE, "freeradius_state",
        "State of the server. Alive = 0; Zombie = 1; Dead = 2; Idle = 3",
        |s| s.server.state.map(|state| f64::from(state.as_u32()))),
    gauge(attr::STATS_SERVER_TIME_OF_DEATH, "freeradius_time_of_death",
        "Epoch timestamp when a home server is marked as 'dead'", |s| epoch(s.server.time_of_death)),
    gauge(attr::STATS_SERVER_TIME_OF_LIFE, "freeradius_time_of_life",
        "Epoch timestamp when a home server is marked as 'alive'", |s| epoch(s.server.time_of_life)),
    gauge(attr::SERVER_EMA_WINDOW, "freeradius_ema_window",
        "Exponential moving average of home server response time", |s| int(s.server.ema_window)),
    gauge(attr::SERVER_EMA_USEC_WINDOW_1, "freeradius_ema_window1_usec",
        "Window-1 is the average is calculated over 'window' packets",
        |s| int(s.server.ema_usec_window_1)),
    gauge(attr::SERVER_EMA_USEC_WINDOW_10, "freeradius_ema_window10_usec",
        "Window-10 is the average is calculated over '10 * window' packets",
        |s| int(s.server.ema_usec_window_10)),
    gauge(attr::STATS_SERVER_OUTSTANDING_REQUESTS, "freeradius_outstanding_requests",
        "Outstanding requests", |s| int(s.server.outstanding_requests)),
    gauge(attr::QUEUE_PPS_IN, "freeradius_queue_pps_in", "Queue PPS in",
        |s| int(s.server.queue_pps_in)),
    gauge(attr::QUEUE_PPS_OUT, "freeradius_queue_pps_out", "Queue PPS out",
        |s| int(s.server.queue_pps_out)),
    gauge(attr::QUEUE_USE_PERCENTAGE, "freeradius_queue_use_percentage", "Queue usage percentage",
        |s| int(s.server.queue_use_percentage)),
];
