//! Typed view of a FreeRADIUS statistics response
//!
//! Every field is optional: which groups a server reports depends on its role
//! and on the requested statistics type, so absence is not an error.

use radius_proto::freeradius::{VENDOR_ID, attr};
use radius_proto::{Attribute, Packet, VendorError, vendor};
use std::fmt;
use std::time::SystemTime;
use tracing::warn;

/// Access-Request outcome counters (server or proxy side)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Access {
    pub requests: Option<u32>,
    pub accepts: Option<u32>,
    pub rejects: Option<u32>,
    pub challenges: Option<u32>,
}

/// Authentication packet counters (server or proxy side)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Auth {
    pub responses: Option<u32>,
    pub duplicate_requests: Option<u32>,
    pub malformed_requests: Option<u32>,
    pub invalid_requests: Option<u32>,
    pub dropped_requests: Option<u32>,
    pub unknown_types: Option<u32>,
}

/// Accounting packet counters (server or proxy side)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accounting {
    pub requests: Option<u32>,
    pub responses: Option<u32>,
    pub duplicate_requests: Option<u32>,
    pub malformed_requests: Option<u32>,
    pub invalid_requests: Option<u32>,
    pub dropped_requests: Option<u32>,
    pub unknown_types: Option<u32>,
}

/// Internal queue lengths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Internal {
    pub queue_len_internal: Option<u32>,
    pub queue_len_proxy: Option<u32>,
    pub queue_len_auth: Option<u32>,
    pub queue_len_acct: Option<u32>,
    pub queue_len_detail: Option<u32>,
}

/// Health of a server as tracked by FreeRADIUS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Alive,
    Zombie,
    Dead,
    Idle,
    Unknown(u32),
}

impl ServerState {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => ServerState::Alive,
            1 => ServerState::Zombie,
            2 => ServerState::Dead,
            3 => ServerState::Idle,
            n => ServerState::Unknown(n),
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            ServerState::Alive => 0,
            ServerState::Zombie => 1,
            ServerState::Dead => 2,
            ServerState::Idle => 3,
            ServerState::Unknown(n) => n,
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerState::Alive => write!(f, "alive"),
            ServerState::Zombie => write!(f, "zombie"),
            ServerState::Dead => write!(f, "dead"),
            ServerState::Idle => write!(f, "idle"),
            ServerState::Unknown(n) => write!(f, "unknown ({})", n),
        }
    }
}

/// Server-wide or per-home-server health fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Server {
    pub outstanding_requests: Option<u32>,
    pub state: Option<ServerState>,
    pub time_of_death: Option<SystemTime>,
    pub time_of_life: Option<SystemTime>,
    pub last_packet_recv: Option<SystemTime>,
    pub last_packet_sent: Option<SystemTime>,
    pub start_time: Option<SystemTime>,
    pub hup_time: Option<SystemTime>,
    pub ema_window: Option<u32>,
    pub ema_usec_window_1: Option<u32>,
    pub ema_usec_window_10: Option<u32>,
    pub queue_pps_in: Option<u32>,
    pub queue_pps_out: Option<u32>,
    pub queue_use_percentage: Option<u32>,
}

/// One target's statistics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// FreeRADIUS-Stats-Error reported by the server
    pub error: Option<String>,
    pub access: Access,
    pub auth: Auth,
    pub proxy_access: Access,
    pub proxy_auth: Auth,
    pub accounting: Accounting,
    pub proxy_accounting: Accounting,
    pub internal: Internal,
    pub server: Server,
}

impl Statistics {
    /// Map the vendor attributes of a status response
    ///
    /// Missing attributes are skipped silently. An attribute that is present
    /// but cannot be decoded is logged and left unset; it never aborts the
    /// remaining fields.
    pub fn from_response(response: &Packet, address: &str) -> Self {
        let fields = Fields {
            attributes: &response.attributes,
            address,
        };

        let error = fields.string(attr::STATS_ERROR);
        if let Some(ref message) = error {
            warn!(address = %address, error = %message, "Status server reported a statistics error");
        }

        Statistics {
            error,
            access: fields.access(attr::TOTAL_ACCESS_REQUESTS),
            auth: fields.auth(attr::TOTAL_AUTH_RESPONSES),
            proxy_access: fields.access(attr::TOTAL_PROXY_ACCESS_REQUESTS),
            proxy_auth: fields.auth(attr::TOTAL_PROXY_AUTH_RESPONSES),
            accounting: fields.accounting(attr::TOTAL_ACCOUNTING_REQUESTS),
            proxy_accounting: fields.accounting(attr::TOTAL_PROXY_ACCOUNTING_REQUESTS),
            internal: Internal {
                queue_len_internal: fields.integer(attr::QUEUE_LEN_INTERNAL),
                queue_len_proxy: fields.integer(attr::QUEUE_LEN_PROXY),
                queue_len_auth: fields.integer(attr::QUEUE_LEN_AUTH),
                queue_len_acct: fields.integer(attr::QUEUE_LEN_ACCT),
                queue_len_detail: fields.integer(attr::QUEUE_LEN_DETAIL),
            },
            server: Server {
                outstanding_requests: fields.integer(attr::STATS_SERVER_OUTSTANDING_REQUESTS),
                state: fields
                    .integer(attr::STATS_SERVER_STATE)
                    .map(ServerState::from_u32),
                time_of_death: fields.date(attr::STATS_SERVER_TIME_OF_DEATH),
                time_of_life: fields.date(attr::STATS_SERVER_TIME_OF_LIFE),
                last_packet_recv: fields.date(attr::STATS_LAST_PACKET_RECV),
                last_packet_sent: fields.date(attr::STATS_LAST_PACKET_SENT),
                start_time: fields.date(attr::STATS_START_TIME),
                hup_time: fields.date(attr::STATS_HUP_TIME),
                ema_window: fields.integer(attr::SERVER_EMA_WINDOW),
                ema_usec_window_1: fields.integer(attr::SERVER_EMA_USEC_WINDOW_1),
                ema_usec_window_10: fields.integer(attr::SERVER_EMA_USEC_WINDOW_10),
                queue_pps_in: fields.integer(attr::QUEUE_PPS_IN),
                queue_pps_out: fields.integer(attr::QUEUE_PPS_OUT),
                queue_use_percentage: fields.integer(attr::QUEUE_USE_PERCENTAGE),
            },
        }
    }
}

type Getter<T> = fn(&[Attribute], u32, u8) -> Result<T, VendorError>;

struct Fields<'a> {
    attributes: &'a [Attribute],
    address: &'a str,
}

impl Fields<'_> {
    fn decode<T>(&self, attr_type: u8, get: Getter<T>) -> Option<T> {
        match get(self.attributes, VENDOR_ID, attr_type) {
            Ok(value) => Some(value),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!(
                    address = %self.address,
                    attribute = attr_type,
                    error = %e,
                    "Failed to decode statistics attribute"
                );
                None
            }
        }
    }

    fn integer(&self, attr_type: u8) -> Option<u32> {
        self.decode(attr_type, vendor::get_integer)
    }

    fn date(&self, attr_type: u8) -> Option<SystemTime> {
        self.decode(attr_type, vendor::get_date)
    }

    fn string(&self, attr_type: u8) -> Option<String> {
        self.decode(attr_type, vendor::get_string)
    }

    // The proxy groups share the layout of the server groups at a later base

    fn access(&self, base: u8) -> Access {
        Access {
            requests: self.integer(base),
            accepts: self.integer(base + 1),
            rejects: self.integer(base + 2),
            challenges: self.integer(base + 3),
        }
    }

    fn auth(&self, base: u8) -> Auth {
        Auth {
            responses: self.integer(base),
            duplicate_requests: self.integer(base + 1),
            malformed_requests: self.integer(base + 2),
            invalid_requests: self.integer(base + 3),
            dropped_requests: self.integer(base + 4),
            unknown_types: self.integer(base + 5),
        }
    }

    fn accounting(&self, base: u8) -> Accounting {
        Accounting {
            requests: self.integer(base),
            responses: self.integer(base + 1),
            duplicate_requests: self.integer(base + 2),
            malformed_requests: self.integer(base + 3),
            invalid_requests: self.integer(base + 4),
            dropped_requests: self.integer(base + 5),
            unknown_types: self.integer(base + 6),
        }
    }
}
