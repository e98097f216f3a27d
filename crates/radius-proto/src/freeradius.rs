//! FreeRADIUS vendor dictionary (vendor ID 11344)
//!
//! Attribute numbers from FreeRADIUS `dictionary.freeradius`, covering the
//! statistics the status server reports in reply to Status-Server.

use std::fmt;
use std::ops::BitOr;

/// IANA private enterprise number of the FreeRADIUS project
pub const VENDOR_ID: u32 = 11344;

/// Value of FreeRADIUS-Statistics-Type: which statistics groups to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatisticsType(u32);

impl StatisticsType {
    pub const NONE: Self = Self(0);
    pub const AUTHENTICATION: Self = Self(1);
    pub const ACCOUNTING: Self = Self(2);
    pub const PROXY_AUTHENTICATION: Self = Self(4);
    pub const PROXY_ACCOUNTING: Self = Self(8);
    pub const INTERNAL: Self = Self(16);
    pub const CLIENT: Self = Self(32);
    pub const SERVER: Self = Self(64);
    pub const HOME_SERVER: Self = Self(128);

    pub const AUTH_ACCT: Self = Self(3);
    pub const PROXY_AUTH_ACCT: Self = Self(12);
    pub const AUTH_ACCT_PROXY: Self = Self(15);
    /// Everything the global server section reports
    pub const ALL: Self = Self(31);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// `self` with every bit of `other` cleared
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for StatisticsType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for StatisticsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Vendor attribute numbers
pub mod attr {
    pub const STATISTICS_TYPE: u8 = 127;

    pub const TOTAL_ACCESS_REQUESTS: u8 = 128;
    pub const TOTAL_ACCESS_ACCEPTS: u8 = 129;
    pub const TOTAL_ACCESS_REJECTS: u8 = 130;
    pub const TOTAL_ACCESS_CHALLENGES: u8 = 131;
    pub const TOTAL_AUTH_RESPONSES: u8 = 132;
    pub const TOTAL_AUTH_DUPLICATE_REQUESTS: u8 = 133;
    pub const TOTAL_AUTH_MALFORMED_REQUESTS: u8 = 134;
    pub const TOTAL_AUTH_INVALID_REQUESTS: u8 = 135;
    pub const TOTAL_AUTH_DROPPED_REQUESTS: u8 = 136;
    pub const TOTAL_AUTH_UNKNOWN_TYPES: u8 = 137;

    pub const TOTAL_PROXY_ACCESS_REQUESTS: u8 = 138;
    pub const TOTAL_PROXY_ACCESS_ACCEPTS: u8 = 139;
    pub const TOTAL_PROXY_ACCESS_REJECTS: u8 = 140;
    pub const TOTAL_PROXY_ACCESS_CHALLENGES: u8 = 141;
    pub const TOTAL_PROXY_AUTH_RESPONSES: u8 = 142;
    pub const TOTAL_PROXY_AUTH_DUPLICATE_REQUESTS: u8 = 143;
    pub const TOTAL_PROXY_AUTH_MALFORMED_REQUESTS: u8 = 144;
    pub const TOTAL_PROXY_AUTH_INVALID_REQUESTS: u8 = 145;
    pub const TOTAL_PROXY_AUTH_DROPPED_REQUESTS: u8 = 146;
    pub const TOTAL_PROXY_AUTH_UNKNOWN_TYPES: u8 = 147;

    pub const TOTAL_ACCOUNTING_REQUESTS: u8 = 148;
    pub const TOTAL_ACCOUNTING_RESPONSES: u8 = 149;
    pub const TOTAL_ACCT_DUPLICATE_REQUESTS: u8 = 150;
    pub const TOTAL_ACCT_MALFORMED_REQUESTS: u8 = 151;
    pub const TOTAL_ACCT_INVALID_REQUESTS: u8 = 152;
    pub const TOTAL_ACCT_DROPPED_REQUESTS: u8 = 153;
    pub const TOTAL_ACCT_UNKNOWN_TYPES: u8 = 154;

    pub const TOTAL_PROXY_ACCOUNTING_REQUESTS: u8 = 155;
    pub const TOTAL_PROXY_ACCOUNTING_RESPONSES: u8 = 156;
    pub const TOTAL_PROXY_ACCT_DUPLICATE_REQUESTS: u8 = 157;
    pub const TOTAL_PROXY_ACCT_MALFORMED_REQUESTS: u8 = 158;
    pub const TOTAL_PROXY_ACCT_INVALID_REQUESTS: u8 = 159;
    pub const TOTAL_PROXY_ACCT_DROPPED_REQUESTS: u8 = 160;
    pub const TOTAL_PROXY_ACCT_UNKNOWN_TYPES: u8 = 161;

    pub const QUEUE_LEN_INTERNAL: u8 = 162;
    pub const QUEUE_LEN_PROXY: u8 = 163;
    pub const QUEUE_LEN_AUTH: u8 = 164;
    pub const QUEUE_LEN_ACCT: u8 = 165;
    pub const QUEUE_LEN_DETAIL: u8 = 166;

    /// Request only: scope the query to this home server
    pub const STATS_SERVER_IP_ADDRESS: u8 = 170;
    /// Request only
    pub const STATS_SERVER_PORT: u8 = 171;
    pub const STATS_SERVER_OUTSTANDING_REQUESTS: u8 = 172;
    pub const STATS_SERVER_STATE: u8 = 173;
    pub const STATS_SERVER_TIME_OF_DEATH: u8 = 174;
    pub const STATS_SERVER_TIME_OF_LIFE: u8 = 175;
    pub const STATS_START_TIME: u8 = 176;
    pub const STATS_HUP_TIME: u8 = 177;
    pub const SERVER_EMA_WINDOW: u8 = 178;
    pub const SERVER_EMA_USEC_WINDOW_1: u8 = 179;
    pub const SERVER_EMA_USEC_WINDOW_10: u8 = 180;
    pub const QUEUE_PPS_IN: u8 = 181;
    pub const QUEUE_PPS_OUT: u8 = 182;
    pub const QUEUE_USE_PERCENTAGE: u8 = 183;
    pub const STATS_LAST_PACKET_RECV: u8 = 184;
    pub const STATS_LAST_PACKET_SENT: u8 = 185;
    pub const STATS_ERROR: u8 = 187;
}
