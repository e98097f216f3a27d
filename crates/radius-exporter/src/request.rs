//! Status-Server request construction
//!
//! One [`StatusRequest`] is built per monitored target at startup and reused
//! for every scrape. Building follows RFC 5997: a zeroed
//! Message-Authenticator is installed, the FreeRADIUS selectors are set, the
//! packet is encoded and the HMAC-MD5 over those bytes replaces the zeros.

use radius_proto::auth::{generate_identifier, generate_request_authenticator};
use radius_proto::freeradius::{self, StatisticsType, attr};
use radius_proto::message_auth::{MESSAGE_AUTHENTICATOR_LENGTH, sign_packet};
use radius_proto::{Attribute, AttributeType, Code, Packet, PacketError, VendorError, vendor};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Invalid home server {input:?}: {reason}")]
    InvalidTarget { input: String, reason: String },
    #[error("IPv6 home server not supported: {0}")]
    Ipv6NotSupported(String),
    #[error("Vendor attribute error: {0}")]
    Vendor(#[from] VendorError),
    #[error("Packet error: {0}")]
    Packet(#[from] PacketError),
}

/// A home server whose statistics are read through the status server
///
/// Parsed from `ip:port[:auth|acct]`. Without a role suffix both the
/// authentication and accounting groups are requested; FreeRADIUS answers the
/// one that does not apply with a Stats-Error but still reports the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeServerTarget {
    pub ip: Ipv4Addr,
    pub port: u16,
    pub statistics: StatisticsType,
}

impl HomeServerTarget {
    pub const DEFAULT_STATISTICS: StatisticsType = StatisticsType::from_bits(
        StatisticsType::AUTH_ACCT.bits()
            | StatisticsType::INTERNAL.bits()
            | StatisticsType::HOME_SERVER.bits(),
    );

    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self {
            ip,
            port,
            statistics: Self::DEFAULT_STATISTICS,
        }
    }

    pub fn parse(input: &str) -> Result<Self, RequestError> {
        let input = input.trim();
        let (address, role) = match input.rsplit_once(':') {
            Some((head, role @ ("auth" | "acct"))) => (head, Some(role)),
            _ => (input, None),
        };

        let socket: SocketAddr = address.parse().map_err(|e: std::net::AddrParseError| {
            RequestError::InvalidTarget {
                input: input.to_string(),
                reason: e.to_string(),
            }
        })?;
        let SocketAddr::V4(socket) = socket else {
            return Err(RequestError::Ipv6NotSupported(input.to_string()));
        };

        let mut target = Self::new(*socket.ip(), socket.port());
        match role {
            Some("auth") => target.statistics = target.statistics.without(StatisticsType::ACCOUNTING),
            Some("acct") => {
                target.statistics = target.statistics.without(StatisticsType::AUTHENTICATION)
            }
            _ => {}
        }
        Ok(target)
    }

    /// Parse a comma-separated list, skipping empty entries
    pub fn parse_list<I, S>(entries: I) -> Result<Vec<Self>, RequestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        entries
            .into_iter()
            .flat_map(|entry| {
                entry
                    .as_ref()
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(Self::parse)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.ip, self.port)
    }
}

impl FromStr for HomeServerTarget {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HomeServerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)?;
        if !self.statistics.contains(StatisticsType::ACCOUNTING) {
            write!(f, ":auth")?;
        } else if !self.statistics.contains(StatisticsType::AUTHENTICATION) {
            write!(f, ":acct")?;
        }
        Ok(())
    }
}

/// A signed, ready-to-send Status-Server request
#[derive(Debug, Clone)]
pub struct StatusRequest {
    packet: Packet,
    bytes: Vec<u8>,
    address: String,
}

impl StatusRequest {
    /// Build a signed request. `address` is the label the target reports under.
    pub fn build(
        secret: &[u8],
        statistics: StatisticsType,
        target: Option<&HomeServerTarget>,
        address: impl Into<String>,
    ) -> Result<Self, RequestError> {
        let mut packet = Packet::new(
            Code::StatusServer,
            generate_identifier(),
            generate_request_authenticator(),
        );
        packet.add_attribute(Attribute::new(
            AttributeType::MessageAuthenticator as u8,
            vec![0u8; MESSAGE_AUTHENTICATOR_LENGTH],
        )?);

        let attrs = &mut packet.attributes;
        vendor::set(
            attrs,
            freeradius::VENDOR_ID,
            attr::STATISTICS_TYPE,
            &statistics.bits().to_be_bytes(),
        )?;

        if let Some(target) = target {
            vendor::set(
                attrs,
                freeradius::VENDOR_ID,
                attr::STATS_SERVER_IP_ADDRESS,
                &target.ip.octets(),
            )?;
            vendor::set(
                attrs,
                freeradius::VENDOR_ID,
                attr::STATS_SERVER_PORT,
                &u32::from(target.port).to_be_bytes(),
            )?;
        }

        let bytes = sign_packet(&mut packet, secret)?;

        Ok(Self {
            packet,
            bytes,
            address: address.into(),
        })
    }

    /// Request for the status server's own statistics (every group)
    pub fn for_server(secret: &[u8], address: impl Into<String>) -> Result<Self, RequestError> {
        Self::build(secret, StatisticsType::ALL, None, address)
    }

    /// Request scoped to one home server, labelled with its configured form
    pub fn for_home_server(secret: &[u8], target: &HomeServerTarget) -> Result<Self, RequestError> {
        Self::build(secret, target.statistics, Some(target), target.to_string())
    }

    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// Wire encoding, signature included
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn identifier(&self) -> u8 {
        self.packet.identifier
    }

    pub fn authenticator(&self) -> &[u8; 16] {
        &self.packet.authenticator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radius_proto::message_auth::calculate_message_authenticator;

    const SECRET: &[u8] = b"adminsecret";

    /// Zero the Message-Authenticator of an encoded request and re-sign it
    fn recompute_signature(bytes: &[u8]) -> ([u8; 16], [u8; 16]) {
        let mut packet = Packet::decode(bytes).unwrap();
        let ma = AttributeType::MessageAuthenticator as u8;
        let stored: [u8; 16] = packet.find_attribute(ma).unwrap().value.as_slice().try_into().unwrap();

        packet.set_attribute(Attribute::new(ma, vec![0u8; 16]).unwrap());
        let zeroed = packet.encode().unwrap();
        (stored, calculate_message_authenticator(&zeroed, SECRET))
    }

    #[test]
    fn test_server_request_layout() {
        let request = StatusRequest::for_server(SECRET, "127.0.0.1:18121").unwrap();
        let packet = Packet::decode(request.bytes()).unwrap();

        assert_eq!(packet.code, Code::StatusServer);
        assert_eq!(packet.identifier, request.identifier());
        assert_eq!(&packet.authenticator, request.authenticator());
        assert_eq!(packet.attributes[0].attr_type, 80);
        assert_eq!(
            vendor::get_integer(&packet.attributes, freeradius::VENDOR_ID, attr::STATISTICS_TYPE),
            Ok(31)
        );
        assert!(vendor::lookup(&packet.attributes, freeradius::VENDOR_ID, attr::STATS_SERVER_IP_ADDRESS).is_none());
        assert_eq!(request.address(), "127.0.0.1:18121");
    }

    #[test]
    fn test_signature_reproducible() {
        let targets = [
            None,
            Some(HomeServerTarget::parse("172.28.1.2:1812").unwrap()),
            Some(HomeServerTarget::parse("172.28.1.3:1813:acct").unwrap()),
        ];
        for bits in [0u32, 1, 31, 147, 255] {
            for target in &targets {
                let request =
                    StatusRequest::build(SECRET, StatisticsType::from_bits(bits), target.as_ref(), "x").unwrap();
                let (stored, recomputed) = recompute_signature(request.bytes());
                assert_eq!(stored, recomputed);
                assert_ne!(stored, [0u8; 16]);
            }
        }
    }

    #[test]
    fn test_home_server_request() {
        let target = HomeServerTarget::parse("172.28.1.2:1812").unwrap();
        let request = StatusRequest::for_home_server(SECRET, &target).unwrap();
        let attrs = &request.packet().attributes;

        assert_eq!(
            vendor::get_integer(attrs, freeradius::VENDOR_ID, attr::STATISTICS_TYPE),
            Ok(147)
        );
        assert_eq!(
            vendor::get_ipv4(attrs, freeradius::VENDOR_ID, attr::STATS_SERVER_IP_ADDRESS).unwrap(),
            Ipv4Addr::new(172, 28, 1, 2)
        );
        assert_eq!(
            vendor::get_integer(attrs, freeradius::VENDOR_ID, attr::STATS_SERVER_PORT),
            Ok(1812)
        );
        assert_eq!(request.address(), "172.28.1.2:1812");
    }

    #[test]
    fn test_requests_get_fresh_authenticators() {
        let a = StatusRequest::for_server(SECRET, "a").unwrap();
        let b = StatusRequest::for_server(SECRET, "a").unwrap();
        assert_ne!(a.authenticator(), b.authenticator());
    }

    #[test]
    fn test_parse_roles() {
        let both = HomeServerTarget::parse("172.28.1.2:1812").unwrap();
        assert_eq!(both.statistics.bits(), 147);

        let auth = HomeServerTarget::parse(" 172.28.1.2:1812:auth ").unwrap();
        assert_eq!(auth.statistics.bits(), 145);
        assert_eq!(auth.to_string(), "172.28.1.2:1812:auth");

        let acct: HomeServerTarget = "172.28.1.3:1813:acct".parse().unwrap();
        assert_eq!(acct.statistics.bits(), 146);
        assert_eq!(acct.port, 1813);
        assert_eq!(acct.to_string(), "172.28.1.3:1813:acct");
    }

    #[test]
    fn test_parse_rejects_bad_targets() {
        for input in ["172.28.1.2", "host:1812", "172.28.1.2:99999", "172.28.1.2:1812:proxy", ""] {
            assert!(
                matches!(HomeServerTarget::parse(input), Err(RequestError::InvalidTarget { .. })),
                "{input} should be rejected"
            );
        }
        assert!(matches!(
            HomeServerTarget::parse("[::1]:1812"),
            Err(RequestError::Ipv6NotSupported(_))
        ));
    }

    #[test]
    fn test_parse_list() {
        let targets =
            HomeServerTarget::parse_list(["172.28.1.2:1812:auth, ,172.28.1.3:1813:acct", ""]).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].ip, Ipv4Addr::new(172, 28, 1, 3));

        assert!(HomeServerTarget::parse_list(["172.28.1.2:1812,bogus"]).is_err());
        assert!(HomeServerTarget::parse_list(Vec::<String>::new()).unwrap().is_empty());
    }
}
