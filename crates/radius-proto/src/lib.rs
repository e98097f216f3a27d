//! RADIUS Status-Server protocol support
//!
//! This crate provides the wire layer of the FreeRADIUS status exporter,
//! following RFC 2865, 2869 and 5997.
//!
//! # Features
//!
//! - Packet encoding and decoding
//! - Request/Response Authenticator calculation
//! - HMAC-MD5 Message-Authenticator signing and verification
//! - Vendor-Specific sub-attribute codec and the FreeRADIUS dictionary
//!
//! # Example
//!
//! ```rust
//! use radius_proto::{Code, Packet, freeradius, vendor};
//! use radius_proto::auth::{generate_identifier, generate_request_authenticator};
//! use radius_proto::message_auth::sign_packet;
//!
//! // Create a Status-Server packet asking for every statistics group
//! let mut packet = Packet::new(
//!     Code::StatusServer,
//!     generate_identifier(),
//!     generate_request_authenticator(),
//! );
//! vendor::set(
//!     &mut packet.attributes,
//!     freeradius::VENDOR_ID,
//!     freeradius::attr::STATISTICS_TYPE,
//!     &freeradius::StatisticsType::ALL.bits().to_be_bytes(),
//! )
//! .unwrap();
//!
//! // Sign and encode to bytes
//! let bytes = sign_packet(&mut packet, b"adminsecret").unwrap();
//! assert_eq!(bytes.len(), packet.length());
//! ```

pub mod attributes;
pub mod auth;
pub mod freeradius;
pub mod message_auth;
pub mod packet;
pub mod vendor;

pub use attributes::{Attribute, AttributeType};
pub use auth::{
    calculate_response_authenticator, generate_identifier, generate_request_authenticator,
    verify_response_authenticator,
};
pub use freeradius::StatisticsType;
pub use message_auth::{
    calculate_message_authenticator, sign_packet, verify_message_authenticator,
    verify_response_message_authenticator,
};
pub use packet::{Code, Packet, PacketError};
pub use vendor::VendorError;
