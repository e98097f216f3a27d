//! Message-Authenticator Support (RFC 2869)
//!
//! Message-Authenticator provides integrity protection using HMAC-MD5.
//!
//! Per RFC 2869 Section 5.14:
//! - Computed as HMAC-MD5(shared_secret, packet)
//! - Always 16 bytes (128 bits)
//! - Computed with the Message-Authenticator value set to all zeros
//!
//! RFC 5997 makes it mandatory in Status-Server requests; FreeRADIUS drops
//! status queries that lack it.

use crate::attributes::{Attribute, AttributeType};
use crate::packet::{Packet, PacketError};
use hmac::{Hmac, Mac};
use md5_digest::Md5;

type HmacMd5 = Hmac<Md5>;

/// Length of the Message-Authenticator value
pub const MESSAGE_AUTHENTICATOR_LENGTH: usize = 16;

/// Calculate Message-Authenticator for a RADIUS packet
///
/// # Arguments
/// * `packet_bytes` - The complete RADIUS packet bytes with Message-Authenticator set to zeros
/// * `secret` - The shared secret
pub fn calculate_message_authenticator(packet_bytes: &[u8], secret: &[u8]) -> [u8; 16] {
    let mut mac = HmacMd5::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(packet_bytes);

    let mut output = [0u8; MESSAGE_AUTHENTICATOR_LENGTH];
    output.copy_from_slice(&mac.finalize().into_bytes());
    output
}

/// Sign `packet` in place and return its final wire encoding.
///
/// The Message-Authenticator is (re)set to zeros, the packet is encoded, the
/// HMAC is computed over those bytes and written back into both the packet
/// and the returned buffer. A packet without a Message-Authenticator gets
/// one appended.
pub fn sign_packet(packet: &mut Packet, secret: &[u8]) -> Result<Vec<u8>, PacketError> {
    let attr_type = AttributeType::MessageAuthenticator as u8;
    packet.set_attribute(Attribute::new(
        attr_type,
        vec![0u8; MESSAGE_AUTHENTICATOR_LENGTH],
    )?);

    let mut bytes = packet.encode()?;
    let signature = calculate_message_authenticator(&bytes, secret);

    let offset = packet
        .attribute_value_offset(attr_type)
        .ok_or_else(|| PacketError::AttributeError("Message-Authenticator missing".to_string()))?;
    bytes[offset..offset + MESSAGE_AUTHENTICATOR_LENGTH].copy_from_slice(&signature);
    packet.set_attribute(Attribute::new(attr_type, signature.to_vec())?);

    Ok(bytes)
}

/// Verify Message-Authenticator in a RADIUS packet
///
/// # Arguments
/// * `packet_bytes` - The complete RADIUS packet bytes
/// * `secret` - The shared secret
/// * `message_auth_offset` - Byte offset where Message-Authenticator value starts (after type+length)
pub fn verify_message_authenticator(
    packet_bytes: &[u8],
    secret: &[u8],
    message_auth_offset: usize,
) -> bool {
    let end = message_auth_offset + MESSAGE_AUTHENTICATOR_LENGTH;
    if end > packet_bytes.len() {
        return false;
    }

    let received_auth = &packet_bytes[message_auth_offset..end];

    let mut packet_copy = packet_bytes.to_vec();
    packet_copy[message_auth_offset..end].fill(0);

    received_auth == calculate_message_authenticator(&packet_copy, secret)
}

/// Verify the Message-Authenticator of a response packet
///
/// Responses are signed with the Request Authenticator in place of their own
/// Response Authenticator (RFC 3579 Section 3.2).
pub fn verify_response_message_authenticator(
    packet_bytes: &[u8],
    request_authenticator: &[u8; 16],
    secret: &[u8],
    message_auth_offset: usize,
) -> bool {
    if packet_bytes.len() < Packet::MIN_PACKET_SIZE {
        return false;
    }

    let mut packet_copy = packet_bytes.to_vec();
    packet_copy[4..Packet::MIN_PACKET_SIZE].copy_from_slice(request_authenticator);
    verify_message_authenticator(&packet_copy, secret, message_auth_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Code;

    #[test]
    fn test_calculate_message_authenticator() {
        let packet = vec![0u8; 20];
        let secret = b"adminsecret";

        let auth = calculate_message_authenticator(&packet, secret);
        assert_eq!(auth, calculate_message_authenticator(&packet, secret));
        assert_ne!(auth, calculate_message_authenticator(&packet, b"other"));
    }

    #[test]
    fn test_rfc2202_vector() {
        // RFC 2202 test case 2 for HMAC-MD5
        let auth = calculate_message_authenticator(b"what do ya want for nothing?", b"Jefe");
        assert_eq!(
            auth,
            [
                0x75, 0x0c, 0x78, 0x3e, 0x6a, 0xb0, 0xb5, 0x03, 0xea, 0xa8, 0x6e, 0x31, 0x0a,
                0x5d, 0xb7, 0x38
            ]
        );
    }

    #[test]
    fn test_sign_packet_appends_and_verifies() {
        let mut packet = Packet::new(Code::StatusServer, 3, [5u8; 16]);
        packet.add_attribute(Attribute::vendor_specific(11344, &[127, 6, 0, 0, 0, 31]).unwrap());

        let bytes = sign_packet(&mut packet, b"adminsecret").unwrap();

        let offset = packet
            .attribute_value_offset(AttributeType::MessageAuthenticator as u8)
            .unwrap();
        assert!(verify_message_authenticator(&bytes, b"adminsecret", offset));
        assert!(!verify_message_authenticator(&bytes, b"wrong", offset));
        assert_eq!(packet.encode().unwrap(), bytes);
    }

    #[test]
    fn test_sign_packet_is_stable() {
        let mut packet = Packet::new(Code::StatusServer, 3, [5u8; 16]);
        let first = sign_packet(&mut packet, b"adminsecret").unwrap();
        let second = sign_packet(&mut packet, b"adminsecret").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_verify_response_message_authenticator() {
        let secret = b"adminsecret";
        let request_auth = [9u8; 16];
        let attr_type = AttributeType::MessageAuthenticator as u8;

        let mut response = Packet::new(Code::AccessAccept, 3, request_auth);
        response.add_attribute(Attribute::new(attr_type, vec![0u8; 16]).unwrap());
        let unsigned = response.encode().unwrap();
        let signature = calculate_message_authenticator(&unsigned, secret);
        response.set_attribute(Attribute::new(attr_type, signature.to_vec()).unwrap());

        // The response authenticator replaces the request authenticator on the wire
        response.authenticator = [0xAB; 16];
        let bytes = response.encode().unwrap();
        let offset = response.attribute_value_offset(attr_type).unwrap();

        assert!(verify_response_message_authenticator(&bytes, &request_auth, secret, offset));
        assert!(!verify_response_message_authenticator(&bytes, &[1u8; 16], secret, offset));
        assert!(!verify_response_message_authenticator(&bytes[..10], &request_auth, secret, offset));
    }

    #[test]
    fn test_verify_message_authenticator_out_of_bounds() {
        let packet = vec![0u8; 20];
        assert!(!verify_message_authenticator(&packet, b"adminsecret", 100));
    }
}
