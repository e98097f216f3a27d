use crate::packet::{Packet, PacketError};
use rand::Rng;

/// Generate a random Request Authenticator (16 bytes) per RFC 2865 Section 3
///
/// RFC 5997 requires Status-Server requests to carry an unpredictable
/// Request Authenticator, just like Access-Request.
pub fn generate_request_authenticator() -> [u8; 16] {
    let mut rng = rand::rng();
    let mut authenticator = [0u8; 16];
    rng.fill(&mut authenticator);
    authenticator
}

/// Generate a random packet Identifier
pub fn generate_identifier() -> u8 {
    rand::rng().random()
}

/// Calculate Response Authenticator per RFC 2865 Section 3
///
/// Response Authenticator = MD5(Code + ID + Length + Request Authenticator + Attributes + Secret)
///
/// Access-Accept answers to Status-Server are signed the same way.
pub fn calculate_response_authenticator(
    packet: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> Result<[u8; 16], PacketError> {
    let mut data = packet.encode()?;
    data[4..Packet::MIN_PACKET_SIZE].copy_from_slice(request_authenticator);
    data.extend_from_slice(secret);

    Ok(md5::compute(&data).0)
}

/// Verify Response Authenticator
///
/// Verifies that the Response Authenticator matches the expected value
/// calculated from the request and secret. A packet that cannot be
/// re-encoded never verifies.
pub fn verify_response_authenticator(
    response: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> bool {
    match calculate_response_authenticator(response, request_authenticator, secret) {
        Ok(calculated) => response.authenticator == calculated,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;
    use crate::packet::Code;

    #[test]
    fn test_generate_authenticator() {
        let auth1 = generate_request_authenticator();
        let auth2 = generate_request_authenticator();
        assert_ne!(auth1, auth2);
    }

    #[test]
    fn test_response_authenticator() {
        let secret = b"adminsecret";
        let request_auth = [1u8; 16];
        let mut packet = Packet::new(Code::AccessAccept, 42, [0u8; 16]);
        packet.add_attribute(Attribute::vendor_specific(11344, &[128, 6, 0, 0, 0, 42]).unwrap());

        packet.authenticator =
            calculate_response_authenticator(&packet, &request_auth, secret).unwrap();

        assert!(verify_response_authenticator(&packet, &request_auth, secret));
        assert!(!verify_response_authenticator(&packet, &[2u8; 16], secret));
        assert!(!verify_response_authenticator(&packet, &request_auth, b"othersecret"));
    }

    #[test]
    fn test_response_authenticator_ignores_current_authenticator() {
        let secret = b"adminsecret";
        let request_auth = [7u8; 16];
        let mut packet = Packet::new(Code::AccessAccept, 1, [0u8; 16]);
        let first = calculate_response_authenticator(&packet, &request_auth, secret).unwrap();

        packet.authenticator = [0xFF; 16];
        let second = calculate_response_authenticator(&packet, &request_auth, secret).unwrap();

        assert_eq!(first, second);
    }
}
