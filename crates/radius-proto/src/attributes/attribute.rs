use super::AttributeType;
use crate::packet::PacketError;
use std::io::{Cursor, Read, Write};

/// RADIUS Attribute structure as defined in RFC 2865 Section 5
///
/// ```text
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Type      |    Length     |  Value ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute type (1 byte)
    pub attr_type: u8,
    /// Attribute value (0-253 bytes)
    pub value: Vec<u8>,
}

impl Attribute {
    /// Minimum attribute length (type + length fields = 2 bytes)
    pub const MIN_LENGTH: usize = 2;
    /// Maximum attribute length (255 bytes including type and length)
    pub const MAX_LENGTH: usize = 255;
    /// Maximum value length (253 bytes)
    pub const MAX_VALUE_LENGTH: usize = 253;
    /// Vendor-Id prefix of a Vendor-Specific value (RFC 2865 Section 5.26)
    pub const VENDOR_ID_LENGTH: usize = 4;

    pub fn new(attr_type: u8, value: Vec<u8>) -> Result<Self, PacketError> {
        if value.len() > Self::MAX_VALUE_LENGTH {
            return Err(PacketError::AttributeError(format!(
                "Attribute value too long: {} bytes (max {})",
                value.len(),
                Self::MAX_VALUE_LENGTH
            )));
        }
        Ok(Attribute { attr_type, value })
    }

    /// Create a string attribute
    pub fn string(attr_type: u8, value: impl Into<String>) -> Result<Self, PacketError> {
        Self::new(attr_type, value.into().into_bytes())
    }

    /// Create a Vendor-Specific attribute from a vendor ID and the raw
    /// vendor payload (the concatenated vendor sub-attributes)
    pub fn vendor_specific(vendor_id: u32, payload: &[u8]) -> Result<Self, PacketError> {
        let mut value = Vec::with_capacity(Self::VENDOR_ID_LENGTH + payload.len());
        value.extend_from_slice(&vendor_id.to_be_bytes());
        value.extend_from_slice(payload);
        Self::new(AttributeType::VendorSpecific as u8, value)
    }

    /// Encode attribute to bytes
    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        let length = self.encoded_length();
        if length > Self::MAX_LENGTH {
            return Err(PacketError::AttributeError(format!(
                "Encoded attribute too long: {} bytes",
                length
            )));
        }

        let mut buffer = Vec::with_capacity(length);
        buffer.write_all(&[self.attr_type, length as u8])?;
        buffer.write_all(&self.value)?;

        Ok(buffer)
    }

    /// Decode attribute from bytes
    pub fn decode(data: &[u8]) -> Result<Self, PacketError> {
        if data.len() < Self::MIN_LENGTH {
            return Err(PacketError::AttributeError(format!(
                "Attribute data too short: {} bytes",
                data.len()
            )));
        }

        let mut cursor = Cursor::new(data);

        let mut header = [0u8; 2];
        cursor.read_exact(&mut header)?;
        let attr_type = header[0];
        let length = header[1] as usize;

        if length < Self::MIN_LENGTH {
            return Err(PacketError::AttributeError(format!(
                "Invalid attribute length: {}",
                length
            )));
        }

        if data.len() < length {
            return Err(PacketError::AttributeError(format!(
                "Insufficient data for attribute: expected {}, got {}",
                length,
                data.len()
            )));
        }

        let mut value = vec![0u8; length - Self::MIN_LENGTH];
        cursor.read_exact(&mut value)?;

        Ok(Attribute { attr_type, value })
    }

    /// Get the encoded length of this attribute
    pub fn encoded_length(&self) -> usize {
        Self::MIN_LENGTH + self.value.len()
    }

    /// Split a Vendor-Specific attribute into its vendor ID and payload.
    ///
    /// Returns `None` for any other attribute type or when the value is too
    /// short to carry a vendor ID.
    pub fn as_vendor_specific(&self) -> Option<(u32, &[u8])> {
        if self.attr_type != AttributeType::VendorSpecific as u8
            || self.value.len() < Self::VENDOR_ID_LENGTH
        {
            return None;
        }
        let (id, payload) = self.value.split_at(Self::VENDOR_ID_LENGTH);
        Some((u32::from_be_bytes([id[0], id[1], id[2], id[3]]), payload))
    }

    /// Vendor payload if this is a Vendor-Specific attribute of `vendor_id`
    pub fn vendor_payload(&self, vendor_id: u32) -> Option<&[u8]> {
        match self.as_vendor_specific() {
            Some((id, payload)) if id == vendor_id => Some(payload),
            _ => None,
        }
    }
}
