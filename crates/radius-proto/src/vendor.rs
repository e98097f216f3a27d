//! Vendor sub-attribute codec (RFC 2865 Section 5.26)
//!
//! A Vendor-Specific attribute carries a 4-byte Vendor-Id followed by any
//! number of vendor sub-attributes, each a type-length-value triplet:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Type      |  Length       |            Vendor-Id
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!      Vendor-Id (cont)           | Vendor type   | Vendor length |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Attribute-Specific...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The vendor length covers the 2-byte sub-attribute header. Scanning a
//! payload stops at the first malformed sub-attribute (length below 3 or
//! running past the payload); it and everything after it in that
//! Vendor-Specific attribute are treated as absent.

use crate::attributes::Attribute;
use std::net::Ipv4Addr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Sub-attribute header: vendor type + vendor length
pub const TLV_HEADER_LENGTH: usize = 2;
/// Shortest well-formed sub-attribute (header plus one value byte)
pub const MIN_TLV_LENGTH: usize = 3;
/// Largest value a sub-attribute length byte can describe
pub const MAX_TLV_VALUE_LENGTH: usize = u8::MAX as usize - TLV_HEADER_LENGTH;
/// Largest value [`set`] can carry: one sub-attribute in one Vendor-Specific
/// attribute must fit the 253-byte attribute value
pub const MAX_SET_VALUE_LENGTH: usize =
    Attribute::MAX_VALUE_LENGTH - Attribute::VENDOR_ID_LENGTH - TLV_HEADER_LENGTH;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VendorError {
    #[error("Vendor attribute {0} not present")]
    NotFound(u8),
    #[error("Vendor attribute {attr_type} value too long: {len} bytes (max {max})")]
    ValueTooLong { attr_type: u8, len: usize, max: usize },
    #[error("Vendor attribute {0} value is empty")]
    EmptyValue(u8),
    #[error("Vendor attribute {attr_type}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        attr_type: u8,
        expected: usize,
        actual: usize,
    },
}

impl VendorError {
    /// True when the sub-attribute was simply absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, VendorError::NotFound(_))
    }
}

/// Iterator over the well-formed sub-attributes of one vendor payload,
/// yielding `(vendor type, value)`
#[derive(Debug, Clone)]
pub struct SubAttributes<'a> {
    remaining: &'a [u8],
}

/// Iterate the sub-attributes of a vendor payload (Vendor-Id already stripped)
pub fn sub_attributes(payload: &[u8]) -> SubAttributes<'_> {
    SubAttributes { remaining: payload }
}

impl<'a> Iterator for SubAttributes<'a> {
    type Item = (u8, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let length = tlv_length(self.remaining)?;
        let (tlv, rest) = self.remaining.split_at(length);
        self.remaining = rest;
        Some((tlv[0], &tlv[TLV_HEADER_LENGTH..]))
    }
}

/// Length of the sub-attribute at the start of `data`, or `None` when there
/// is no well-formed one
fn tlv_length(data: &[u8]) -> Option<usize> {
    if data.len() < MIN_TLV_LENGTH {
        return None;
    }
    let length = data[1] as usize;
    (MIN_TLV_LENGTH..=data.len())
        .contains(&length)
        .then_some(length)
}

/// Encode one sub-attribute: `[type, 2 + len, value..]`
pub fn encode(attr_type: u8, value: &[u8]) -> Result<Vec<u8>, VendorError> {
    if value.is_empty() {
        return Err(VendorError::EmptyValue(attr_type));
    }
    if value.len() > MAX_TLV_VALUE_LENGTH {
        return Err(VendorError::ValueTooLong {
            attr_type,
            len: value.len(),
            max: MAX_TLV_VALUE_LENGTH,
        });
    }

    let mut tlv = Vec::with_capacity(TLV_HEADER_LENGTH + value.len());
    tlv.push(attr_type);
    tlv.push((TLV_HEADER_LENGTH + value.len()) as u8);
    tlv.extend_from_slice(value);
    Ok(tlv)
}

/// Build a Vendor-Specific attribute carrying exactly one sub-attribute
pub fn vendor_specific(
    vendor_id: u32,
    attr_type: u8,
    value: &[u8],
) -> Result<Attribute, VendorError> {
    let too_long = || VendorError::ValueTooLong {
        attr_type,
        len: value.len(),
        max: MAX_SET_VALUE_LENGTH,
    };
    if value.len() > MAX_SET_VALUE_LENGTH {
        return Err(too_long());
    }
    let tlv = encode(attr_type, value)?;
    Attribute::vendor_specific(vendor_id, &tlv).map_err(|_| too_long())
}

/// Set a vendor sub-attribute, replacing any previous value.
///
/// Every sub-attribute of `attr_type` is removed from the Vendor-Specific
/// attributes of `vendor_id`; those left without sub-attributes are dropped.
/// A new Vendor-Specific attribute carrying only the new value is appended.
/// On error the attribute list is left untouched.
pub fn set(
    attributes: &mut Vec<Attribute>,
    vendor_id: u32,
    attr_type: u8,
    value: &[u8],
) -> Result<(), VendorError> {
    let replacement = vendor_specific(vendor_id, attr_type, value)?;

    let mut dropped = 0usize;
    attributes.retain_mut(|attr| {
        let Some(payload) = attr.vendor_payload(vendor_id) else {
            return true;
        };
        let scrubbed = scrub(payload, attr_type);
        if scrubbed.len() == payload.len() {
            return true;
        }
        if scrubbed.is_empty() {
            dropped += 1;
            return false;
        }
        attr.value.truncate(Attribute::VENDOR_ID_LENGTH);
        attr.value.extend_from_slice(&scrubbed);
        true
    });

    if dropped > 0 {
        debug!(
            vendor_id,
            attr_type,
            dropped,
            "Dropped Vendor-Specific attributes emptied by set"
        );
    }

    attributes.push(replacement);
    Ok(())
}

/// Copy of `payload` without sub-attributes of `attr_type`. Bytes from the
/// first malformed sub-attribute onwards are kept verbatim.
fn scrub(payload: &[u8], attr_type: u8) -> Vec<u8> {
    let mut kept = Vec::with_capacity(payload.len());
    let mut rest = payload;
    while let Some(length) = tlv_length(rest) {
        let (tlv, tail) = rest.split_at(length);
        if tlv[0] != attr_type {
            kept.extend_from_slice(tlv);
        }
        rest = tail;
    }
    kept.extend_from_slice(rest);
    kept
}

/// First value of vendor sub-attribute `attr_type` across all Vendor-Specific
/// attributes of `vendor_id`
pub fn lookup(attributes: &[Attribute], vendor_id: u32, attr_type: u8) -> Option<&[u8]> {
    attributes
        .iter()
        .filter_map(|attr| attr.vendor_payload(vendor_id))
        .flat_map(sub_attributes)
        .find(|(t, _)| *t == attr_type)
        .map(|(_, value)| value)
}

fn require(attributes: &[Attribute], vendor_id: u32, attr_type: u8) -> Result<&[u8], VendorError> {
    lookup(attributes, vendor_id, attr_type).ok_or(VendorError::NotFound(attr_type))
}

fn four_bytes(value: &[u8], attr_type: u8) -> Result<[u8; 4], VendorError> {
    value.try_into().map_err(|_| VendorError::InvalidLength {
        attr_type,
        expected: 4,
        actual: value.len(),
    })
}

/// Integer sub-attribute (32-bit big-endian)
pub fn get_integer(
    attributes: &[Attribute],
    vendor_id: u32,
    attr_type: u8,
) -> Result<u32, VendorError> {
    let value = require(attributes, vendor_id, attr_type)?;
    Ok(u32::from_be_bytes(four_bytes(value, attr_type)?))
}

/// String sub-attribute; invalid UTF-8 is replaced rather than rejected
pub fn get_string(
    attributes: &[Attribute],
    vendor_id: u32,
    attr_type: u8,
) -> Result<String, VendorError> {
    let value = require(attributes, vendor_id, attr_type)?;
    Ok(String::from_utf8_lossy(value).into_owned())
}

/// Date sub-attribute: seconds since the Unix epoch, 32-bit big-endian
pub fn get_date(
    attributes: &[Attribute],
    vendor_id: u32,
    attr_type: u8,
) -> Result<SystemTime, VendorError> {
    let value = require(attributes, vendor_id, attr_type)?;
    let seconds = u32::from_be_bytes(four_bytes(value, attr_type)?);
    Ok(UNIX_EPOCH + Duration::from_secs(u64::from(seconds)))
}

/// IPv4 address sub-attribute
pub fn get_ipv4(
    attributes: &[Attribute],
    vendor_id: u32,
    attr_type: u8,
) -> Result<Ipv4Addr, VendorError> {
    let value = require(attributes, vendor_id, attr_type)?;
    Ok(Ipv4Addr::from(four_bytes(value, attr_type)?))
}
