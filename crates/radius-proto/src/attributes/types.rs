/// Standard RADIUS attribute types used by the status exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AttributeType {
    /// Reply-Message (18) - RFC 2865
    ReplyMessage = 18,
    /// Vendor-Specific (26) - RFC 2865
    ///
    /// Carries a 4-byte Vendor-Id followed by vendor sub-attributes.
    VendorSpecific = 26,
    /// Message-Authenticator (80) - RFC 2869
    ///
    /// HMAC-MD5 over the whole packet; mandatory in Status-Server requests
    /// (RFC 5997 Section 3).
    MessageAuthenticator = 80,
}
