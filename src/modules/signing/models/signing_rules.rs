use crate::core::{AppError, Result};
use std::fmt;

/// Where the shared secret goes in the signing input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretPlacement {
    /// `<canonical>&<name>=<secret>`
    KeyValueSuffix(&'static str),
    /// `<canonical><secret>`
    Appended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexCase {
    Upper,
    Lower,
}

/// 128-bit MD5 digest or HMAC-SHA256 keyed with the shared secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestKind {
    Md5,
    HmacSha256,
}

impl DigestKind {
    /// Parse the gateway's `sign_type` label
    pub fn from_label(label: &str) -> Result<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "MD5" => Ok(DigestKind::Md5),
            "HMAC-SHA256" => Ok(DigestKind::HmacSha256),
            other => Err(AppError::validation(format!("Unsupported sign type: {}", other))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DigestKind::Md5 => "MD5",
            DigestKind::HmacSha256 => "HMAC-SHA256",
        }
    }
}

impl fmt::Display for DigestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-gateway constants of the shared signing algorithm
#[derive(Debug, Clone, Copy)]
pub struct SigningRules {
    /// Field carrying the signature in requests and responses
    pub signature_field: &'static str,
    /// Reserved field name for the shared secret; never signed as a field, never sent
    pub secret_field: &'static str,
    /// Further fields left out of the signing input
    pub excluded_fields: &'static [&'static str],
    pub secret_placement: SecretPlacement,
    pub hex_case: HexCase,
    pub default_digest: DigestKind,
    /// Field whose value selects the digest, when the gateway supports several
    pub sign_type_field: Option<&'static str>,
}

impl SigningRules {
    /// True for fields that never take part in the signing input
    pub fn is_unsigned(&self, key: &str) -> bool {
        key == self.signature_field
            || key == self.secret_field
            || self.excluded_fields.iter().any(|f| *f == key)
    }
}
