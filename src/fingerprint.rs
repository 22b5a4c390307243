use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::bytes::Regex;
use std::ffi::OsStr;
use std::fmt;

lazy_static! {
    static ref TOKEN_REGEX: Regex =
        Regex::new(r"\[([A-Fa-f0-9]{8})\]").expect("checksum token regex is valid");
}

/// A CRC-32 value as it appears in (or belongs in) a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u32);

impl Fingerprint {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// Bracketed, uppercase form used inside file names, e.g. `[1A2B3C4D]`.
    pub fn token(self) -> String {
        encode(self.to_bytes())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl From<u32> for Fingerprint {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Extract the first `[XXXXXXXX]` hex token from a file name.
/// A name without a token is `Ok(None)`, not an error.
pub fn extract(name: &str) -> Result<Option<Fingerprint>> {
    extract_bytes(name.as_bytes())
}

/// Same as [`extract`], for names that may not be valid UTF-8.
pub fn extract_os(name: &OsStr) -> Result<Option<Fingerprint>> {
    extract_bytes(name.as_encoded_bytes())
}

/// Match on raw name bytes; the token itself is always ASCII.
pub fn extract_bytes(name: &[u8]) -> Result<Option<Fingerprint>> {
    let Some(captures) = TOKEN_REGEX.captures(name) else {
        return Ok(None);
    };
    let hex_digits = &captures[1];

    let mut bytes = [0u8; 4];
    hex::decode_to_slice(hex_digits, &mut bytes).map_err(|source| Error::Parse {
        token: String::from_utf8_lossy(hex_digits).into_owned(),
        source,
    })?;
    Ok(Some(Fingerprint::from_bytes(bytes)))
}

/// Render 4 bytes as `[XXXXXXXX]` with uppercase hex digits.
pub fn encode(bytes: [u8; 4]) -> String {
    format!("[{}]", hex::encode_upper(bytes))
}
