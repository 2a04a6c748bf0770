use std::fmt;
use std::str::FromStr;

use bitcoin::hex::{DisplayHex, FromHex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors produced when parsing a [`Bytes32`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Bytes32Error {
    /// The input was not valid hexadecimal.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    /// The input decoded to the wrong number of bytes.
    #[error("expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// A 32-byte hash (header hash, coin id, puzzle hash, launcher id...).
///
/// Serialized the way the node does: `0x` followed by 64 lowercase hex
/// digits. Parsing accepts the value with or without the prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Bytes32([u8; 32]);

impl Bytes32 {
    /// Wraps raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self { Self(bytes) }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] { &self.0 }

    /// Copies a slice, failing unless it is exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Bytes32Error> {
        let array: [u8; 32] =
            bytes.try_into().map_err(|_| Bytes32Error::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self { Self(bytes) }
}

impl AsRef<[u8]> for Bytes32 {
    fn as_ref(&self) -> &[u8] { &self.0 }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.0.to_lower_hex_string())
    }
}

impl fmt::Debug for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(self, f) }
}

impl FromStr for Bytes32 {
    type Err = Bytes32Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes =
            Vec::<u8>::from_hex(digits).map_err(|e| Bytes32Error::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for Bytes32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Bytes32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0x000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn test_parse_and_display() {
        let hash: Bytes32 = HASH.parse().expect("valid hash");
        assert_eq!(hash.as_bytes()[31], 0x1f);
        assert_eq!(hash.to_string(), HASH);

        let unprefixed: Bytes32 = HASH[2..].parse().expect("prefix is optional");
        assert_eq!(unprefixed, hash);

        let upper: Bytes32 = HASH.to_uppercase().replace("0X", "0x").parse().expect("case-insensitive");
        assert_eq!(upper, hash);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("0x1234".parse::<Bytes32>(), Err(Bytes32Error::InvalidLength(2)));
        assert!(matches!("0xzz".parse::<Bytes32>(), Err(Bytes32Error::InvalidHex(_))));
        assert!(matches!(Bytes32::from_slice(&[0u8; 33]), Err(Bytes32Error::InvalidLength(33))));
    }

    #[test]
    fn test_serde() {
        let hash: Bytes32 = HASH.parse().expect("valid hash");
        let json = serde_json::to_string(&hash).expect("serialize");
        assert_eq!(json, format!("\"{}\"", HASH));

        let back: Bytes32 = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, hash);

        assert!(serde_json::from_str::<Bytes32>("\"0x00\"").is_err());
        assert!(serde_json::from_str::<Bytes32>("12").is_err());
    }
}
