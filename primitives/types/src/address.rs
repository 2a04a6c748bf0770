//! Chia addresses are the bech32m encoding of a 32-byte puzzle hash under a
//! network prefix (`xch` on mainnet, `txch` on testnets).
//!
//! ```
//! use types::{decode_puzzle_hash, encode_puzzle_hash, Bytes32};
//!
//! let puzzle_hash = Bytes32::new([0u8; 32]);
//! let address = encode_puzzle_hash(&puzzle_hash, "xch")?;
//! let (prefix, decoded) = decode_puzzle_hash(&address)?;
//! assert_eq!(prefix, "xch");
//! assert_eq!(decoded, puzzle_hash);
//! # Ok::<(), types::AddressError>(())
//! ```

use bitcoin::bech32::primitives::decode::CheckedHrpstring;
use bitcoin::bech32::{self, Bech32m, Hrp};
use thiserror::Error;

use crate::bytes32::Bytes32;

/// Errors produced by the address codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The network prefix is not a valid bech32 human-readable part.
    #[error("invalid address prefix '{0}'")]
    InvalidPrefix(String),
    /// The string is not valid bech32m (bad characters, bad checksum, or a
    /// legacy bech32 checksum).
    #[error("invalid address: {0}")]
    InvalidEncoding(String),
    /// The payload is not a 32-byte puzzle hash.
    #[error("address payload must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Encodes a puzzle hash as an address with the given network prefix.
pub fn encode_puzzle_hash(puzzle_hash: &Bytes32, prefix: &str) -> Result<String, AddressError> {
    let hrp = Hrp::parse(&prefix.to_lowercase())
        .map_err(|_| AddressError::InvalidPrefix(prefix.to_string()))?;
    bech32::encode::<Bech32m>(hrp, puzzle_hash.as_bytes())
        .map_err(|e| AddressError::InvalidEncoding(e.to_string()))
}

/// Decodes an address into its prefix and puzzle hash.
///
/// Only bech32m checksums are accepted.
pub fn decode_puzzle_hash(address: &str) -> Result<(String, Bytes32), AddressError> {
    let checked = CheckedHrpstring::new::<Bech32m>(address.trim())
        .map_err(|e| AddressError::InvalidEncoding(e.to_string()))?;
    let payload: Vec<u8> = checked.byte_iter().collect();
    let puzzle_hash =
        Bytes32::from_slice(&payload).map_err(|_| AddressError::InvalidLength(payload.len()))?;
    Ok((checked.hrp().to_lowercase(), puzzle_hash))
}
