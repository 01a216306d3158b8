//! Chain hash type for transaction identification.
//!
//! Provides a `Hash` type - a 32-byte array displayed as byte-reversed hex,
//! matching Bitcoin's convention for transaction IDs and block hashes.

use std::fmt;
use std::str::FromStr;

use crate::PrimitivesError;

/// Size of a Hash in bytes.
pub const HASH_SIZE: usize = 32;

/// Maximum hex string length for a Hash (64 hex characters).
pub const MAX_HASH_STRING_SIZE: usize = HASH_SIZE * 2;

/// A 32-byte hash used for transaction IDs and outpoints.
///
/// When displayed as a string, the bytes are reversed to match Bitcoin's
/// standard representation (little-endian internal, big-endian display).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Create a Hash from a raw 32-byte array.
    ///
    /// The bytes are stored as-is (internal byte order).
    ///
    /// # Arguments
    /// * `bytes` - The 32 bytes in internal (little-endian) order.
    ///
    /// # Returns
    /// A new `Hash`.
    pub fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Create a Hash from a byte slice.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 32 bytes.
    ///
    /// # Returns
    /// `Ok(Hash)` if the slice is 32 bytes, or an error otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != HASH_SIZE {
            return Err(PrimitivesError::InvalidHash(format!(
                "invalid hash length of {}, want {}",
                bytes.len(),
                HASH_SIZE
            )));
        }
        let mut arr = [0u8; HASH_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Hash(arr))
    }

    /// Create a Hash from a byte-reversed hex string.
    ///
    /// The hex string represents bytes in display order (reversed from
    /// internal storage). Short strings are zero-padded on the high end.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string of up to 64 characters.
    ///
    /// # Returns
    /// `Ok(Hash)` on success, or an error for invalid input.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Ok(Hash::default());
        }
        if hex_str.len() > MAX_HASH_STRING_SIZE {
            return Err(PrimitivesError::InvalidHash(format!(
                "max hash string length is {} bytes",
                MAX_HASH_STRING_SIZE
            )));
        }

        // Pad to even length if needed.
        let padded = if hex_str.len() % 2 != 0 {
            format!("0{}", hex_str)
        } else {
            hex_str.to_string()
        };

        let decoded = hex::decode(&padded)?;

        // Reverse into internal order, zero-padding the high end.
        let mut arr = [0u8; HASH_SIZE];
        for (i, byte) in decoded.iter().rev().enumerate() {
            arr[i] = *byte;
        }
        Ok(Hash(arr))
    }

    /// Return a reference to the internal (little-endian) bytes.
    ///
    /// # Returns
    /// The 32 internal-order bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Render the hash as byte-reversed (display order) hex.
    ///
    /// # Returns
    /// A 64-character hex string.
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Hash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_TXID: &str = "45be95d2f2c64e99518ffbbce03fb15a7758f20ee5eecf0df07938d977add71d";

    /// Parse a display-order txid and verify internal storage is reversed.
    #[test]
    fn test_from_hex_reverses() {
        let hash = Hash::from_hex(TEST_TXID).expect("should parse");
        let mut display = *hash.as_bytes();
        display.reverse();
        assert_eq!(hex::encode(display), TEST_TXID);
    }

    /// Verify the Display output round-trips the original hex string.
    #[test]
    fn test_display_roundtrip() {
        let hash = Hash::from_hex(TEST_TXID).expect("should parse");
        assert_eq!(hash.to_string(), TEST_TXID);
    }

    /// An empty string yields the zero hash.
    #[test]
    fn test_from_hex_empty() {
        let hash = Hash::from_hex("").expect("should parse");
        assert_eq!(hash, Hash::default());
    }

    /// Short hex strings are zero-padded on the high end.
    #[test]
    fn test_from_hex_short() {
        let hash = Hash::from_hex("0a").expect("should parse");
        assert_eq!(hash.as_bytes()[0], 0x0a);
        assert!(hash.as_bytes()[1..].iter().all(|b| *b == 0));
    }

    /// Strings longer than 64 characters are rejected.
    #[test]
    fn test_from_hex_too_long() {
        let result = Hash::from_hex(&"ab".repeat(33));
        assert!(result.is_err());
    }

    /// from_bytes requires exactly 32 bytes.
    #[test]
    fn test_from_bytes_wrong_length() {
        assert!(Hash::from_bytes(&[0u8; 31]).is_err());
        assert!(Hash::from_bytes(&[0u8; 32]).is_ok());
    }
}
