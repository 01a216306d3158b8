//! secp256k1 public key.
//!
//! Supports compressed/uncompressed SEC1 serialization, Hash160
//! computation for addresses, and signature verification.

use std::fmt;

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key in bytes (prefix + 32 byte x + 32 byte y).
const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key for verification and address derivation.
///
/// Wraps a k256 `VerifyingKey`.
#[derive(Clone, Debug)]
pub struct PublicKey {
    /// The underlying k256 verifying key.
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a PublicKey from raw SEC1 encoded bytes.
    ///
    /// Accepts both compressed (33-byte) and uncompressed (65-byte) formats.
    ///
    /// # Arguments
    /// * `bytes` - SEC1-encoded public key bytes.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or an error if the bytes don't represent
    /// a valid curve point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPublicKey(
                "pubkey string is empty".to_string(),
            ));
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes)?;
        Ok(PublicKey { inner: vk })
    }

    /// Create a PublicKey from a hex-encoded SEC1 string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string of a compressed (66 chars) or uncompressed
    ///   (130 chars) key.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or an error if the hex or point is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the public key in compressed SEC1 format (33 bytes).
    ///
    /// The first byte is 0x02 (even Y) or 0x03 (odd Y), followed by the
    /// 32-byte X coordinate.
    ///
    /// # Returns
    /// A 33-byte array containing the compressed public key.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the public key in uncompressed SEC1 format (65 bytes).
    ///
    /// The first byte is 0x04, followed by 32-byte X and 32-byte Y coordinates.
    ///
    /// # Returns
    /// A 65-byte array containing the uncompressed public key.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the public key as a lowercase hexadecimal string
    /// (compressed format).
    ///
    /// # Returns
    /// A 66-character hex string of the compressed public key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Compute the Hash160 of the compressed public key.
    ///
    /// Hash160 = RIPEMD160(SHA256(compressed_pubkey)).
    ///
    /// # Returns
    /// A 20-byte hash digest.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Wrap an existing k256 verifying key.
    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: vk.clone() }
    }

    /// Access the underlying k256 verifying key.
    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }
}

impl fmt::Display for PublicKey {
    /// Display the public key as compressed hex.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATOR_COMPRESSED: &str =
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    /// Parse a compressed key and serialize it back.
    #[test]
    fn test_compressed_roundtrip() {
        let key = PublicKey::from_hex(GENERATOR_COMPRESSED).expect("should parse");
        assert_eq!(key.to_hex(), GENERATOR_COMPRESSED);
    }

    /// The uncompressed form begins with 0x04 and re-parses to the same point.
    #[test]
    fn test_uncompressed_roundtrip() {
        let key = PublicKey::from_hex(GENERATOR_COMPRESSED).expect("should parse");
        let uncompressed = key.to_uncompressed();
        assert_eq!(uncompressed[0], 0x04);
        let reparsed = PublicKey::from_bytes(&uncompressed).expect("should parse");
        assert_eq!(reparsed.to_compressed(), key.to_compressed());
    }

    /// The generator's Hash160 matches the well-known test fixture.
    #[test]
    fn test_hash160() {
        let key = PublicKey::from_hex(GENERATOR_COMPRESSED).expect("should parse");
        assert_eq!(
            hex::encode(key.hash160()),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
    }

    /// Garbage bytes are rejected.
    #[test]
    fn test_from_bytes_invalid() {
        assert!(PublicKey::from_bytes(&[]).is_err());
        // 0x05 is not a valid SEC1 tag byte.
        assert!(PublicKey::from_bytes(&[0x05; 33]).is_err());
    }
}
