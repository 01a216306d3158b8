//! secp256k1 private key.
//!
//! Wraps a k256 signing key and provides hex/byte constructors, public key
//! derivation, and deterministic ECDSA signing of 32-byte digests.

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// A secp256k1 private key for signing.
///
/// Wraps a k256 `SigningKey`. Signing is deterministic (RFC6979) and
/// produces low-S normalized signatures per BIP-0062.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    /// The underlying k256 signing key.
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key using the OS random number generator.
    ///
    /// # Returns
    /// A new randomly generated `PrivateKey`.
    pub fn new() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        PrivateKey { inner: signing_key }
    }

    /// Create a private key from a raw 32-byte scalar.
    ///
    /// # Arguments
    /// * `bytes` - A 32-byte slice representing the private key scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the bytes represent a valid scalar on secp256k1,
    /// or an error if the scalar is zero or out of range.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let signing_key = SigningKey::from_bytes(bytes.into())
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner: signing_key })
    }

    /// Create a private key from a hexadecimal string.
    ///
    /// # Arguments
    /// * `hex_str` - A 64-character hex string representing the 32-byte scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` on success, or an error if the hex or scalar is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes =
            hex::decode(hex_str).map_err(|e| PrimitivesError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the private key as a 32-byte big-endian array.
    ///
    /// # Returns
    /// A 32-byte array containing the private key scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Serialize the private key as a lowercase hexadecimal string.
    ///
    /// # Returns
    /// A 64-character hex string representing the 32-byte scalar.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Derive the corresponding public key for this private key.
    ///
    /// # Returns
    /// The `PublicKey` corresponding to this private key.
    pub fn pub_key(&self) -> PublicKey {
        let verifying_key = self.inner.verifying_key();
        PublicKey::from_k256_verifying_key(verifying_key)
    }

    /// Sign a 32-byte digest using deterministic RFC6979 nonces.
    ///
    /// Produces a low-S normalized signature per BIP-0062.
    ///
    /// # Arguments
    /// * `hash` - The message digest to sign (32 bytes).
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if signing fails.
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    /// Access the underlying k256 signing key.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The lowest valid private key scalar, whose public key is the
    /// secp256k1 generator point.
    const KEY_ONE_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    /// The generator point in compressed SEC1 form.
    const GENERATOR_COMPRESSED: &str =
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Parse the scalar 1 and verify the derived public key is the generator.
    #[test]
    fn test_from_hex_key_one() {
        let key = PrivateKey::from_hex(KEY_ONE_HEX).expect("should parse");
        assert_eq!(key.to_hex(), KEY_ONE_HEX);
        assert_eq!(hex::encode(key.pub_key().to_compressed()), GENERATOR_COMPRESSED);
    }

    /// A zero scalar is rejected.
    #[test]
    fn test_from_bytes_zero_scalar() {
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
    }

    /// Wrong-length input is rejected.
    #[test]
    fn test_from_bytes_wrong_length() {
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
    }

    /// Empty hex is rejected.
    #[test]
    fn test_from_hex_empty() {
        assert!(PrivateKey::from_hex("").is_err());
    }

    // -----------------------------------------------------------------------
    // Signing
    // -----------------------------------------------------------------------

    /// Sign a digest and verify it against the derived public key.
    #[test]
    fn test_sign_and_verify() {
        let key = PrivateKey::from_hex(KEY_ONE_HEX).expect("should parse");
        let digest = crate::hash::sha256d(b"digest to sign");
        let sig = key.sign(&digest).expect("should sign");
        assert!(sig.verify(&digest, &key.pub_key()));
    }

    /// RFC6979 signing is deterministic: same key and digest, same signature.
    #[test]
    fn test_sign_deterministic() {
        let key = PrivateKey::from_hex(KEY_ONE_HEX).expect("should parse");
        let digest = crate::hash::sha256d(b"digest to sign");
        let sig1 = key.sign(&digest).expect("should sign");
        let sig2 = key.sign(&digest).expect("should sign");
        assert_eq!(sig1.to_der(), sig2.to_der());
    }

    /// Random keys generate distinct scalars.
    #[test]
    fn test_random_keys_distinct() {
        let a = PrivateKey::new();
        let b = PrivateKey::new();
        assert_ne!(a.to_bytes(), b.to_bytes());
    }
}
