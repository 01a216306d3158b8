//! ECDSA signature with DER serialization and RFC6979 deterministic nonces.
//!
//! Supports DER encoding/decoding, low-S normalization per BIP-0062, and
//! signature verification.

use k256::ecdsa;
use k256::ecdsa::signature::hazmat::PrehashVerifier;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// The secp256k1 curve order N.
/// N = FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// Half of the secp256k1 curve order (N/2), used for low-S normalization.
const HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B,
    0x20, 0xA0,
];

/// An ECDSA signature with R and S components.
///
/// Provides DER serialization, RFC6979 deterministic signing, and low-S
/// normalization per BIP-0062.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// The R component of the signature (32 bytes, big-endian).
    r: [u8; 32],
    /// The S component of the signature (32 bytes, big-endian).
    s: [u8; 32],
}

impl Signature {
    /// Create a signature from raw R and S 32-byte arrays.
    ///
    /// # Arguments
    /// * `r` - The R component (32 bytes, big-endian).
    /// * `s` - The S component (32 bytes, big-endian).
    ///
    /// # Returns
    /// A new `Signature` with the given R and S values.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    /// Access the R component of the signature.
    ///
    /// # Returns
    /// A reference to the 32-byte R value.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// Access the S component of the signature.
    ///
    /// # Returns
    /// A reference to the 32-byte S value.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Parse a DER-encoded ECDSA signature.
    ///
    /// Expected format: 0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>
    ///
    /// # Arguments
    /// * `bytes` - DER-encoded signature bytes.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if the DER encoding is malformed.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() < 8 {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: too short".to_string(),
            ));
        }

        if bytes[0] != 0x30 {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: no header magic".to_string(),
            ));
        }

        let sig_len = bytes[1] as usize;
        if sig_len + 2 > bytes.len() || sig_len + 2 < 8 {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: bad length".to_string(),
            ));
        }

        let data = &bytes[..sig_len + 2];
        let mut idx = 2;

        // Parse R
        if data[idx] != 0x02 {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: no 1st int marker".to_string(),
            ));
        }
        idx += 1;
        let r_len = data[idx] as usize;
        idx += 1;
        if r_len == 0 || idx + r_len > data.len() - 3 {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: bogus R length".to_string(),
            ));
        }
        let r_bytes = &data[idx..idx + r_len];
        idx += r_len;

        // Parse S
        if data[idx] != 0x02 {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: no 2nd int marker".to_string(),
            ));
        }
        idx += 1;
        let s_len = data[idx] as usize;
        idx += 1;
        if s_len == 0 || idx + s_len > data.len() {
            return Err(PrimitivesError::InvalidSignature(
                "malformed signature: bogus S length".to_string(),
            ));
        }
        let s_bytes = &data[idx..idx + s_len];

        // Convert R/S bytes to fixed 32-byte arrays (strip leading zeros, left-pad)
        let r = to_32_bytes(r_bytes)?;
        let s = to_32_bytes(s_bytes)?;

        // Validate R and S are non-zero and < curve order
        if is_zero(&r) {
            return Err(PrimitivesError::InvalidSignature(
                "signature R is zero".to_string(),
            ));
        }
        if is_zero(&s) {
            return Err(PrimitivesError::InvalidSignature(
                "signature S is zero".to_string(),
            ));
        }
        if !is_less_than(&r, &CURVE_ORDER) {
            return Err(PrimitivesError::InvalidSignature(
                "signature R is >= curve.N".to_string(),
            ));
        }
        if !is_less_than(&s, &CURVE_ORDER) {
            return Err(PrimitivesError::InvalidSignature(
                "signature S is >= curve.N".to_string(),
            ));
        }

        Ok(Signature { r, s })
    }

    /// Serialize the signature in DER format with low-S normalization.
    ///
    /// Output format: 0x30 <len> 0x02 <r_len> <r_bytes> 0x02 <s_len> <s_bytes>
    /// The S value is normalized to the lower half of the curve order per
    /// BIP-0062.
    ///
    /// # Returns
    /// A byte vector containing the DER-encoded signature.
    pub fn to_der(&self) -> Vec<u8> {
        // Low-S normalization: if S > halfOrder, replace S with N - S
        let s = if is_greater_than(&self.s, &HALF_ORDER) {
            subtract_from_order(&self.s)
        } else {
            self.s
        };

        let rb = canonicalize_int(&self.r);
        let sb = canonicalize_int(&s);

        let total_len = 6 + rb.len() + sb.len();
        let mut out = Vec::with_capacity(total_len);
        out.push(0x30);
        out.push((total_len - 2) as u8);
        out.push(0x02);
        out.push(rb.len() as u8);
        out.extend_from_slice(&rb);
        out.push(0x02);
        out.push(sb.len() as u8);
        out.extend_from_slice(&sb);
        out
    }

    /// Sign a 32-byte digest using RFC6979 deterministic nonces.
    ///
    /// Produces a low-S normalized signature per BIP-0062.
    ///
    /// # Arguments
    /// * `hash` - The message digest to sign (32 bytes).
    /// * `priv_key` - The private key to sign with.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if signing fails.
    pub fn sign(hash: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let signing_key = priv_key.signing_key();

        // Pad or truncate to 32 bytes to match the secp256k1 scalar size.
        let padded = Self::normalize_hash(hash);

        let (k256_sig, _recovery_id) = signing_key
            .sign_prehash_recoverable(&padded)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;

        let (r_bytes, s_bytes) = k256_sig.split_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&r_bytes);
        s.copy_from_slice(&s_bytes);

        // Low-S normalization
        if is_greater_than(&s, &HALF_ORDER) {
            s = subtract_from_order(&s);
        }

        Ok(Signature { r, s })
    }

    /// Verify this signature against a message digest and public key.
    ///
    /// # Arguments
    /// * `hash` - The message digest that was signed.
    /// * `pub_key` - The public key to verify against.
    ///
    /// # Returns
    /// `true` if the signature is valid, `false` otherwise.
    pub fn verify(&self, hash: &[u8], pub_key: &PublicKey) -> bool {
        // Build a k256 signature from R and S
        let k256_sig = match ecdsa::Signature::from_scalars(
            k256::FieldBytes::from(self.r),
            k256::FieldBytes::from(self.s),
        ) {
            Ok(sig) => sig,
            Err(_) => return false,
        };

        let padded = Self::normalize_hash(hash);
        pub_key
            .verifying_key()
            .verify_prehash(&padded, &k256_sig)
            .is_ok()
    }

    /// Normalize an arbitrary-length hash to exactly 32 bytes for
    /// secp256k1 ECDSA. Pads shorter hashes with leading zeros, truncates
    /// longer hashes.
    fn normalize_hash(hash: &[u8]) -> [u8; 32] {
        let mut padded = [0u8; 32];
        if hash.len() >= 32 {
            padded.copy_from_slice(&hash[..32]);
        } else {
            padded[32 - hash.len()..].copy_from_slice(hash);
        }
        padded
    }
}

// -----------------------------------------------------------------------
// Big-endian 32-byte integer helpers
// -----------------------------------------------------------------------

/// Left-pad or validate an integer byte string into a 32-byte array.
fn to_32_bytes(bytes: &[u8]) -> Result<[u8; 32], PrimitivesError> {
    // Strip leading zero padding bytes.
    let mut start = 0;
    while start < bytes.len() && bytes[start] == 0 {
        start += 1;
    }
    let trimmed = &bytes[start..];
    if trimmed.len() > 32 {
        return Err(PrimitivesError::InvalidSignature(
            "integer larger than 32 bytes".to_string(),
        ));
    }
    let mut out = [0u8; 32];
    out[32 - trimmed.len()..].copy_from_slice(trimmed);
    Ok(out)
}

/// Check whether a 32-byte big-endian integer is zero.
fn is_zero(v: &[u8; 32]) -> bool {
    v.iter().all(|b| *b == 0)
}

/// Compare two 32-byte big-endian integers: a < b.
fn is_less_than(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a < b
}

/// Compare two 32-byte big-endian integers: a > b.
fn is_greater_than(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a > b
}

/// Compute N - s over 32-byte big-endian integers.
fn subtract_from_order(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let diff = CURVE_ORDER[i] as i16 - s[i] as i16 - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }
    result
}

/// Encode a 32-byte big-endian integer as a minimal DER integer body.
///
/// Strips leading zeros, then prepends a single zero byte if the high bit
/// is set so the value is not interpreted as negative.
fn canonicalize_int(v: &[u8; 32]) -> Vec<u8> {
    let mut start = 0;
    while start < 31 && v[start] == 0 {
        start += 1;
    }
    let trimmed = &v[start..];
    if trimmed[0] & 0x80 != 0 {
        let mut out = Vec::with_capacity(trimmed.len() + 1);
        out.push(0x00);
        out.extend_from_slice(trimmed);
        out
    } else {
        trimmed.to_vec()
    }
}
