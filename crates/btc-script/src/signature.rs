//! Script-level signature encoding.
//!
//! A signature in unlocking data is the DER-encoded ECDSA signature with a
//! single hash-type byte appended. This module converts between that wire
//! form and the `Signature` type, and provides the canonicality predicates
//! used when recovering signing state from an existing transaction.

use btc_primitives::ec::Signature;

use crate::ScriptError;

/// Encode a signature into its script wire form: DER bytes followed by the
/// hash-type byte.
///
/// # Arguments
/// * `sig` - The ECDSA signature.
/// * `hash_type` - The sighash flags; only the low byte is appended.
///
/// # Returns
/// The DER encoding with the hash-type byte suffix.
pub fn encode_signature(sig: &Signature, hash_type: u32) -> Vec<u8> {
    let der = sig.to_der();
    let mut out = Vec::with_capacity(der.len() + 1);
    out.extend_from_slice(&der);
    out.push(hash_type as u8);
    out
}

/// Decode a script wire-form signature into the ECDSA signature and its
/// hash type.
///
/// # Arguments
/// * `bytes` - DER bytes with a trailing hash-type byte.
///
/// # Returns
/// The decoded `(Signature, hash_type)` pair, or an error if the encoding
/// is malformed.
pub fn decode_signature(bytes: &[u8]) -> Result<(Signature, u32), ScriptError> {
    if bytes.is_empty() {
        return Err(ScriptError::InvalidSignatureEncoding(
            "empty signature".to_string(),
        ));
    }
    let hash_type = bytes[bytes.len() - 1] as u32;
    if !is_defined_hash_type(hash_type) {
        return Err(ScriptError::InvalidSignatureEncoding(format!(
            "invalid hashType {}",
            hash_type
        )));
    }
    let sig = Signature::from_der(&bytes[..bytes.len() - 1])
        .map_err(|e| ScriptError::InvalidSignatureEncoding(e.to_string()))?;
    Ok((sig, hash_type))
}

/// Extract the hash type from a script wire-form signature.
///
/// # Arguments
/// * `sig_bytes` - DER bytes with a trailing hash-type byte.
///
/// # Returns
/// The hash-type byte as a u32.
pub fn hash_type_of(sig_bytes: &[u8]) -> u32 {
    match sig_bytes.last() {
        Some(b) => *b as u32,
        None => 0,
    }
}

/// Check whether a hash-type byte selects a defined sighash mode.
///
/// The low 5 bits must be ALL (1), NONE (2), or SINGLE (3); the
/// ANYONECANPAY bit (0x80) is ignored.
fn is_defined_hash_type(hash_type: u32) -> bool {
    let mode = hash_type & !0x80;
    mode > 0x00 && mode < 0x04
}

/// Check whether bytes look like a canonical script signature: a parseable
/// DER body with a defined hash-type suffix.
///
/// # Arguments
/// * `bytes` - Candidate signature bytes from a scriptSig or witness item.
///
/// # Returns
/// `true` if the bytes form a canonical signature.
pub fn is_canonical_signature(bytes: &[u8]) -> bool {
    decode_signature(bytes).is_ok()
}

/// Check whether bytes look like a canonical SEC1 public key encoding.
///
/// Accepts 33-byte compressed (0x02/0x03 prefix) and 65-byte uncompressed
/// (0x04 prefix) forms. Point validity is not checked here.
///
/// # Arguments
/// * `bytes` - Candidate public key bytes.
///
/// # Returns
/// `true` if the bytes have a canonical public key shape.
pub fn is_canonical_pubkey(bytes: &[u8]) -> bool {
    match bytes.first() {
        Some(0x02) | Some(0x03) => bytes.len() == 33,
        Some(0x04) => bytes.len() == 65,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use btc_primitives::ec::PrivateKey;
    use btc_primitives::hash::sha256d;

    fn test_signature() -> Signature {
        let key = PrivateKey::from_hex(
            "0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        key.sign(&sha256d(b"script signature")).unwrap()
    }

    /// Encode then decode preserves the signature and hash type.
    #[test]
    fn test_encode_decode_roundtrip() {
        let sig = test_signature();
        for hash_type in [0x01u32, 0x02, 0x03, 0x81, 0x82, 0x83] {
            let encoded = encode_signature(&sig, hash_type);
            assert_eq!(hash_type_of(&encoded), hash_type);
            let (decoded, decoded_type) = decode_signature(&encoded).unwrap();
            assert_eq!(decoded_type, hash_type);
            assert_eq!(decoded.to_der(), sig.to_der());
        }
    }

    /// A zero or out-of-range hash type is rejected.
    #[test]
    fn test_decode_undefined_hash_type() {
        let sig = test_signature();
        let mut encoded = encode_signature(&sig, 0x01);
        let last = encoded.len() - 1;
        encoded[last] = 0x00;
        assert!(decode_signature(&encoded).is_err());
        encoded[last] = 0x04;
        assert!(decode_signature(&encoded).is_err());
    }

    #[test]
    fn test_is_canonical_signature() {
        let sig = test_signature();
        assert!(is_canonical_signature(&encode_signature(&sig, 0x01)));
        assert!(!is_canonical_signature(&[]));
        assert!(!is_canonical_signature(&[0x30, 0x01]));
    }

    #[test]
    fn test_is_canonical_pubkey() {
        let mut compressed = vec![0x02];
        compressed.extend_from_slice(&[0u8; 32]);
        assert!(is_canonical_pubkey(&compressed));

        let mut uncompressed = vec![0x04];
        uncompressed.extend_from_slice(&[0u8; 64]);
        assert!(is_canonical_pubkey(&uncompressed));

        assert!(!is_canonical_pubkey(&[0x02; 20]));
        assert!(!is_canonical_pubkey(&[]));
    }
}
