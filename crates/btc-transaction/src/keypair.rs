//! Signing key pair with network binding.
//!
//! Wraps a secp256k1 private key together with the network it was imported
//! for and its public key compression preference. WIF (Wallet Import
//! Format) encoding carries both: the prefix byte selects the network and
//! the optional trailing flag byte selects compression.

use btc_primitives::ec::{PrivateKey, Signature};
use btc_primitives::hash::sha256d;
use btc_script::Network;

use crate::BuilderError;

/// Length of a private key scalar in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// Compression flag byte appended to WIF for compressed public keys.
const COMPRESS_MAGIC: u8 = 0x01;

/// A private key bound to a network, used to sign transaction inputs.
///
/// The network is optional: a key pair constructed from raw key material
/// carries no network and signs for any builder. A key pair imported from
/// WIF is bound to the network its prefix byte names.
#[derive(Clone, Debug)]
pub struct KeyPair {
    /// The underlying signing key.
    key: PrivateKey,

    /// The network this key pair is bound to, if known.
    pub network: Option<Network>,

    /// Whether the public key serializes in compressed form.
    compressed: bool,
}

impl KeyPair {
    /// Wrap a private key, optionally binding it to a network.
    ///
    /// The public key defaults to compressed form.
    ///
    /// # Arguments
    /// * `key` - The private key.
    /// * `network` - The network to bind to, or `None`.
    ///
    /// # Returns
    /// A new `KeyPair`.
    pub fn new(key: PrivateKey, network: Option<Network>) -> Self {
        KeyPair {
            key,
            network,
            compressed: true,
        }
    }

    /// Import a key pair from a WIF (Wallet Import Format) string.
    ///
    /// Decodes the Base58Check string, validates the checksum and
    /// compression flag, and resolves the network from the prefix byte.
    /// When `network` is supplied, the prefix must match it.
    ///
    /// # Arguments
    /// * `wif` - A Base58Check-encoded WIF string.
    /// * `network` - The expected network, or `None` to accept any known prefix.
    ///
    /// # Returns
    /// `Ok(KeyPair)` bound to the decoded network, or a `BuilderError` if
    /// the WIF is malformed or the network disagrees.
    pub fn from_wif(wif: &str, network: Option<Network>) -> Result<Self, BuilderError> {
        let decoded = bs58::decode(wif)
            .into_vec()
            .map_err(|e| BuilderError::InvalidArgument(format!("malformed WIF: {}", e)))?;
        let decoded_len = decoded.len();

        // Determine if compressed based on length:
        // 1 byte prefix + 32 bytes key + 1 byte compress flag + 4 byte checksum = 38
        // 1 byte prefix + 32 bytes key + 4 byte checksum = 37
        let compressed = match decoded_len {
            38 => {
                if decoded[33] != COMPRESS_MAGIC {
                    return Err(BuilderError::InvalidArgument(
                        "malformed WIF: invalid compression flag".to_string(),
                    ));
                }
                true
            }
            37 => false,
            _ => {
                return Err(BuilderError::InvalidArgument(format!(
                    "malformed WIF: invalid length {}",
                    decoded_len
                )));
            }
        };

        // Verify checksum: first 4 bytes of sha256d of the payload.
        let payload_end = decoded_len - 4;
        let checksum = sha256d(&decoded[..payload_end]);
        if checksum[..4] != decoded[payload_end..] {
            return Err(BuilderError::InvalidArgument(
                "malformed WIF: checksum mismatch".to_string(),
            ));
        }

        let decoded_network = if decoded[0] == Network::Mainnet.wif_prefix() {
            Network::Mainnet
        } else if decoded[0] == Network::Testnet.wif_prefix() {
            Network::Testnet
        } else {
            return Err(BuilderError::InvalidArgument(
                "Unknown network version".to_string(),
            ));
        };

        if let Some(expected) = network {
            if expected != decoded_network {
                return Err(BuilderError::InvalidArgument(
                    "Invalid network version".to_string(),
                ));
            }
        }

        let key = PrivateKey::from_bytes(&decoded[1..1 + PRIVATE_KEY_BYTES_LEN])?;
        Ok(KeyPair {
            key,
            network: Some(decoded_network),
            compressed,
        })
    }

    /// Export this key pair as a WIF string.
    ///
    /// Uses the bound network's prefix, defaulting to mainnet when the key
    /// pair carries no network.
    ///
    /// # Returns
    /// A Base58Check-encoded WIF string.
    pub fn to_wif(&self) -> String {
        let prefix = self.network.unwrap_or(Network::Mainnet).wif_prefix();
        let key_bytes = self.key.to_bytes();

        let mut payload = Vec::with_capacity(1 + PRIVATE_KEY_BYTES_LEN + 1 + 4);
        payload.push(prefix);
        payload.extend_from_slice(&key_bytes);
        if self.compressed {
            payload.push(COMPRESS_MAGIC);
        }

        let checksum = sha256d(&payload);
        payload.extend_from_slice(&checksum[..4]);

        bs58::encode(payload).into_string()
    }

    /// Return the SEC1-encoded public key.
    ///
    /// Compressed (33 bytes) or uncompressed (65 bytes) per the key pair's
    /// compression preference.
    ///
    /// # Returns
    /// The public key bytes.
    pub fn public_key(&self) -> Vec<u8> {
        if self.compressed {
            self.key.pub_key().to_compressed().to_vec()
        } else {
            self.key.pub_key().to_uncompressed().to_vec()
        }
    }

    /// Whether the public key serializes in compressed form.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Sign a 32-byte digest with deterministic ECDSA.
    ///
    /// # Arguments
    /// * `digest` - The signature-hash digest to sign.
    ///
    /// # Returns
    /// `Ok(Signature)` on success.
    pub fn sign(&self, digest: &[u8]) -> Result<Signature, BuilderError> {
        Ok(self.key.sign(digest)?)
    }

    /// Access the underlying private key.
    pub fn private_key(&self) -> &PrivateKey {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The best-known WIF fixture: the scalar 1, compressed, mainnet.
    const WIF_KEY_ONE_COMPRESSED: &str = "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn";

    /// The same scalar, uncompressed, mainnet.
    const WIF_KEY_ONE_UNCOMPRESSED: &str = "5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf";

    const KEY_ONE_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    // -----------------------------------------------------------------------
    // WIF decoding
    // -----------------------------------------------------------------------

    #[test]
    fn test_from_wif_compressed() {
        let pair = KeyPair::from_wif(WIF_KEY_ONE_COMPRESSED, None).expect("should parse");
        assert_eq!(pair.private_key().to_hex(), KEY_ONE_HEX);
        assert_eq!(pair.network, Some(Network::Mainnet));
        assert!(pair.is_compressed());
        assert_eq!(pair.public_key().len(), 33);
    }

    #[test]
    fn test_from_wif_uncompressed() {
        let pair = KeyPair::from_wif(WIF_KEY_ONE_UNCOMPRESSED, None).expect("should parse");
        assert_eq!(pair.private_key().to_hex(), KEY_ONE_HEX);
        assert!(!pair.is_compressed());
        assert_eq!(pair.public_key().len(), 65);
        assert_eq!(pair.public_key()[0], 0x04);
    }

    /// Importing a mainnet WIF for a testnet builder fails.
    #[test]
    fn test_from_wif_network_mismatch() {
        let err = KeyPair::from_wif(WIF_KEY_ONE_COMPRESSED, Some(Network::Testnet)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid network version");
    }

    #[test]
    fn test_from_wif_matching_network() {
        let pair = KeyPair::from_wif(WIF_KEY_ONE_COMPRESSED, Some(Network::Mainnet))
            .expect("should parse");
        assert_eq!(pair.network, Some(Network::Mainnet));
    }

    #[test]
    fn test_from_wif_garbage() {
        assert!(KeyPair::from_wif("not-a-wif", None).is_err());
        assert!(KeyPair::from_wif("", None).is_err());
    }

    // -----------------------------------------------------------------------
    // WIF encoding
    // -----------------------------------------------------------------------

    #[test]
    fn test_wif_roundtrip_compressed() {
        let pair = KeyPair::from_wif(WIF_KEY_ONE_COMPRESSED, None).unwrap();
        assert_eq!(pair.to_wif(), WIF_KEY_ONE_COMPRESSED);
    }

    #[test]
    fn test_wif_roundtrip_uncompressed() {
        let pair = KeyPair::from_wif(WIF_KEY_ONE_UNCOMPRESSED, None).unwrap();
        assert_eq!(pair.to_wif(), WIF_KEY_ONE_UNCOMPRESSED);
    }

    #[test]
    fn test_wif_roundtrip_testnet() {
        let key = PrivateKey::from_hex(KEY_ONE_HEX).unwrap();
        let pair = KeyPair::new(key, Some(Network::Testnet));
        let reparsed = KeyPair::from_wif(&pair.to_wif(), Some(Network::Testnet)).unwrap();
        assert_eq!(reparsed.private_key().to_hex(), KEY_ONE_HEX);
        assert_eq!(reparsed.network, Some(Network::Testnet));
    }

    // -----------------------------------------------------------------------
    // Signing
    // -----------------------------------------------------------------------

    #[test]
    fn test_sign_digest() {
        let pair = KeyPair::from_wif(WIF_KEY_ONE_COMPRESSED, None).unwrap();
        let digest = sha256d(b"key pair digest");
        let sig = pair.sign(&digest).expect("should sign");
        assert!(sig.verify(&digest, &pair.private_key().pub_key()));
    }
}
