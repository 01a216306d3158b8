/// Bitcoin address handling.
///
/// Supports P2PKH and P2SH addresses (Base58Check) and P2WPKH addresses
/// (bech32, witness version 0), with mainnet/testnet discrimination and
/// conversion to output (locking) scripts.

use std::fmt;

use bech32::Hrp;
use btc_primitives::hash::{hash160, sha256d};

use crate::script::Script;
use crate::templates;
use crate::ScriptError;

/// Bitcoin network type for address and WIF prefix selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    /// Bitcoin mainnet.
    Mainnet,
    /// Bitcoin testnet.
    Testnet,
}

impl Network {
    /// The Base58Check version byte for P2PKH addresses.
    pub fn pubkey_hash_version(&self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6f,
        }
    }

    /// The Base58Check version byte for P2SH addresses.
    pub fn script_hash_version(&self) -> u8 {
        match self {
            Network::Mainnet => 0x05,
            Network::Testnet => 0xc4,
        }
    }

    /// The bech32 human-readable part for segwit addresses.
    pub fn bech32_hrp(&self) -> &'static str {
        match self {
            Network::Mainnet => "bc",
            Network::Testnet => "tb",
        }
    }

    /// The WIF private key prefix byte.
    pub fn wif_prefix(&self) -> u8 {
        match self {
            Network::Mainnet => 0x80,
            Network::Testnet => 0xef,
        }
    }
}

/// The hash payload carried by an address, tagged with its script kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressPayload {
    /// A P2PKH public key hash.
    PubKeyHash([u8; 20]),
    /// A P2SH script hash.
    ScriptHash([u8; 20]),
    /// A P2WPKH version-0 witness program.
    WitnessPubKeyHash([u8; 20]),
}

/// A Bitcoin address.
///
/// Contains the 20-byte payload, its script kind, and the network it
/// belongs to. Can be serialized to/from the Base58Check or bech32 string
/// format depending on the kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// The human-readable address string.
    pub address_string: String,
    /// The hash payload and its script kind.
    pub payload: AddressPayload,
    /// The network this address belongs to.
    pub network: Network,
}

impl Address {
    /// Parse an address string, detecting its encoding, kind, and network.
    ///
    /// Base58Check strings are matched against the P2PKH and P2SH version
    /// bytes of both networks; bech32 strings must carry a version-0
    /// 20-byte witness program under the "bc" or "tb" prefix.
    ///
    /// # Arguments
    /// * `addr` - The address string.
    ///
    /// # Returns
    /// An `Address`, or an error if the string is not a supported address.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        if let Ok(decoded) = bs58::decode(addr).into_vec() {
            // Reject strings that happen to decode but are not addresses
            // (bech32 strings contain '1' and can slip through bs58).
            if decoded.len() == 25 {
                return Self::from_base58_payload(addr, &decoded);
            }
        }
        Self::from_bech32(addr)
    }

    /// Decode a 25-byte Base58Check payload into an address.
    fn from_base58_payload(addr: &str, decoded: &[u8]) -> Result<Self, ScriptError> {
        // Verify checksum: last 4 bytes should equal sha256d of first 21 bytes.
        let checksum = sha256d(&decoded[..21]);
        if decoded[21..25] != checksum[..4] {
            return Err(ScriptError::EncodingChecksumFailed);
        }

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&decoded[1..21]);

        let (network, payload) = match decoded[0] {
            0x00 => (Network::Mainnet, AddressPayload::PubKeyHash(hash)),
            0x05 => (Network::Mainnet, AddressPayload::ScriptHash(hash)),
            0x6f => (Network::Testnet, AddressPayload::PubKeyHash(hash)),
            0xc4 => (Network::Testnet, AddressPayload::ScriptHash(hash)),
            _ => return Err(ScriptError::UnsupportedAddress(addr.to_string())),
        };

        Ok(Address {
            address_string: addr.to_string(),
            payload,
            network,
        })
    }

    /// Decode a bech32 segwit address.
    fn from_bech32(addr: &str) -> Result<Self, ScriptError> {
        let (hrp, version, program) = bech32::segwit::decode(addr)
            .map_err(|e| ScriptError::InvalidAddress(format!("'{}': {}", addr, e)))?;

        let network = if hrp == Hrp::parse_unchecked("bc") {
            Network::Mainnet
        } else if hrp == Hrp::parse_unchecked("tb") {
            Network::Testnet
        } else {
            return Err(ScriptError::UnsupportedAddress(addr.to_string()));
        };

        // Only 20-byte version-0 programs (P2WPKH) are supported.
        if version.to_u8() != 0 || program.len() != 20 {
            return Err(ScriptError::UnsupportedAddress(addr.to_string()));
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&program);

        Ok(Address {
            address_string: addr.to_string(),
            payload: AddressPayload::WitnessPubKeyHash(hash),
            network,
        })
    }

    /// Create a P2PKH address from a 20-byte public key hash.
    ///
    /// # Arguments
    /// * `hash` - The 20-byte hash160 of the public key.
    /// * `network` - The target network.
    ///
    /// # Returns
    /// A new `Address` with the encoded Base58Check string.
    pub fn from_public_key_hash(hash: &[u8; 20], network: Network) -> Self {
        Address {
            address_string: base58_check(network.pubkey_hash_version(), hash),
            payload: AddressPayload::PubKeyHash(*hash),
            network,
        }
    }

    /// Create a P2SH address from a 20-byte script hash.
    ///
    /// # Arguments
    /// * `hash` - The 20-byte hash160 of the redeem script.
    /// * `network` - The target network.
    ///
    /// # Returns
    /// A new `Address` with the encoded Base58Check string.
    pub fn from_script_hash(hash: &[u8; 20], network: Network) -> Self {
        Address {
            address_string: base58_check(network.script_hash_version(), hash),
            payload: AddressPayload::ScriptHash(*hash),
            network,
        }
    }

    /// Create a P2WPKH address from a 20-byte witness program.
    ///
    /// # Arguments
    /// * `hash` - The 20-byte hash160 of the compressed public key.
    /// * `network` - The target network.
    ///
    /// # Returns
    /// A new bech32 `Address`, or an error if encoding fails.
    pub fn from_witness_public_key_hash(
        hash: &[u8; 20],
        network: Network,
    ) -> Result<Self, ScriptError> {
        let hrp = Hrp::parse_unchecked(network.bech32_hrp());
        let address_string = bech32::segwit::encode_v0(hrp, hash)
            .map_err(|e| ScriptError::InvalidAddress(e.to_string()))?;
        Ok(Address {
            address_string,
            payload: AddressPayload::WitnessPubKeyHash(*hash),
            network,
        })
    }

    /// Create a P2PKH address from a public key.
    ///
    /// Computes hash160 of the SEC1-encoded public key bytes.
    ///
    /// # Arguments
    /// * `pub_key` - SEC1-encoded public key bytes.
    /// * `network` - The target network.
    ///
    /// # Returns
    /// A P2PKH `Address`.
    pub fn from_public_key(pub_key: &[u8], network: Network) -> Self {
        Self::from_public_key_hash(&hash160(pub_key), network)
    }

    /// Build the locking script this address pays to.
    ///
    /// # Returns
    /// The output script for this address kind.
    pub fn to_output_script(&self) -> Script {
        match &self.payload {
            AddressPayload::PubKeyHash(hash) => templates::p2pkh_lock(hash),
            AddressPayload::ScriptHash(hash) => templates::p2sh_lock(hash),
            AddressPayload::WitnessPubKeyHash(hash) => templates::p2wpkh_lock(hash),
        }
    }
}

impl fmt::Display for Address {
    /// Display the address as its encoded string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address_string)
    }
}

/// Resolve an address string into its locking script, enforcing that the
/// address belongs to the given network.
///
/// # Arguments
/// * `addr` - The address string.
/// * `network` - The network the address must belong to.
///
/// # Returns
/// The locking script, or an error if the address is malformed or belongs
/// to a different network.
pub fn to_output_script(addr: &str, network: Network) -> Result<Script, ScriptError> {
    let address = Address::from_string(addr)?;
    if address.network != network {
        return Err(ScriptError::NetworkMismatch);
    }
    Ok(address.to_output_script())
}

/// Encode a version byte and 20-byte hash as a Base58Check string.
fn base58_check(version: u8, hash: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(25);
    payload.push(version);
    payload.extend_from_slice(hash);
    let checksum = sha256d(&payload);
    payload.extend_from_slice(&checksum[..4]);
    bs58::encode(&payload).into_string()
}

#[cfg(test)]
mod tests {
    //! Tests for address parsing, generation, and output script
    //! resolution across both networks and all three supported kinds.

    use super::*;

    /// Hash160 of the secp256k1 generator point's compressed encoding,
    /// shared by the best-known P2PKH and bech32 test fixtures.
    const GENERATOR_PKH: [u8; 20] = [
        0x75, 0x1e, 0x76, 0xe8, 0x19, 0x91, 0x96, 0xd4, 0x54, 0x94, 0x1c, 0x45, 0xd1, 0xb3,
        0xa3, 0x23, 0xf1, 0x43, 0x3b, 0xd6,
    ];

    // -----------------------------------------------------------------------
    // P2PKH (Base58Check)
    // -----------------------------------------------------------------------

    #[test]
    fn test_p2pkh_mainnet_roundtrip() {
        let addr = Address::from_public_key_hash(&GENERATOR_PKH, Network::Mainnet);
        assert_eq!(addr.address_string, "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");

        let parsed = Address::from_string(&addr.address_string).expect("should parse");
        assert_eq!(parsed.network, Network::Mainnet);
        assert_eq!(parsed.payload, AddressPayload::PubKeyHash(GENERATOR_PKH));
    }

    #[test]
    fn test_p2pkh_from_string_mainnet() {
        let addr = Address::from_string("1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr")
            .expect("should parse mainnet");
        assert_eq!(addr.network, Network::Mainnet);
        match addr.payload {
            AddressPayload::PubKeyHash(hash) => assert_eq!(
                hex::encode(hash),
                "8fe80c75c9560e8b56ed64ea3c26e18d2c52211b"
            ),
            other => panic!("expected pubkey hash payload, got {:?}", other),
        }
    }

    #[test]
    fn test_p2pkh_from_string_testnet() {
        let addr = Address::from_string("mtdruWYVEV1wz5yL7GvpBj4MgifCB7yhPd")
            .expect("should parse testnet");
        assert_eq!(addr.network, Network::Testnet);
        match addr.payload {
            AddressPayload::PubKeyHash(hash) => assert_eq!(
                hex::encode(hash),
                "8fe80c75c9560e8b56ed64ea3c26e18d2c52211b"
            ),
            other => panic!("expected pubkey hash payload, got {:?}", other),
        }
    }

    // -----------------------------------------------------------------------
    // P2SH (Base58Check)
    // -----------------------------------------------------------------------

    #[test]
    fn test_p2sh_roundtrip_both_networks() {
        for network in [Network::Mainnet, Network::Testnet] {
            let addr = Address::from_script_hash(&GENERATOR_PKH, network);
            let parsed = Address::from_string(&addr.address_string).expect("should parse");
            assert_eq!(parsed.network, network);
            assert_eq!(parsed.payload, AddressPayload::ScriptHash(GENERATOR_PKH));
        }
    }

    #[test]
    fn test_p2sh_mainnet_prefix() {
        let addr = Address::from_script_hash(&GENERATOR_PKH, Network::Mainnet);
        assert!(addr.address_string.starts_with('3'));
    }

    // -----------------------------------------------------------------------
    // P2WPKH (bech32)
    // -----------------------------------------------------------------------

    #[test]
    fn test_p2wpkh_mainnet() {
        let addr = Address::from_witness_public_key_hash(&GENERATOR_PKH, Network::Mainnet)
            .expect("should encode");
        assert_eq!(addr.address_string, "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");

        let parsed = Address::from_string(&addr.address_string).expect("should parse");
        assert_eq!(parsed.network, Network::Mainnet);
        assert_eq!(
            parsed.payload,
            AddressPayload::WitnessPubKeyHash(GENERATOR_PKH)
        );
    }

    #[test]
    fn test_p2wpkh_testnet_roundtrip() {
        let addr = Address::from_witness_public_key_hash(&GENERATOR_PKH, Network::Testnet)
            .expect("should encode");
        assert!(addr.address_string.starts_with("tb1"));
        let parsed = Address::from_string(&addr.address_string).expect("should parse");
        assert_eq!(parsed.network, Network::Testnet);
    }

    // -----------------------------------------------------------------------
    // Error cases
    // -----------------------------------------------------------------------

    #[test]
    fn test_from_string_garbage() {
        assert!(Address::from_string("ADD8E55").is_err());
        assert!(Address::from_string("").is_err());
    }

    #[test]
    fn test_from_string_bad_checksum() {
        // Flip the last character of a valid address.
        assert!(Address::from_string("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMa").is_err());
    }

    // -----------------------------------------------------------------------
    // Output script resolution
    // -----------------------------------------------------------------------

    #[test]
    fn test_to_output_script_p2pkh() {
        let script =
            to_output_script("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH", Network::Mainnet).unwrap();
        assert_eq!(
            script.to_hex(),
            "76a914751e76e8199196d454941c45d1b3a323f1433bd688ac"
        );
    }

    #[test]
    fn test_to_output_script_p2wpkh() {
        let script = to_output_script(
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4",
            Network::Mainnet,
        )
        .unwrap();
        assert_eq!(script.to_hex(), "0014751e76e8199196d454941c45d1b3a323f1433bd6");
    }

    #[test]
    fn test_to_output_script_p2sh() {
        let addr = Address::from_script_hash(&GENERATOR_PKH, Network::Mainnet);
        let script = to_output_script(&addr.address_string, Network::Mainnet).unwrap();
        assert!(script.is_p2sh());
        assert_eq!(script.script_hash().unwrap(), GENERATOR_PKH);
    }

    /// Resolving an address against the wrong network fails with the
    /// network-mismatch message.
    #[test]
    fn test_to_output_script_network_mismatch() {
        let err = to_output_script("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH", Network::Testnet)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid version or Network mismatch");

        let err = to_output_script(
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4",
            Network::Testnet,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid version or Network mismatch");
    }

    // -----------------------------------------------------------------------
    // Network parameters
    // -----------------------------------------------------------------------

    #[test]
    fn test_network_parameters() {
        assert_eq!(Network::Mainnet.pubkey_hash_version(), 0x00);
        assert_eq!(Network::Mainnet.script_hash_version(), 0x05);
        assert_eq!(Network::Mainnet.bech32_hrp(), "bc");
        assert_eq!(Network::Mainnet.wif_prefix(), 0x80);
        assert_eq!(Network::Testnet.pubkey_hash_version(), 0x6f);
        assert_eq!(Network::Testnet.script_hash_version(), 0xc4);
        assert_eq!(Network::Testnet.bech32_hrp(), "tb");
        assert_eq!(Network::Testnet.wif_prefix(), 0xef);
    }
}
