//! Standard locking-script templates.
//!
//! Builds the output scripts for the supported payment types. The builder
//! also uses these to synthesize the script fed into signature hashing
//! (P2WPKH signs over a P2PKH-shaped script per BIP-143).

use btc_primitives::hash::hash160;

use crate::opcodes::*;
use crate::script::Script;

/// Create a P2PKH locking script from a public key hash.
///
/// Produces: `OP_DUP OP_HASH160 <20-byte pubkey hash> OP_EQUALVERIFY OP_CHECKSIG`
///
/// # Arguments
/// * `pubkey_hash` - The 20-byte Hash160 of the public key.
///
/// # Returns
/// The 25-byte P2PKH locking script.
pub fn p2pkh_lock(pubkey_hash: &[u8; 20]) -> Script {
    let mut bytes = Vec::with_capacity(25);
    bytes.push(OP_DUP);
    bytes.push(OP_HASH160);
    bytes.push(OP_DATA_20);
    bytes.extend_from_slice(pubkey_hash);
    bytes.push(OP_EQUALVERIFY);
    bytes.push(OP_CHECKSIG);
    Script::from_bytes(&bytes)
}

/// Create a P2WPKH locking script from a public key hash.
///
/// Produces: `OP_0 <20-byte pubkey hash>` (a version-0 witness program).
///
/// # Arguments
/// * `pubkey_hash` - The 20-byte Hash160 of the public key.
///
/// # Returns
/// The 22-byte P2WPKH locking script.
pub fn p2wpkh_lock(pubkey_hash: &[u8; 20]) -> Script {
    let mut bytes = Vec::with_capacity(22);
    bytes.push(OP_0);
    bytes.push(OP_DATA_20);
    bytes.extend_from_slice(pubkey_hash);
    Script::from_bytes(&bytes)
}

/// Create a P2SH locking script from a script hash.
///
/// Produces: `OP_HASH160 <20-byte script hash> OP_EQUAL`
///
/// # Arguments
/// * `script_hash` - The 20-byte Hash160 of the redeem script.
///
/// # Returns
/// The 23-byte P2SH locking script.
pub fn p2sh_lock(script_hash: &[u8; 20]) -> Script {
    let mut bytes = Vec::with_capacity(23);
    bytes.push(OP_HASH160);
    bytes.push(OP_DATA_20);
    bytes.extend_from_slice(script_hash);
    bytes.push(OP_EQUAL);
    Script::from_bytes(&bytes)
}

/// Create a P2SH locking script wrapping a redeem script.
///
/// Hashes the redeem script with Hash160 and wraps it.
///
/// # Arguments
/// * `redeem_script` - The redeem script whose hash locks the output.
///
/// # Returns
/// The 23-byte P2SH locking script.
pub fn p2sh_lock_from_redeem(redeem_script: &Script) -> Script {
    p2sh_lock(&hash160(redeem_script.to_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKH: [u8; 20] = [
        0x75, 0x1e, 0x76, 0xe8, 0x19, 0x91, 0x96, 0xd4, 0x54, 0x94, 0x1c, 0x45, 0xd1, 0xb3,
        0xa3, 0x23, 0xf1, 0x43, 0x3b, 0xd6,
    ];

    #[test]
    fn test_p2pkh_lock_shape() {
        let script = p2pkh_lock(&PKH);
        assert!(script.is_p2pkh());
        assert_eq!(script.public_key_hash().unwrap(), PKH);
        assert_eq!(
            script.to_hex(),
            "76a914751e76e8199196d454941c45d1b3a323f1433bd688ac"
        );
    }

    #[test]
    fn test_p2wpkh_lock_shape() {
        let script = p2wpkh_lock(&PKH);
        assert!(script.is_p2wpkh());
        assert_eq!(script.witness_program().unwrap(), PKH);
        assert_eq!(script.to_hex(), "0014751e76e8199196d454941c45d1b3a323f1433bd6");
    }

    #[test]
    fn test_p2sh_lock_shape() {
        let script = p2sh_lock(&PKH);
        assert!(script.is_p2sh());
        assert_eq!(script.script_hash().unwrap(), PKH);
    }

    /// Wrapping a redeem script commits to its Hash160.
    #[test]
    fn test_p2sh_lock_from_redeem() {
        let redeem = p2wpkh_lock(&PKH);
        let wrapper = p2sh_lock_from_redeem(&redeem);
        assert!(wrapper.is_p2sh());
        assert_eq!(
            wrapper.script_hash().unwrap(),
            hash160(redeem.to_bytes())
        );
    }
}
