/// Bitcoin Script type - a sequence of opcodes and data pushes.
///
/// Scripts are used in transaction inputs (unlocking) and outputs (locking)
/// to define spending conditions. The Script wraps a `Vec<u8>` and provides
/// methods for construction, classification, serialization, and ASM output.

use std::fmt;

use crate::chunk::{decode_script, push_data_prefix, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// The structural type of an output (locking) script.
///
/// Classification is purely structural: a script either matches one of the
/// recognized templates exactly or is `Nonstandard`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptType {
    /// Pay-to-Public-Key-Hash: `OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG`.
    P2pkh,
    /// Pay-to-Witness-Public-Key-Hash: `OP_0 <20>`.
    P2wpkh,
    /// Pay-to-Script-Hash: `OP_HASH160 <20> OP_EQUAL`.
    P2sh,
    /// Anything else.
    Nonstandard,
}

impl fmt::Display for ScriptType {
    /// Render the type tag used in error messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ScriptType::P2pkh => "pubkeyhash",
            ScriptType::P2wpkh => "witnesspubkeyhash",
            ScriptType::P2sh => "scripthash",
            ScriptType::Nonstandard => "nonstandard",
        };
        write!(f, "{}", tag)
    }
}

/// A Bitcoin script, represented as a byte vector newtype.
#[derive(Clone, PartialEq, Eq)]
pub struct Script(Vec<u8>);

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a new empty script.
    ///
    /// # Returns
    /// An empty `Script` instance.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex-encoded string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string (e.g. "76a914...88ac").
    ///
    /// # Returns
    /// A `Script` wrapping the decoded bytes, or an error if the hex is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(hex_str).map_err(|e| ScriptError::InvalidHex(e.to_string()))?;
        Ok(Script(bytes))
    }

    /// Create a script from raw bytes.
    ///
    /// # Arguments
    /// * `bytes` - Raw script bytes.
    ///
    /// # Returns
    /// A `Script` wrapping a copy of the given bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Create a script from a Bitcoin ASM string.
    ///
    /// Parses space-separated tokens where known opcodes (e.g. "OP_DUP") are
    /// emitted directly and hex strings are treated as push data.
    ///
    /// # Arguments
    /// * `asm` - A space-separated ASM string.
    ///
    /// # Returns
    /// A `Script`, or an error if any token is invalid.
    pub fn from_asm(asm: &str) -> Result<Self, ScriptError> {
        let mut script = Script::new();
        if asm.is_empty() {
            return Ok(script);
        }
        for section in asm.split(' ') {
            if let Some(opcode) = string_to_opcode(section) {
                script.append_opcodes(&[opcode])?;
            } else {
                script.append_push_data_hex(section)?;
            }
        }
        Ok(script)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Encode the script as a hex string.
    ///
    /// # Returns
    /// A lowercase hex representation of the script bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Convert the script to its ASM (human-readable assembly) representation.
    ///
    /// Each opcode or data push is represented as a space-separated token.
    /// Data pushes appear as their hex encoding; opcodes appear by name.
    ///
    /// # Returns
    /// A space-separated ASM string. Returns empty string for empty/invalid scripts.
    pub fn to_asm(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let chunks = match decode_script(&self.0) {
            Ok(chunks) => chunks,
            Err(_) => return String::new(),
        };
        let parts: Vec<String> = chunks
            .iter()
            .map(|chunk| chunk.to_asm_string())
            .filter(|s| !s.is_empty())
            .collect();
        parts.join(" ")
    }

    /// Return a reference to the underlying bytes.
    ///
    /// # Returns
    /// A byte slice of the script contents.
    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Return the length of the script in bytes.
    ///
    /// # Returns
    /// The number of bytes in the script.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the script is empty (zero bytes).
    ///
    /// # Returns
    /// `true` if the script has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // -----------------------------------------------------------------------
    // Script classification
    // -----------------------------------------------------------------------

    /// Check if this is a Pay-to-Public-Key-Hash (P2PKH) output script.
    ///
    /// Pattern: OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
    ///
    /// # Returns
    /// `true` if the script matches the P2PKH pattern.
    pub fn is_p2pkh(&self) -> bool {
        let b = &self.0;
        b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// Check if this is a Pay-to-Witness-Public-Key-Hash (P2WPKH) output
    /// script.
    ///
    /// Pattern: OP_0 <20 bytes> (a version-0 witness program of 20 bytes).
    ///
    /// # Returns
    /// `true` if the script matches the P2WPKH pattern.
    pub fn is_p2wpkh(&self) -> bool {
        let b = &self.0;
        b.len() == 22 && b[0] == OP_0 && b[1] == OP_DATA_20
    }

    /// Check if this is a Pay-to-Script-Hash (P2SH) output script.
    ///
    /// Pattern: OP_HASH160 <20 bytes> OP_EQUAL
    ///
    /// # Returns
    /// `true` if the script matches the P2SH pattern.
    pub fn is_p2sh(&self) -> bool {
        let b = &self.0;
        b.len() == 23 && b[0] == OP_HASH160 && b[1] == OP_DATA_20 && b[22] == OP_EQUAL
    }

    /// Classify this output script into its structural type.
    ///
    /// # Returns
    /// The `ScriptType` tag, `Nonstandard` if no template matches.
    pub fn classify(&self) -> ScriptType {
        if self.is_p2pkh() {
            ScriptType::P2pkh
        } else if self.is_p2wpkh() {
            ScriptType::P2wpkh
        } else if self.is_p2sh() {
            ScriptType::P2sh
        } else {
            ScriptType::Nonstandard
        }
    }

    // -----------------------------------------------------------------------
    // Data extraction
    // -----------------------------------------------------------------------

    /// Extract the public key hash from a P2PKH script.
    ///
    /// # Returns
    /// The 20-byte public key hash, or an error if the script is not P2PKH.
    pub fn public_key_hash(&self) -> Result<[u8; 20], ScriptError> {
        if self.0.is_empty() {
            return Err(ScriptError::EmptyScript);
        }
        if !self.is_p2pkh() {
            return Err(ScriptError::WrongScriptType("pubkeyhash"));
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&self.0[3..23]);
        Ok(hash)
    }

    /// Extract the script hash from a P2SH script.
    ///
    /// # Returns
    /// The 20-byte script hash, or an error if the script is not P2SH.
    pub fn script_hash(&self) -> Result<[u8; 20], ScriptError> {
        if self.0.is_empty() {
            return Err(ScriptError::EmptyScript);
        }
        if !self.is_p2sh() {
            return Err(ScriptError::WrongScriptType("scripthash"));
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&self.0[2..22]);
        Ok(hash)
    }

    /// Extract the witness program from a P2WPKH script.
    ///
    /// # Returns
    /// The 20-byte witness program (a public key hash), or an error if the
    /// script is not P2WPKH.
    pub fn witness_program(&self) -> Result<[u8; 20], ScriptError> {
        if self.0.is_empty() {
            return Err(ScriptError::EmptyScript);
        }
        if !self.is_p2wpkh() {
            return Err(ScriptError::WrongScriptType("witnesspubkeyhash"));
        }
        let mut program = [0u8; 20];
        program.copy_from_slice(&self.0[2..22]);
        Ok(program)
    }

    /// Parse the script into a vector of decoded chunks.
    ///
    /// # Returns
    /// A vector of `ScriptChunk` values, or an error if the script is malformed.
    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    // -----------------------------------------------------------------------
    // Mutation / building
    // -----------------------------------------------------------------------

    /// Append data bytes to the script with the proper PUSHDATA prefix.
    ///
    /// Chooses the minimal encoding: direct push for 1-75 bytes,
    /// OP_PUSHDATA1 for 76-255, OP_PUSHDATA2 for 256-65535, etc.
    ///
    /// # Arguments
    /// * `data` - The data bytes to push.
    ///
    /// # Returns
    /// `Ok(())` on success, or an error if the data is too large.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append hex-encoded data to the script with proper PUSHDATA prefix.
    ///
    /// # Arguments
    /// * `hex_str` - Hex string to decode and push.
    ///
    /// # Returns
    /// `Ok(())` on success, or an error if the hex is invalid or data too large.
    pub fn append_push_data_hex(&mut self, hex_str: &str) -> Result<(), ScriptError> {
        let data = hex::decode(hex_str).map_err(|_| ScriptError::InvalidOpcodeData)?;
        self.append_push_data(&data)
    }

    /// Append raw opcodes to the script.
    ///
    /// Rejects push data opcodes (OP_DATA_1..OP_PUSHDATA4) to prevent misuse.
    /// Use `append_push_data` for those.
    ///
    /// # Arguments
    /// * `opcodes` - Slice of opcode bytes to append.
    ///
    /// # Returns
    /// `Ok(())` on success, or an error if a push data opcode is encountered.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<(), ScriptError> {
        for &op in opcodes {
            if op >= OP_DATA_1 && op <= OP_PUSHDATA4 {
                return Err(ScriptError::InvalidOpcodeType(
                    opcode_to_string(op).to_string(),
                ));
            }
        }
        self.0.extend_from_slice(opcodes);
        Ok(())
    }

    /// Check if this script is byte-equal to another script.
    ///
    /// # Arguments
    /// * `other` - The other script to compare with.
    ///
    /// # Returns
    /// `true` if both scripts have identical bytes.
    pub fn equals(&self, other: &Script) -> bool {
        self.0 == other.0
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl fmt::Display for Script {
    /// Display the script as its hex encoding.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P2PKH_HEX: &str = "76a914751e76e8199196d454941c45d1b3a323f1433bd688ac";
    const P2WPKH_HEX: &str = "0014751e76e8199196d454941c45d1b3a323f1433bd6";
    const P2SH_HEX: &str = "a914751e76e8199196d454941c45d1b3a323f1433bd687";

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    #[test]
    fn test_classify_p2pkh() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert!(script.is_p2pkh());
        assert_eq!(script.classify(), ScriptType::P2pkh);
    }

    #[test]
    fn test_classify_p2wpkh() {
        let script = Script::from_hex(P2WPKH_HEX).unwrap();
        assert!(script.is_p2wpkh());
        assert_eq!(script.classify(), ScriptType::P2wpkh);
    }

    #[test]
    fn test_classify_p2sh() {
        let script = Script::from_hex(P2SH_HEX).unwrap();
        assert!(script.is_p2sh());
        assert_eq!(script.classify(), ScriptType::P2sh);
    }

    #[test]
    fn test_classify_nonstandard() {
        assert_eq!(Script::new().classify(), ScriptType::Nonstandard);
        // OP_RETURN data carrier.
        let script = Script::from_hex("6a0568656c6c6f").unwrap();
        assert_eq!(script.classify(), ScriptType::Nonstandard);
        // A truncated P2PKH prefix.
        let script = Script::from_hex("76a914").unwrap();
        assert_eq!(script.classify(), ScriptType::Nonstandard);
    }

    /// A 32-byte version-0 witness program (P2WSH) is not P2WPKH.
    #[test]
    fn test_p2wsh_is_not_p2wpkh() {
        let mut bytes = vec![0x00, 0x20];
        bytes.extend_from_slice(&[0xab; 32]);
        let script = Script::from_bytes(&bytes);
        assert!(!script.is_p2wpkh());
        assert_eq!(script.classify(), ScriptType::Nonstandard);
    }

    // -----------------------------------------------------------------------
    // Extraction
    // -----------------------------------------------------------------------

    #[test]
    fn test_public_key_hash() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(
            hex::encode(script.public_key_hash().unwrap()),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
    }

    #[test]
    fn test_script_hash() {
        let script = Script::from_hex(P2SH_HEX).unwrap();
        assert_eq!(
            hex::encode(script.script_hash().unwrap()),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
    }

    #[test]
    fn test_witness_program() {
        let script = Script::from_hex(P2WPKH_HEX).unwrap();
        assert_eq!(
            hex::encode(script.witness_program().unwrap()),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
    }

    #[test]
    fn test_extraction_wrong_type() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert!(script.script_hash().is_err());
        assert!(script.witness_program().is_err());
        assert!(Script::new().public_key_hash().is_err());
    }

    // -----------------------------------------------------------------------
    // ASM
    // -----------------------------------------------------------------------

    #[test]
    fn test_to_asm_p2pkh() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(
            script.to_asm(),
            "OP_DUP OP_HASH160 751e76e8199196d454941c45d1b3a323f1433bd6 OP_EQUALVERIFY OP_CHECKSIG"
        );
    }

    #[test]
    fn test_from_asm_roundtrip() {
        let asm = "OP_DUP OP_HASH160 751e76e8199196d454941c45d1b3a323f1433bd6 OP_EQUALVERIFY OP_CHECKSIG";
        let script = Script::from_asm(asm).unwrap();
        assert_eq!(script.to_hex(), P2PKH_HEX);
        assert_eq!(script.to_asm(), asm);
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    #[test]
    fn test_append_push_data() {
        let mut script = Script::new();
        script.append_push_data(&[0xab; 20]).unwrap();
        assert_eq!(script.to_bytes()[0], 20);
        assert_eq!(script.len(), 21);
    }

    #[test]
    fn test_append_opcodes_rejects_push_ops() {
        let mut script = Script::new();
        assert!(script.append_opcodes(&[OP_DATA_20]).is_err());
        assert!(script.append_opcodes(&[OP_DUP, OP_HASH160]).is_ok());
    }
}
