//! Transaction output with satoshi value and locking script.
//!
//! Defines the spending conditions for the output's value.  Provides
//! binary serialization/deserialization following the Bitcoin wire format.

use btc_primitives::util::{ByteReader, ByteWriter, VarInt};
use btc_script::Script;

use crate::TransactionError;

/// A single output in a Bitcoin transaction.
///
/// Each output specifies a satoshi `value` and a `locking_script`
/// (scriptPubKey) that defines the conditions under which the funds
/// may be spent.
///
/// # Wire format
///
/// | Field            | Size           |
/// |------------------|----------------|
/// | satoshis         | 8 bytes (LE)   |
/// | script length    | VarInt         |
/// | locking_script   | variable       |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOutput {
    /// The number of satoshis locked by this output.
    pub satoshis: u64,

    /// The locking script (scriptPubKey) that defines spending conditions.
    pub locking_script: Script,
}

impl TransactionOutput {
    /// Create a new `TransactionOutput` with zero satoshis and an empty script.
    ///
    /// # Returns
    /// A default `TransactionOutput`.
    pub fn new() -> Self {
        TransactionOutput {
            satoshis: 0,
            locking_script: Script::new(),
        }
    }

    /// Deserialize a `TransactionOutput` from a `ByteReader`.
    ///
    /// Reads 8-byte LE satoshis, a varint script length, and the script bytes.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of an encoded output.
    ///
    /// # Returns
    /// `Ok(TransactionOutput)` on success, or a `TransactionError` if the
    /// data is truncated or malformed.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let satoshis = reader.read_u64_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading satoshis: {}", e))
        })?;

        let script_len = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading script length: {}", e))
        })?;

        let script_bytes = reader.read_bytes(script_len.value() as usize).map_err(|e| {
            TransactionError::SerializationError(format!("reading locking script: {}", e))
        })?;

        Ok(TransactionOutput {
            satoshis,
            locking_script: Script::from_bytes(script_bytes),
        })
    }

    /// Serialize this `TransactionOutput` into a `ByteWriter`.
    ///
    /// Writes 8-byte LE satoshis, a varint script length, and the script.
    ///
    /// # Arguments
    /// * `writer` - The writer to append serialized bytes to.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u64_le(self.satoshis);
        let script_bytes = self.locking_script.to_bytes();
        writer.write_varint(VarInt::from(script_bytes.len()));
        writer.write_bytes(script_bytes);
    }

    /// Serialize this output to a byte vector.
    ///
    /// # Returns
    /// A `Vec<u8>` containing the wire-format bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Serialize this output for use in signature hash computation.
    ///
    /// The format is identical to `to_bytes`: satoshis(8) + varint(len) + script.
    ///
    /// # Returns
    /// A `Vec<u8>` containing the serialized output suitable for sighash.
    pub fn bytes_for_sig_hash(&self) -> Vec<u8> {
        self.to_bytes()
    }

    /// Return the locking script as a hex-encoded string.
    ///
    /// # Returns
    /// A lowercase hex string of the locking script bytes.
    pub fn locking_script_hex(&self) -> String {
        self.locking_script.to_hex()
    }
}

impl Default for TransactionOutput {
    fn default() -> Self {
        Self::new()
    }
}
