//! Transaction input referencing a previous output.
//!
//! Contains the source transaction ID, output index, unlocking script,
//! sequence number, and witness stack.  Provides binary serialization
//! following the Bitcoin wire format; witness stacks are serialized
//! separately by the transaction (BIP-144).

use btc_primitives::util::{ByteReader, ByteWriter, VarInt};
use btc_script::Script;

use crate::TransactionError;

/// Default sequence number indicating a finalized input (no relative lock-time).
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A single input in a Bitcoin transaction.
///
/// Each input references an output from a previous transaction by its
/// transaction ID (`source_txid`, internal byte order) and output index
/// (`source_tx_out_index`).  The `unlocking_script` (scriptSig) and the
/// `witness` stack supply the data required to satisfy the referenced
/// output's locking script; legacy inputs use only the script, segwit
/// inputs use the witness stack.
///
/// # Wire format (non-witness part)
///
/// | Field              | Size             |
/// |--------------------|------------------|
/// | source_txid        | 32 bytes (LE)    |
/// | source_tx_out_index| 4 bytes (LE)     |
/// | script length      | VarInt           |
/// | unlocking_script   | variable         |
/// | sequence_number    | 4 bytes (LE)     |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    /// The 32-byte transaction ID of the output being spent, in internal
    /// (little-endian) byte order.
    pub source_txid: [u8; 32],

    /// Index of the output within the source transaction.
    pub source_tx_out_index: u32,

    /// Sequence number. Defaults to `0xFFFFFFFF` (finalized).
    pub sequence_number: u32,

    /// The unlocking script (scriptSig) that proves authorization.
    /// `None` when the input has not yet been signed.
    pub unlocking_script: Option<Script>,

    /// The segwit witness stack. Empty for legacy inputs.
    pub witness: Vec<Vec<u8>>,
}

impl TransactionInput {
    /// Create a new `TransactionInput` with default values.
    ///
    /// The source txid is zeroed, output index is 0, sequence is finalized,
    /// and no unlocking script or witness is set.
    ///
    /// # Returns
    /// A default `TransactionInput`.
    pub fn new() -> Self {
        TransactionInput {
            source_txid: [0u8; 32],
            source_tx_out_index: 0,
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
            unlocking_script: None,
            witness: Vec::new(),
        }
    }

    /// Deserialize the non-witness part of an input from a `ByteReader`.
    ///
    /// Reads the standard wire format: 32-byte txid, 4-byte output index,
    /// varint-prefixed unlocking script, and 4-byte sequence number.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of an encoded input.
    ///
    /// # Returns
    /// `Ok(TransactionInput)` on success, or a `TransactionError` if the
    /// data is truncated or malformed.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let txid_bytes = reader.read_bytes(32).map_err(|e| {
            TransactionError::SerializationError(format!("reading source txid: {}", e))
        })?;
        let mut source_txid = [0u8; 32];
        source_txid.copy_from_slice(txid_bytes);

        let source_tx_out_index = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading output index: {}", e))
        })?;

        let script_len = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading script length: {}", e))
        })?;

        let script_bytes = reader.read_bytes(script_len.value() as usize).map_err(|e| {
            TransactionError::SerializationError(format!("reading unlocking script: {}", e))
        })?;

        let sequence_number = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading sequence number: {}", e))
        })?;

        let unlocking_script = if script_bytes.is_empty() {
            None
        } else {
            Some(Script::from_bytes(script_bytes))
        };

        Ok(TransactionInput {
            source_txid,
            source_tx_out_index,
            sequence_number,
            unlocking_script,
            witness: Vec::new(),
        })
    }

    /// Serialize the non-witness part of this input into a `ByteWriter`.
    ///
    /// Writes the standard wire format: txid, output index, varint script
    /// length, script bytes, and sequence number.
    ///
    /// # Arguments
    /// * `writer` - The writer to append serialized bytes to.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(&self.source_txid);
        writer.write_u32_le(self.source_tx_out_index);

        match &self.unlocking_script {
            Some(script) => {
                let script_bytes = script.to_bytes();
                writer.write_varint(VarInt::from(script_bytes.len()));
                writer.write_bytes(script_bytes);
            }
            None => {
                writer.write_varint(VarInt::from(0u64));
            }
        }

        writer.write_u32_le(self.sequence_number);
    }

    /// Deserialize this input's witness stack from a `ByteReader`.
    ///
    /// Reads a varint item count followed by varint-prefixed items.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of the witness stack.
    ///
    /// # Returns
    /// `Ok(())` on success, or a `TransactionError` if the data is truncated.
    pub fn read_witness_from(&mut self, reader: &mut ByteReader) -> Result<(), TransactionError> {
        let item_count = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading witness count: {}", e))
        })?;

        let mut witness = Vec::with_capacity(item_count.value() as usize);
        for _ in 0..item_count.value() {
            let item_len = reader.read_varint().map_err(|e| {
                TransactionError::SerializationError(format!("reading witness item length: {}", e))
            })?;
            let item = reader.read_bytes(item_len.value() as usize).map_err(|e| {
                TransactionError::SerializationError(format!("reading witness item: {}", e))
            })?;
            witness.push(item.to_vec());
        }
        self.witness = witness;
        Ok(())
    }

    /// Serialize this input's witness stack into a `ByteWriter`.
    ///
    /// Writes a varint item count followed by varint-prefixed items; an
    /// empty stack serializes as a single zero count byte.
    ///
    /// # Arguments
    /// * `writer` - The writer to append serialized bytes to.
    pub fn write_witness_to(&self, writer: &mut ByteWriter) {
        writer.write_varint(VarInt::from(self.witness.len()));
        for item in &self.witness {
            writer.write_varint(VarInt::from(item.len()));
            writer.write_bytes(item);
        }
    }

    /// Check whether this input carries a non-empty witness stack.
    ///
    /// # Returns
    /// `true` if the witness stack has at least one item.
    pub fn has_witness(&self) -> bool {
        !self.witness.is_empty()
    }
}

impl Default for TransactionInput {
    fn default() -> Self {
        Self::new()
    }
}
