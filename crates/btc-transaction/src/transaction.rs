//! Core Bitcoin transaction type.
//!
//! Represents a complete transaction with version, inputs, outputs, and
//! locktime.  Supports legacy and BIP-144 segwit binary/hex serialization,
//! transaction ID computation (witness-independent), coinbase detection,
//! weight/virtual-size arithmetic, and both legacy and BIP-143 signature
//! hash computation.

use btc_primitives::hash::sha256d;
use btc_primitives::util::{ByteReader, ByteWriter, VarInt};
use btc_script::Script;

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::sighash;
use crate::TransactionError;

/// The all-zero source txid used by coinbase inputs.
pub const COINBASE_HASH: [u8; 32] = [0u8; 32];

/// Segwit serialization marker byte.
const SEGWIT_MARKER: u8 = 0x00;

/// Segwit serialization flag byte.
const SEGWIT_FLAG: u8 = 0x01;

/// A Bitcoin transaction consisting of a version, a set of inputs, a set
/// of outputs, and a lock time.
///
/// # Wire format (legacy)
///
/// | Field        | Size                      |
/// |--------------|---------------------------|
/// | version      | 4 bytes (LE)              |
/// | input count  | VarInt                    |
/// | inputs       | variable (per input)      |
/// | output count | VarInt                    |
/// | outputs      | variable (per output)     |
/// | lock_time    | 4 bytes (LE)              |
///
/// When any input carries a witness stack, the BIP-144 format is used
/// instead: a `0x00 0x01` marker/flag pair follows the version, and the
/// per-input witness stacks are serialized between the outputs and the
/// lock time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction format version. Currently 1 or 2.
    pub version: u32,

    /// Ordered list of transaction inputs.
    pub inputs: Vec<TransactionInput>,

    /// Ordered list of transaction outputs.
    pub outputs: Vec<TransactionOutput>,

    /// Lock time. If non-zero, the transaction is not valid until the
    /// specified block height or Unix timestamp.
    pub lock_time: u32,
}

impl Transaction {
    /// Create a new empty transaction with version 1 and lock time 0.
    ///
    /// # Returns
    /// A `Transaction` with no inputs or outputs.
    pub fn new() -> Self {
        Transaction {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    /// Parse a transaction from a hex-encoded string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string of the raw transaction bytes.
    ///
    /// # Returns
    /// `Ok(Transaction)` on success, or a `TransactionError` if the hex is
    /// invalid or the bytes do not form a valid transaction.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| TransactionError::SerializationError(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Parse a transaction from raw bytes.
    ///
    /// This method requires the byte slice to contain exactly one complete
    /// transaction with no trailing data.
    ///
    /// # Arguments
    /// * `bytes` - The raw transaction bytes.
    ///
    /// # Returns
    /// `Ok(Transaction)` on success, or a `TransactionError` if the data
    /// is truncated, malformed, or has trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// Deserialize a transaction from a `ByteReader`.
    ///
    /// Detects the BIP-144 segwit marker/flag pair after the version and
    /// reads the witness stacks when present.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of a serialized transaction.
    ///
    /// # Returns
    /// `Ok(Transaction)` on success, or a `TransactionError` on I/O or
    /// format errors.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let version = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading version: {}", e))
        })?;

        // A zero byte where the input count belongs, followed by flag 0x01,
        // is the segwit marker pair. A bare zero byte is a zero input
        // count (only empty transactions serialize that way).
        let mut segwit = false;
        let mut zero_inputs = false;
        if reader.peek_u8().map_err(|e| {
            TransactionError::SerializationError(format!("reading input count: {}", e))
        })? == SEGWIT_MARKER
        {
            let _ = reader.read_u8();
            let next = reader.peek_u8().map_err(|e| {
                TransactionError::SerializationError(format!("reading segwit flag: {}", e))
            })?;
            if next == SEGWIT_FLAG {
                let _ = reader.read_u8();
                segwit = true;
            } else {
                zero_inputs = true;
            }
        }

        let input_count = if zero_inputs {
            VarInt(0)
        } else {
            reader.read_varint().map_err(|e| {
                TransactionError::SerializationError(format!("reading input count: {}", e))
            })?
        };

        let mut inputs = Vec::with_capacity(input_count.value() as usize);
        for _ in 0..input_count.value() {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading output count: {}", e))
        })?;

        let mut outputs = Vec::with_capacity(output_count.value() as usize);
        for _ in 0..output_count.value() {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        if segwit {
            for input in &mut inputs {
                input.read_witness_from(reader)?;
            }
        }

        let lock_time = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading lock time: {}", e))
        })?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Serialize this transaction to raw bytes.
    ///
    /// Uses the BIP-144 format when any input carries a witness stack,
    /// the legacy format otherwise.
    ///
    /// # Returns
    /// A `Vec<u8>` containing the wire-format bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize(self.has_witnesses())
    }

    /// Serialize this transaction without witness data.
    ///
    /// This is the byte form hashed for the transaction ID.
    ///
    /// # Returns
    /// A `Vec<u8>` containing the legacy wire-format bytes.
    pub fn to_bytes_no_witness(&self) -> Vec<u8> {
        self.serialize(false)
    }

    fn serialize(&self, with_witness: bool) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(256);
        writer.write_u32_le(self.version);

        if with_witness {
            writer.write_u8(SEGWIT_MARKER);
            writer.write_u8(SEGWIT_FLAG);
        }

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(&mut writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(&mut writer);
        }

        if with_witness {
            for input in &self.inputs {
                input.write_witness_to(&mut writer);
            }
        }

        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    /// Serialize this transaction to a hex string.
    ///
    /// # Returns
    /// A lowercase hex-encoded string of the raw bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    // -----------------------------------------------------------------
    // Transaction ID
    // -----------------------------------------------------------------

    /// Compute the transaction ID (double SHA-256 of the witness-stripped
    /// serialization).
    ///
    /// The txid bytes are in internal (little-endian) order. To get the
    /// conventional display string, use `tx_id_hex()`.
    ///
    /// # Returns
    /// A 32-byte array containing the txid in internal byte order.
    pub fn tx_id(&self) -> [u8; 32] {
        sha256d(&self.to_bytes_no_witness())
    }

    /// Compute the transaction ID as a human-readable hex string.
    ///
    /// The hex string is byte-reversed from the internal hash, following
    /// Bitcoin's convention where txids are displayed in big-endian order.
    ///
    /// # Returns
    /// A 64-character hex string of the txid.
    pub fn tx_id_hex(&self) -> String {
        let mut id = self.tx_id();
        id.reverse();
        hex::encode(id)
    }

    // -----------------------------------------------------------------
    // Inputs and outputs
    // -----------------------------------------------------------------

    /// Append a `TransactionInput` to this transaction.
    ///
    /// # Arguments
    /// * `input` - The input to add.
    ///
    /// # Returns
    /// The index of the new input.
    pub fn add_input(&mut self, input: TransactionInput) -> usize {
        self.inputs.push(input);
        self.inputs.len() - 1
    }

    /// Append a `TransactionOutput` to this transaction.
    ///
    /// # Arguments
    /// * `output` - The output to add.
    ///
    /// # Returns
    /// The index of the new output.
    pub fn add_output(&mut self, output: TransactionOutput) -> usize {
        self.outputs.push(output);
        self.outputs.len() - 1
    }

    /// Return the number of inputs in the transaction.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Return the number of outputs in the transaction.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Replace the unlocking script of the input at `index`.
    ///
    /// # Arguments
    /// * `index` - The input index.
    /// * `script` - The new unlocking script; an empty script clears it.
    pub fn set_input_script(&mut self, index: usize, script: Script) {
        self.inputs[index].unlocking_script = if script.is_empty() {
            None
        } else {
            Some(script)
        };
    }

    /// Replace the witness stack of the input at `index`.
    ///
    /// # Arguments
    /// * `index` - The input index.
    /// * `witness` - The new witness stack.
    pub fn set_witness(&mut self, index: usize, witness: Vec<Vec<u8>>) {
        self.inputs[index].witness = witness;
    }

    /// Compute the sum of all output satoshi values.
    ///
    /// # Returns
    /// The total satoshis across all outputs.
    pub fn total_output_satoshis(&self) -> u64 {
        self.outputs.iter().map(|o| o.satoshis).sum()
    }

    /// Check whether any input carries a witness stack.
    ///
    /// # Returns
    /// `true` if the transaction serializes in the BIP-144 format.
    pub fn has_witnesses(&self) -> bool {
        self.inputs.iter().any(|input| input.has_witness())
    }

    // -----------------------------------------------------------------
    // Coinbase detection
    // -----------------------------------------------------------------

    /// Check whether a source txid is the all-zero coinbase hash.
    ///
    /// # Arguments
    /// * `hash` - The 32-byte txid in internal order.
    ///
    /// # Returns
    /// `true` for the all-zero hash.
    pub fn is_coinbase_hash(hash: &[u8; 32]) -> bool {
        *hash == COINBASE_HASH
    }

    /// Determine whether this transaction is a coinbase transaction.
    ///
    /// A coinbase transaction has exactly one input with an all-zero txid
    /// and either `source_tx_out_index == 0xFFFFFFFF` or
    /// `sequence_number == 0xFFFFFFFF`.
    ///
    /// # Returns
    /// `true` if this is a coinbase transaction.
    pub fn is_coinbase(&self) -> bool {
        if self.inputs.len() != 1 {
            return false;
        }

        let input = &self.inputs[0];

        if !Self::is_coinbase_hash(&input.source_txid) {
            return false;
        }

        input.source_tx_out_index == 0xFFFF_FFFF || input.sequence_number == 0xFFFF_FFFF
    }

    // -----------------------------------------------------------------
    // Sizes
    // -----------------------------------------------------------------

    /// Return the full serialized size of this transaction in bytes.
    ///
    /// # Returns
    /// The byte length including witness data when present.
    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    /// Return the serialized size without witness data.
    ///
    /// # Returns
    /// The byte length of the witness-stripped serialization.
    pub fn base_size(&self) -> usize {
        self.to_bytes_no_witness().len()
    }

    /// Compute the BIP-141 transaction weight.
    ///
    /// Weight = base size * 3 + total size, so witness bytes count once
    /// and all other bytes count four times.
    ///
    /// # Returns
    /// The weight in weight units.
    pub fn weight(&self) -> usize {
        self.base_size() * 3 + self.size()
    }

    /// Compute the virtual size used for fee-rate arithmetic.
    ///
    /// Virtual size = weight / 4, rounded up.
    ///
    /// # Returns
    /// The virtual size in virtual bytes.
    pub fn virtual_size(&self) -> usize {
        (self.weight() + 3) / 4
    }

    // -----------------------------------------------------------------
    // Signature hashes
    // -----------------------------------------------------------------

    /// Compute the legacy (pre-segwit) signature hash for a given input.
    ///
    /// # Arguments
    /// * `input_index` - Index of the input being signed.
    /// * `script_code` - The script being satisfied (prior locking script
    ///   or redeem script).
    /// * `sighash_type` - The sighash flags.
    ///
    /// # Returns
    /// A 32-byte digest to be signed by ECDSA.
    pub fn hash_for_signature(
        &self,
        input_index: usize,
        script_code: &Script,
        sighash_type: u32,
    ) -> Result<[u8; 32], TransactionError> {
        sighash::legacy_signature_hash(self, input_index, script_code, sighash_type)
    }

    /// Compute the BIP-143 (segwit v0) signature hash for a given input.
    ///
    /// # Arguments
    /// * `input_index` - Index of the input being signed.
    /// * `script_code` - The script code being satisfied.
    /// * `satoshis` - The committed value of the output being spent.
    /// * `sighash_type` - The sighash flags.
    ///
    /// # Returns
    /// A 32-byte digest to be signed by ECDSA.
    pub fn hash_for_witness_v0(
        &self,
        input_index: usize,
        script_code: &Script,
        satoshis: u64,
        sighash_type: u32,
    ) -> Result<[u8; 32], TransactionError> {
        sighash::witness_v0_signature_hash(self, input_index, script_code, sighash_type, satoshis)
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Transaction {
    /// Display the transaction as its hex-encoded serialization.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
