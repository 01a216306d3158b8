//! Signature hash computation for transaction signing.
//!
//! Computes the digest that is signed by ECDSA to authorize spending a
//! transaction input.  Two schemes exist: the legacy scheme used by
//! pre-segwit inputs, and the BIP-143 scheme used by segwit v0 inputs,
//! which commits to the spent value and caches the prevout/sequence/output
//! hashes.
//!
//! See <https://github.com/bitcoin/bips/blob/master/bip-0143.mediawiki>

use btc_primitives::hash::sha256d;
use btc_primitives::util::{ByteWriter, VarInt};
use btc_script::opcodes::OP_CODESEPARATOR;
use btc_script::Script;

use crate::transaction::Transaction;
use crate::TransactionError;

// -----------------------------------------------------------------------
// Sighash flag constants
// -----------------------------------------------------------------------

/// Sign all inputs and all outputs (the default).
pub const SIGHASH_ALL: u32 = 0x01;

/// Sign all inputs but no outputs, allowing outputs to be modified.
pub const SIGHASH_NONE: u32 = 0x02;

/// Sign all inputs and only the output with the same index as the signed input.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Combined with another flag: only sign the current input, allowing other
/// inputs to be added later.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Mask applied to extract the base sighash mode (ALL, NONE, SINGLE).
pub const SIGHASH_MASK: u32 = 0x1f;

/// The digest returned by the legacy scheme when SIGHASH_SINGLE names an
/// output that does not exist. Historical consensus behavior.
const ONE: [u8; 32] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 1,
];

// -----------------------------------------------------------------------
// Legacy signature hash
// -----------------------------------------------------------------------

/// Compute the legacy (pre-segwit) signature hash for a given input.
///
/// Clones the transaction, strips every unlocking script, installs the
/// script code (with OP_CODESEPARATOR removed) on the signed input, applies
/// the NONE/SINGLE/ANYONECANPAY transformations, and hashes the result with
/// the 4-byte sighash type appended.
///
/// # Arguments
/// * `tx`           - The transaction being signed.
/// * `input_index`  - Index of the input being signed.
/// * `script_code`  - The script being satisfied.
/// * `sighash_type` - The sighash flags.
///
/// # Returns
/// A 32-byte double-SHA256 digest to be signed by ECDSA.
pub fn legacy_signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    sighash_type: u32,
) -> Result<[u8; 32], TransactionError> {
    if input_index >= tx.inputs.len() {
        return Err(TransactionError::InvalidTransaction(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        )));
    }

    let base_type = sighash_type & SIGHASH_MASK;

    // SIGHASH_SINGLE with no matching output hashes to the constant ONE.
    if base_type == SIGHASH_SINGLE && input_index >= tx.outputs.len() {
        return Ok(ONE);
    }

    let mut tx_tmp = tx.clone();

    // Blank every unlocking script, then install the cleaned script code
    // on the input being signed. Witness stacks never enter this scheme.
    for input in &mut tx_tmp.inputs {
        input.unlocking_script = None;
        input.witness.clear();
    }
    tx_tmp.inputs[input_index].unlocking_script = Some(strip_code_separators(script_code));

    if base_type == SIGHASH_NONE {
        // No outputs are committed; other inputs' sequences are zeroed so
        // they remain replaceable.
        tx_tmp.outputs.clear();
        for (i, input) in tx_tmp.inputs.iter_mut().enumerate() {
            if i != input_index {
                input.sequence_number = 0;
            }
        }
    } else if base_type == SIGHASH_SINGLE {
        // Only the output paired with this input is committed; earlier
        // outputs are blanked to the maximum value with an empty script.
        tx_tmp.outputs.truncate(input_index + 1);
        for output in tx_tmp.outputs.iter_mut().take(input_index) {
            output.satoshis = u64::MAX;
            output.locking_script = Script::new();
        }
        for (i, input) in tx_tmp.inputs.iter_mut().enumerate() {
            if i != input_index {
                input.sequence_number = 0;
            }
        }
    }

    if sighash_type & SIGHASH_ANYONECANPAY != 0 {
        let own = tx_tmp.inputs[input_index].clone();
        tx_tmp.inputs = vec![own];
    }

    let mut preimage = tx_tmp.to_bytes_no_witness();
    preimage.extend_from_slice(&sighash_type.to_le_bytes());
    Ok(sha256d(&preimage))
}

/// Re-encode a script with every OP_CODESEPARATOR removed.
///
/// Falls back to the script unchanged if it cannot be decoded into chunks.
fn strip_code_separators(script: &Script) -> Script {
    let chunks = match script.chunks() {
        Ok(chunks) => chunks,
        Err(_) => return script.clone(),
    };
    let mut cleaned = Script::new();
    for chunk in chunks {
        match chunk.data {
            Some(data) => {
                // Push sizes were validated during decoding.
                let _ = cleaned.append_push_data(&data);
            }
            None => {
                if chunk.op != OP_CODESEPARATOR {
                    let _ = cleaned.append_opcodes(&[chunk.op]);
                }
            }
        }
    }
    cleaned
}

// -----------------------------------------------------------------------
// BIP-143 (segwit v0) signature hash
// -----------------------------------------------------------------------

/// Compute the BIP-143 signature hash for a given input.
///
/// This is the scheme used for segwit v0 inputs. It commits to the value
/// being spent and uses a different serialization order than the legacy
/// scheme.
///
/// # Arguments
/// * `tx`           - The transaction being signed.
/// * `input_index`  - Index of the input being signed.
/// * `script_code`  - The script code being satisfied.
/// * `sighash_type` - The sighash flags.
/// * `satoshis`     - The satoshi value of the output being spent.
///
/// # Returns
/// A 32-byte double-SHA256 digest to be signed by ECDSA.
pub fn witness_v0_signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    sighash_type: u32,
    satoshis: u64,
) -> Result<[u8; 32], TransactionError> {
    let preimage = witness_v0_preimage(tx, input_index, script_code, sighash_type, satoshis)?;
    Ok(sha256d(&preimage))
}

/// Compute the BIP-143 pre-image bytes before double-hashing.
///
/// The preimage consists of:
/// 1. nVersion (4 bytes LE)
/// 2. hashPrevouts (32 bytes) - sha256d of all outpoints unless ANYONECANPAY
/// 3. hashSequence (32 bytes) - sha256d of all sequences unless ANYONECANPAY/SINGLE/NONE
/// 4. outpoint (32+4 bytes) - txid + vout of the input being signed
/// 5. scriptCode (varint + script) - the script being satisfied
/// 6. value (8 bytes LE) - satoshis of the output being spent
/// 7. nSequence (4 bytes LE) - sequence of the input being signed
/// 8. hashOutputs (32 bytes) - sha256d of all outputs or one output
/// 9. nLocktime (4 bytes LE)
/// 10. sighashType (4 bytes LE)
///
/// # Arguments
/// * `tx`           - The transaction being signed.
/// * `input_index`  - Index of the input being signed.
/// * `script_code`  - The script code being satisfied.
/// * `sighash_type` - The sighash flags.
/// * `satoshis`     - The satoshi value of the output being spent.
///
/// # Returns
/// The raw preimage bytes (not yet hashed).
pub fn witness_v0_preimage(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    sighash_type: u32,
    satoshis: u64,
) -> Result<Vec<u8>, TransactionError> {
    if input_index >= tx.inputs.len() {
        return Err(TransactionError::InvalidTransaction(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        )));
    }

    let input = &tx.inputs[input_index];
    let base_type = sighash_type & SIGHASH_MASK;

    // hashPrevouts
    let hash_prevouts = if sighash_type & SIGHASH_ANYONECANPAY == 0 {
        prevouts_hash(tx)
    } else {
        [0u8; 32]
    };

    // hashSequence
    let hash_sequence = if sighash_type & SIGHASH_ANYONECANPAY == 0
        && base_type != SIGHASH_SINGLE
        && base_type != SIGHASH_NONE
    {
        sequence_hash(tx)
    } else {
        [0u8; 32]
    };

    // hashOutputs
    let hash_outputs = if base_type != SIGHASH_SINGLE && base_type != SIGHASH_NONE {
        outputs_hash(tx, None)
    } else if base_type == SIGHASH_SINGLE && input_index < tx.outputs.len() {
        outputs_hash(tx, Some(input_index))
    } else {
        [0u8; 32]
    };

    let script_bytes = script_code.to_bytes();

    // Build the preimage
    let mut writer = ByteWriter::with_capacity(256);

    // Version
    writer.write_u32_le(tx.version);

    // hashPrevouts
    writer.write_bytes(&hash_prevouts);

    // hashSequence
    writer.write_bytes(&hash_sequence);

    // Outpoint (txid + vout)
    writer.write_bytes(&input.source_txid);
    writer.write_u32_le(input.source_tx_out_index);

    // scriptCode
    writer.write_varint(VarInt::from(script_bytes.len()));
    writer.write_bytes(script_bytes);

    // Value of the output being spent
    writer.write_u64_le(satoshis);

    // nSequence
    writer.write_u32_le(input.sequence_number);

    // hashOutputs
    writer.write_bytes(&hash_outputs);

    // nLocktime
    writer.write_u32_le(tx.lock_time);

    // Sighash type
    writer.write_u32_le(sighash_type);

    Ok(writer.into_bytes())
}

// -----------------------------------------------------------------------
// Internal helper functions
// -----------------------------------------------------------------------

/// Compute the double-SHA256 of all input outpoints concatenated.
///
/// Each outpoint is txid (32 bytes) + vout (4 bytes LE).
fn prevouts_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = ByteWriter::with_capacity(tx.inputs.len() * 36);
    for input in &tx.inputs {
        writer.write_bytes(&input.source_txid);
        writer.write_u32_le(input.source_tx_out_index);
    }
    sha256d(writer.as_bytes())
}

/// Compute the double-SHA256 of all input sequence numbers concatenated.
///
/// Each sequence number is 4 bytes LE.
fn sequence_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = ByteWriter::with_capacity(tx.inputs.len() * 4);
    for input in &tx.inputs {
        writer.write_u32_le(input.sequence_number);
    }
    sha256d(writer.as_bytes())
}

/// Compute the double-SHA256 of serialized outputs.
///
/// If `n` is `None`, all outputs are included.  Otherwise only the output
/// at that index is included (used for SIGHASH_SINGLE).
fn outputs_hash(tx: &Transaction, n: Option<usize>) -> [u8; 32] {
    let mut writer = ByteWriter::new();
    match n {
        None => {
            for output in &tx.outputs {
                writer.write_bytes(&output.bytes_for_sig_hash());
            }
        }
        Some(i) => {
            writer.write_bytes(&tx.outputs[i].bytes_for_sig_hash());
        }
    }
    sha256d(writer.as_bytes())
}
