//! Staged, signature-preserving transaction construction.
//!
//! The `TransactionBuilder` accepts inputs and outputs incrementally,
//! tracks per-input signing state, and refuses any mutation that would
//! invalidate a signature already committed to the transaction.  Signing
//! infers each input's context (script type, sign-script, witness
//! requirement) from prior-output scripts and redeem scripts, computes the
//! correct legacy or BIP-143 digest, and places the signature in the slot
//! matching the signer's public key.  `build` and `build_incomplete`
//! project the accumulated state onto a clone of the underlying
//! transaction.

mod context;

use std::collections::HashSet;

use btc_primitives::chainhash::Hash;
use btc_primitives::hash::hash160;
use btc_script::signature as script_signature;
use btc_script::{address, templates, Network, Script, ScriptError, ScriptType};

use crate::input::{TransactionInput, DEFAULT_SEQUENCE_NUMBER};
use crate::output::TransactionOutput;
use crate::sighash::{
    SIGHASH_ALL, SIGHASH_ANYONECANPAY, SIGHASH_MASK, SIGHASH_NONE, SIGHASH_SINGLE,
};
use crate::transaction::Transaction;
use crate::{BuilderError, KeyPair};

use context::{build_by_type, expand_input, expand_output, BuildResult, InputSigningState};


/// Default absurd-fee ceiling in satoshis per virtual byte.
const DEFAULT_MAXIMUM_FEE_RATE: u64 = 2500;

/// A reference to the prior output being spent by a new input.
///
/// All three forms name the same thing; the `Tx` form additionally lets
/// the builder harvest the referenced output's locking script and value.
#[derive(Clone, Copy, Debug)]
pub enum OutPointRef<'a> {
    /// The 32-byte txid in internal (little-endian) byte order.
    Hash([u8; 32]),
    /// The txid as display-order hex.
    TxId(&'a str),
    /// The full prior transaction.
    Tx(&'a Transaction),
}

/// Optional arguments to `TransactionBuilder::sign`.
#[derive(Clone, Debug, Default)]
pub struct SignOptions {
    /// The revealed redeem script for P2SH prior outputs.
    pub redeem_script: Option<Script>,

    /// The committed value of the output being spent; required for
    /// witness-hashed inputs.
    pub witness_value: Option<u64>,

    /// Reserved for P2WSH; signing by witness script is not supported.
    pub witness_script: Option<Script>,

    /// The sighash flags. Defaults to `SIGHASH_ALL`.
    pub hash_type: Option<u32>,

    /// When supplied, the inferred prior-output type must match this hint.
    pub prev_out_script_type: Option<ScriptType>,
}

/// Staged builder for Bitcoin transactions.
///
/// Inputs and outputs are appended (never reordered or removed) and
/// signatures accumulate monotonically.  Every mutation that could falsify
/// an existing signature is refused up-front, per the semantics of the
/// sighash flags the signatures carry.
pub struct TransactionBuilder {
    /// The network addresses and keys are resolved against.
    network: Network,

    /// Absurd-fee ceiling in satoshis per virtual byte, consulted only by
    /// `build`.
    pub maximum_fee_rate: u64,

    /// The nascent transaction.
    tx: Transaction,

    /// Per-input signing state, parallel to `tx.inputs`.
    inputs: Vec<InputSigningState>,

    /// "txid_hex:vout" strings of every input, enforcing outpoint
    /// uniqueness.
    prev_tx_set: HashSet<String>,
}

impl TransactionBuilder {
    /// Create an empty builder for the given network.
    ///
    /// The underlying transaction starts at version 2 with lock time 0.
    ///
    /// # Arguments
    /// * `network` - The network addresses and imported keys must belong to.
    ///
    /// # Returns
    /// An empty `TransactionBuilder`.
    pub fn new(network: Network) -> Self {
        let mut tx = Transaction::new();
        tx.version = 2;
        TransactionBuilder {
            network,
            maximum_fee_rate: DEFAULT_MAXIMUM_FEE_RATE,
            tx,
            inputs: Vec::new(),
            prev_tx_set: HashSet::new(),
        }
    }

    /// Rebuild a builder from an existing transaction so signing can
    /// resume.
    ///
    /// Outputs are replayed before inputs so the mutation gate cannot trip
    /// on signatures recovered from the inputs' unlocking data.
    ///
    /// # Arguments
    /// * `transaction` - The transaction to reconstruct from.
    /// * `network` - The network for the new builder.
    ///
    /// # Returns
    /// A builder whose signing state mirrors the transaction.
    pub fn from_transaction(
        transaction: &Transaction,
        network: Network,
    ) -> Result<Self, BuilderError> {
        let mut builder = Self::new(network);
        builder.tx.version = transaction.version;
        builder.tx.lock_time = transaction.lock_time;

        for output in &transaction.outputs {
            builder.add_output_script(output.locking_script.clone(), output.satoshis)?;
        }

        for input in &transaction.inputs {
            builder.add_input_unsafe(
                input.source_txid,
                input.source_tx_out_index,
                Some(input.sequence_number),
                input.unlocking_script.clone(),
                input.witness.clone(),
                None,
                None,
            )?;
        }

        Ok(builder)
    }

    /// The network this builder resolves addresses and keys against.
    pub fn network(&self) -> Network {
        self.network
    }

    // -----------------------------------------------------------------
    // Structural mutations
    // -----------------------------------------------------------------

    /// Set the transaction version.
    ///
    /// # Arguments
    /// * `version` - The new version; must fit an unsigned 32-bit integer.
    ///
    /// # Returns
    /// `Ok(())`, or `InvalidArgument` for out-of-range values.
    pub fn set_version(&mut self, version: i64) -> Result<(), BuilderError> {
        if version < 0 || version > u32::MAX as i64 {
            return Err(BuilderError::InvalidArgument("Expected Uint32".to_string()));
        }
        self.tx.version = version as u32;
        Ok(())
    }

    /// Set the transaction lock time.
    ///
    /// Every signature commits to the lock time, so this is refused as
    /// soon as any signature exists.
    ///
    /// # Arguments
    /// * `lock_time` - The new lock time; must fit an unsigned 32-bit integer.
    ///
    /// # Returns
    /// `Ok(())`, `InvalidArgument` for out-of-range values, or
    /// `InvalidState` if any input carries a signature.
    pub fn set_lock_time(&mut self, lock_time: i64) -> Result<(), BuilderError> {
        if lock_time < 0 || lock_time > u32::MAX as i64 {
            return Err(BuilderError::InvalidArgument("Expected Uint32".to_string()));
        }
        if self.inputs.iter().any(|input| input.has_signatures()) {
            return Err(BuilderError::InvalidState(
                "No, this would invalidate signatures".to_string(),
            ));
        }
        self.tx.lock_time = lock_time as u32;
        Ok(())
    }

    /// Append an input spending the referenced prior output.
    ///
    /// When `tx_ref` is a full transaction, the referenced output's
    /// locking script and value are harvested automatically.
    ///
    /// # Arguments
    /// * `tx_ref` - The prior transaction reference.
    /// * `vout` - The output index being spent.
    /// * `sequence` - The input sequence number; defaults to `0xFFFFFFFF`.
    /// * `prev_out_script` - The prior output's locking script, if known.
    ///
    /// # Returns
    /// The new input's index, or an error if the mutation is refused, the
    /// reference is unusable, or the outpoint is already present.
    pub fn add_input(
        &mut self,
        tx_ref: OutPointRef,
        vout: u32,
        sequence: Option<u32>,
        prev_out_script: Option<Script>,
    ) -> Result<usize, BuilderError> {
        if !self.can_modify_inputs() {
            return Err(BuilderError::InvalidState(
                "No, this would invalidate signatures".to_string(),
            ));
        }

        let (tx_hash, harvested_script, harvested_value) = match tx_ref {
            OutPointRef::Hash(hash) => (hash, None, None),
            OutPointRef::TxId(txid) => {
                let hash = Hash::from_hex(txid).map_err(|_| {
                    BuilderError::InvalidArgument(format!(
                        "unrecognized input reference: {}",
                        txid
                    ))
                })?;
                (*hash.as_bytes(), None, None)
            }
            OutPointRef::Tx(prev_tx) => {
                let output = prev_tx.outputs.get(vout as usize).ok_or_else(|| {
                    BuilderError::InvalidArgument(format!("No output at index: {}", vout))
                })?;
                (
                    prev_tx.tx_id(),
                    Some(output.locking_script.clone()),
                    Some(output.satoshis),
                )
            }
        };

        let prev_out_script = prev_out_script.or(harvested_script);
        self.add_input_unsafe(
            tx_hash,
            vout,
            sequence,
            None,
            Vec::new(),
            prev_out_script,
            harvested_value,
        )
    }

    /// Append an output paying the given address.
    ///
    /// # Arguments
    /// * `address` - The destination address; must belong to the builder's
    ///   network.
    /// * `value` - The output value in satoshis.
    ///
    /// # Returns
    /// The new output's index, or an error if the mutation is refused or
    /// the address does not resolve on this network.
    pub fn add_output_address(&mut self, address: &str, value: u64) -> Result<usize, BuilderError> {
        let script = address::to_output_script(address, self.network).map_err(|e| match e {
            ScriptError::NetworkMismatch => {
                BuilderError::InvalidArgument("Invalid version or Network mismatch".to_string())
            }
            other => BuilderError::Script(other),
        })?;
        self.add_output_script(script, value)
    }

    /// Append an output paying the given locking script.
    ///
    /// # Arguments
    /// * `script` - The locking script.
    /// * `value` - The output value in satoshis.
    ///
    /// # Returns
    /// The new output's index, or an error if the mutation is refused.
    pub fn add_output_script(&mut self, script: Script, value: u64) -> Result<usize, BuilderError> {
        if !self.can_modify_outputs() {
            return Err(BuilderError::InvalidState(
                "No, this would invalidate signatures".to_string(),
            ));
        }
        Ok(self.tx.add_output(TransactionOutput {
            satoshis: value,
            locking_script: script,
        }))
    }

    // -----------------------------------------------------------------
    // Signing
    // -----------------------------------------------------------------

    /// Sign the input at `vin` with the given key pair.
    ///
    /// On the first call for an input, the signing context is inferred
    /// from the supplied redeem script or the known prior-output script
    /// (falling back to a naked P2PKH over the signer's key). The digest
    /// is computed with the BIP-143 scheme for witness-hashed inputs and
    /// the legacy scheme otherwise, and the encoded signature is placed in
    /// the slot whose expected pubkey matches the signer's.
    ///
    /// # Arguments
    /// * `vin` - The input index to sign.
    /// * `key_pair` - The signing key.
    /// * `options` - Optional redeem script, witness value/script, sighash
    ///   flags, and type hint.
    ///
    /// # Returns
    /// `Ok(())` once the signature is placed, or the precondition error
    /// described in the module docs.
    pub fn sign(
        &mut self,
        vin: usize,
        key_pair: &KeyPair,
        options: SignOptions,
    ) -> Result<(), BuilderError> {
        if let Some(key_network) = key_pair.network {
            if key_network != self.network {
                return Err(BuilderError::InvalidArgument(
                    "Inconsistent network".to_string(),
                ));
            }
        }
        if vin >= self.inputs.len() {
            return Err(BuilderError::InvalidArgument(format!(
                "No input at index: {}",
                vin
            )));
        }

        let hash_type = options.hash_type.unwrap_or(SIGHASH_ALL);
        if self.needs_outputs(hash_type) {
            return Err(BuilderError::InvalidState(
                "Transaction needs outputs".to_string(),
            ));
        }

        if let (Some(stored), Some(given)) =
            (&self.inputs[vin].redeem_script, &options.redeem_script)
        {
            if !stored.equals(given) {
                return Err(BuilderError::InvalidArgument(
                    "Inconsistent redeemScript".to_string(),
                ));
            }
        }

        let our_pubkey = key_pair.public_key();

        if !self.inputs[vin].can_sign() {
            let state = &mut self.inputs[vin];

            if let Some(witness_value) = options.witness_value {
                if let Some(existing) = state.value {
                    if existing != witness_value {
                        return Err(BuilderError::InvalidArgument(
                            "Input didn't match witnessValue".to_string(),
                        ));
                    }
                }
                state.value = Some(witness_value);
            }

            if let Some(redeem_script) = &options.redeem_script {
                prepare_with_redeem(state, redeem_script, &our_pubkey)?;
            } else if options.witness_script.is_some() {
                return Err(BuilderError::Unimplemented(
                    "signing by witnessScript is not supported".to_string(),
                ));
            } else if state.prev_out_script.is_some() {
                prepare_from_prev_out(state, &our_pubkey)?;
            } else {
                prepare_naked_p2pkh(state, &our_pubkey);
            }

            if !self.inputs[vin].can_sign() {
                return Err(BuilderError::InvalidArgument(format!(
                    "{} not supported",
                    type_tag(self.inputs[vin].prev_out_type)
                )));
            }
        }

        if let Some(hint) = options.prev_out_script_type {
            if self.inputs[vin].prev_out_type != Some(hint) {
                return Err(BuilderError::InvalidArgument(format!(
                    "input #{} is not of type {}: {}",
                    vin,
                    hint,
                    type_tag(self.inputs[vin].prev_out_type)
                )));
            }
        }

        let (sign_script, has_witness, value) = {
            let state = &self.inputs[vin];
            (
                state.sign_script.clone(),
                state.has_witness,
                state.value,
            )
        };
        let sign_script = sign_script.ok_or_else(|| {
            BuilderError::InvalidState("signing context is missing a sign script".to_string())
        })?;

        let digest = if has_witness {
            if our_pubkey.len() != 33 {
                return Err(BuilderError::InvalidArgument(
                    "BIP143 rejects uncompressed public keys in P2WPKH or P2WSH".to_string(),
                ));
            }
            let value = value.ok_or_else(|| {
                BuilderError::InvalidState("signing context is missing the input value".to_string())
            })?;
            self.tx
                .hash_for_witness_v0(vin, &sign_script, value, hash_type)?
        } else {
            self.tx.hash_for_signature(vin, &sign_script, hash_type)?
        };

        let state = &mut self.inputs[vin];
        for i in 0..state.pubkeys.len() {
            if state.pubkeys[i].as_deref() != Some(our_pubkey.as_slice()) {
                continue;
            }
            if state.signatures[i].is_some() {
                return Err(BuilderError::Duplicate(
                    "Signature already exists".to_string(),
                ));
            }
            let signature = key_pair.sign(&digest)?;
            state.signatures[i] = Some(script_signature::encode_signature(&signature, hash_type));
            return Ok(());
        }

        Err(BuilderError::InvalidArgument(
            "Key pair cannot sign for this input".to_string(),
        ))
    }

    // -----------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------

    /// Assemble the fully-signed transaction.
    ///
    /// A pure projection: the builder is left untouched and may keep
    /// accumulating signatures or be built again.
    ///
    /// # Returns
    /// The signed transaction, or an error if inputs or outputs are
    /// missing, any input is not fully signed, or the fee rate exceeds
    /// `maximum_fee_rate`.
    pub fn build(&self) -> Result<Transaction, BuilderError> {
        self.build_internal(false)
    }

    /// Assemble the transaction, leaving unsigned inputs blank.
    ///
    /// Suitable for handing off to other parties in a multi-signer
    /// workflow. Every error other than incompleteness still surfaces.
    ///
    /// # Returns
    /// The partially-signed transaction.
    pub fn build_incomplete(&self) -> Result<Transaction, BuilderError> {
        self.build_internal(true)
    }

    fn build_internal(&self, allow_incomplete: bool) -> Result<Transaction, BuilderError> {
        if !allow_incomplete {
            if self.tx.inputs.is_empty() {
                return Err(BuilderError::InvalidState(
                    "Transaction has no inputs".to_string(),
                ));
            }
            if self.tx.outputs.is_empty() {
                return Err(BuilderError::InvalidState(
                    "Transaction has no outputs".to_string(),
                ));
            }
        }

        let mut tx = self.tx.clone();

        for (i, state) in self.inputs.iter().enumerate() {
            match build_by_type(state.prev_out_type, state) {
                BuildResult::Complete { script, witness } => {
                    tx.set_input_script(i, script);
                    tx.set_witness(i, witness);
                }
                BuildResult::Missing => {
                    if !allow_incomplete {
                        return Err(BuilderError::Incomplete(
                            "Not enough information".to_string(),
                        ));
                    }
                }
                BuildResult::Unknown => {
                    if !allow_incomplete {
                        if state.prev_out_type == Some(ScriptType::Nonstandard) {
                            return Err(BuilderError::Incomplete(
                                "Unknown input type".to_string(),
                            ));
                        }
                        return Err(BuilderError::Incomplete(
                            "Transaction is not complete".to_string(),
                        ));
                    }
                    // Keep whatever unlocking data was observed when this
                    // input was reconstructed.
                    if let Some(script) = &state.script {
                        tx.set_input_script(i, script.clone());
                    }
                    if let Some(witness) = &state.witness {
                        tx.set_witness(i, witness.clone());
                    }
                }
            }
        }

        if !allow_incomplete && self.over_maximum_fees(&tx) {
            return Err(BuilderError::AbsurdFee);
        }

        Ok(tx)
    }

    /// Best-effort absurd-fee guard: inputs with unknown values count as
    /// zero, so a negative or unknowable fee never trips it.
    fn over_maximum_fees(&self, tx: &Transaction) -> bool {
        let incoming: u64 = self.inputs.iter().map(|input| input.value.unwrap_or(0)).sum();
        let outgoing = tx.total_output_satoshis();
        let fee = incoming as i128 - outgoing as i128;
        if fee <= 0 {
            return false;
        }
        let bytes = tx.virtual_size() as i128;
        fee / bytes > self.maximum_fee_rate as i128
    }

    // -----------------------------------------------------------------
    // Mutation gate
    // -----------------------------------------------------------------

    /// Whether inputs may still be added.
    ///
    /// Only the ANYONECANPAY bit makes a signature commit to just its own
    /// input, so every existing signature must carry it.
    pub(crate) fn can_modify_inputs(&self) -> bool {
        self.inputs.iter().all(|input| {
            input.signatures.iter().all(|sig| match sig {
                None => true,
                Some(sig) => script_signature::hash_type_of(sig) & SIGHASH_ANYONECANPAY != 0,
            })
        })
    }

    /// Whether outputs may still be added.
    ///
    /// SIGHASH_NONE signatures never commit to outputs; SIGHASH_SINGLE
    /// signatures tolerate additions only while every input still has its
    /// paired output; everything else forbids modification.
    pub(crate) fn can_modify_outputs(&self) -> bool {
        let n_inputs = self.tx.inputs.len();
        let n_outputs = self.tx.outputs.len();
        self.inputs.iter().all(|input| {
            input.signatures.iter().all(|sig| match sig {
                None => true,
                Some(sig) => {
                    let mode = script_signature::hash_type_of(sig) & SIGHASH_MASK;
                    if mode == SIGHASH_NONE {
                        true
                    } else if mode == SIGHASH_SINGLE {
                        n_inputs <= n_outputs
                    } else {
                        false
                    }
                }
            })
        })
    }

    /// Whether signing with `signing_hash_type` requires outputs that are
    /// not there.
    ///
    /// Plain SIGHASH_ALL requires at least one output. Otherwise, an empty
    /// output list is still refused when any existing signature's mode
    /// committed to outputs.
    fn needs_outputs(&self, signing_hash_type: u32) -> bool {
        if signing_hash_type == SIGHASH_ALL {
            return self.tx.outputs.is_empty();
        }
        self.tx.outputs.is_empty()
            && self.inputs.iter().any(|input| {
                input.signatures.iter().any(|sig| match sig {
                    None => false,
                    Some(sig) => {
                        script_signature::hash_type_of(sig) & SIGHASH_MASK != SIGHASH_NONE
                    }
                })
            })
    }

    // -----------------------------------------------------------------
    // Internal input append
    // -----------------------------------------------------------------

    /// Append an input without consulting the mutation gate, recovering
    /// signing state from any observed unlocking data.
    #[allow(clippy::too_many_arguments)]
    fn add_input_unsafe(
        &mut self,
        tx_hash: [u8; 32],
        vout: u32,
        sequence: Option<u32>,
        script_sig: Option<Script>,
        witness: Vec<Vec<u8>>,
        prev_out_script: Option<Script>,
        value: Option<u64>,
    ) -> Result<usize, BuilderError> {
        if Transaction::is_coinbase_hash(&tx_hash) {
            return Err(BuilderError::InvalidArgument(
                "coinbase inputs not supported".to_string(),
            ));
        }

        let prev_tx_out = format!("{}:{}", hex::encode(tx_hash), vout);
        if self.prev_tx_set.contains(&prev_tx_out) {
            return Err(BuilderError::Duplicate(format!(
                "Duplicate TxOut: {}",
                prev_tx_out
            )));
        }

        let mut state = if script_sig.is_some() || !witness.is_empty() {
            let empty = Script::new();
            let expanded = expand_input(script_sig.as_ref().unwrap_or(&empty), &witness);
            InputSigningState {
                script: script_sig.clone(),
                witness: if witness.is_empty() {
                    None
                } else {
                    Some(witness.clone())
                },
                prev_out_script: expanded.prev_out_script,
                prev_out_type: expanded.prev_out_type,
                redeem_script: expanded.redeem_script,
                redeem_script_type: expanded.redeem_script_type,
                pubkeys: expanded.pubkeys,
                signatures: expanded.signatures,
                max_signatures: expanded.max_signatures,
                ..Default::default()
            }
        } else {
            InputSigningState::default()
        };

        if let Some(value) = value {
            state.value = Some(value);
        }

        if state.prev_out_script.is_none() {
            if let Some(prev) = prev_out_script {
                if state.pubkeys.is_empty() {
                    let expanded = expand_output(&prev, None);
                    if let (Some(pubkeys), Some(signatures)) =
                        (expanded.pubkeys, expanded.signatures)
                    {
                        state.pubkeys = pubkeys;
                        state.signatures = signatures;
                        state.max_signatures = expanded.max_signatures;
                    }
                    state.prev_out_type = Some(expanded.script_type);
                } else {
                    state.prev_out_type = Some(prev.classify());
                }
                state.prev_out_script = Some(prev);
            }
        }

        let mut input = TransactionInput::new();
        input.source_txid = tx_hash;
        input.source_tx_out_index = vout;
        input.sequence_number = sequence.unwrap_or(DEFAULT_SEQUENCE_NUMBER);
        input.unlocking_script = script_sig;
        input.witness = witness;

        let vin = self.tx.add_input(input);
        self.inputs.push(state);
        self.prev_tx_set.insert(prev_tx_out);
        Ok(vin)
    }

    // -----------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------

    /// A read-only view of the transaction accumulated so far.
    ///
    /// Unlocking scripts and witness stacks are only stamped by `build` /
    /// `build_incomplete`; this view reflects the structural state.
    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    /// The per-input signing states.
    #[cfg(test)]
    pub(crate) fn input_states(&self) -> &[InputSigningState] {
        &self.inputs
    }

    /// The outpoint uniqueness set.
    #[cfg(test)]
    pub(crate) fn outpoint_set(&self) -> &HashSet<String> {
        &self.prev_tx_set
    }
}

/// The display tag for an inferred type, "nonstandard" when unknown.
fn type_tag(script_type: Option<ScriptType>) -> String {
    match script_type {
        Some(ty) => ty.to_string(),
        None => ScriptType::Nonstandard.to_string(),
    }
}

// -----------------------------------------------------------------------
// Context inference
// -----------------------------------------------------------------------

/// Infer signing context from a supplied redeem script.
///
/// The P2SH wrapper derived from the redeem script must agree with any
/// known prior-output script, and the redeem script must expand to a
/// supported type the signer's key can satisfy. P2SH-P2WPKH inputs sign
/// over a synthesized P2PKH-shaped script and hash with BIP-143.
fn prepare_with_redeem(
    state: &mut InputSigningState,
    redeem_script: &Script,
    our_pubkey: &[u8],
) -> Result<(), BuilderError> {
    if let Some(prev) = &state.prev_out_script {
        if prev.classify() != ScriptType::P2sh {
            return Err(BuilderError::InvalidArgument(
                "PrevOutScript must be P2SH".to_string(),
            ));
        }
        let prev_hash = prev.script_hash()?;
        if prev_hash != hash160(redeem_script.to_bytes()) {
            return Err(BuilderError::InvalidArgument(
                "Redeem script inconsistent with prevOutScript".to_string(),
            ));
        }
    }

    let expanded = expand_output(redeem_script, Some(our_pubkey));
    let (pubkeys, signatures) = match (expanded.pubkeys, expanded.signatures) {
        (Some(pubkeys), Some(signatures)) => (pubkeys, signatures),
        _ => {
            return Err(BuilderError::InvalidArgument(format!(
                "{} not supported as redeemScript ({})",
                expanded.script_type,
                redeem_script.to_asm()
            )));
        }
    };

    let is_witness = expanded.script_type == ScriptType::P2wpkh;

    state.redeem_script = Some(redeem_script.clone());
    state.redeem_script_type = Some(expanded.script_type);
    state.prev_out_type = Some(ScriptType::P2sh);
    state.prev_out_script = Some(templates::p2sh_lock_from_redeem(redeem_script));
    state.has_witness = is_witness;
    if is_witness {
        state.sign_script = Some(templates::p2pkh_lock(&hash160(our_pubkey)));
    } else {
        state.sign_script = Some(redeem_script.clone());
    }
    state.pubkeys = pubkeys;
    state.signatures = signatures;
    state.max_signatures = expanded.max_signatures;
    Ok(())
}

/// Infer signing context from the known prior-output script.
///
/// P2SH prior outputs require the redeem script to be supplied; P2WPKH
/// prior outputs sign over a synthesized P2PKH-shaped script and hash
/// with BIP-143.
fn prepare_from_prev_out(
    state: &mut InputSigningState,
    our_pubkey: &[u8],
) -> Result<(), BuilderError> {
    let prev = match state.prev_out_script.clone() {
        Some(prev) => prev,
        None => {
            return Err(BuilderError::InvalidState(
                "signing context is missing the prevOutScript".to_string(),
            ));
        }
    };
    let prev_type = prev.classify();

    if prev_type == ScriptType::P2sh {
        return Err(BuilderError::InvalidArgument(
            "PrevOutScript is P2SH, missing redeemScript".to_string(),
        ));
    }

    let expanded = expand_output(&prev, Some(our_pubkey));
    let (pubkeys, signatures) = match (expanded.pubkeys, expanded.signatures) {
        (Some(pubkeys), Some(signatures)) => (pubkeys, signatures),
        _ => {
            let message = format!("{} not supported ({})", expanded.script_type, prev.to_asm());
            return Err(match expanded.script_type {
                ScriptType::Nonstandard => BuilderError::Unimplemented(message),
                _ => BuilderError::InvalidArgument(message),
            });
        }
    };

    state.prev_out_type = Some(prev_type);
    if prev_type == ScriptType::P2wpkh {
        state.has_witness = true;
        state.sign_script = Some(templates::p2pkh_lock(&hash160(our_pubkey)));
    } else {
        state.has_witness = false;
        state.sign_script = Some(prev);
    }
    state.pubkeys = pubkeys;
    state.signatures = signatures;
    state.max_signatures = expanded.max_signatures;
    Ok(())
}

/// Assume a naked P2PKH prior output over the signer's key.
fn prepare_naked_p2pkh(state: &mut InputSigningState, our_pubkey: &[u8]) {
    let script = templates::p2pkh_lock(&hash160(our_pubkey));
    state.prev_out_script = Some(script.clone());
    state.prev_out_type = Some(ScriptType::P2pkh);
    state.sign_script = Some(script);
    state.has_witness = false;
    state.pubkeys = vec![Some(our_pubkey.to_vec())];
    state.signatures = vec![None];
    state.max_signatures = Some(1);
}
