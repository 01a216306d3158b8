//! Per-input signing state, script expansion, and final assembly.
//!
//! The builder tracks one `InputSigningState` per transaction input. The
//! expanders recover that state from locking scripts and from
//! already-built unlocking data; the assembler renders it back into a
//! scriptSig and witness stack.

use btc_primitives::hash::hash160;
use btc_script::signature::{is_canonical_pubkey, is_canonical_signature};
use btc_script::{templates, Script, ScriptType};

/// Everything known about one input's signing progress.
///
/// `pubkeys` and `signatures` are parallel, index-aligned arrays: slot `i`
/// holds the public key expected at that position and the signature that
/// fills it, either of which may still be unknown. Slot order is the
/// assembly order mandated by consensus, so signatures are placed by
/// matching pubkey slot rather than appended.
#[derive(Clone, Debug, Default)]
pub(crate) struct InputSigningState {
    /// Observed scriptSig, when rebuilt from an existing transaction.
    pub script: Option<Script>,

    /// Observed witness stack, when rebuilt from an existing transaction.
    pub witness: Option<Vec<Vec<u8>>>,

    /// The locking script of the output being spent.
    pub prev_out_script: Option<Script>,

    /// Classification of `prev_out_script`.
    pub prev_out_type: Option<ScriptType>,

    /// The revealed script for P2SH prior outputs.
    pub redeem_script: Option<Script>,

    /// Classification of `redeem_script`.
    pub redeem_script_type: Option<ScriptType>,

    /// The script fed into signature hashing. Differs from
    /// `prev_out_script` for P2WPKH and P2SH-wrapped inputs.
    pub sign_script: Option<Script>,

    /// Whether this input hashes with the segwit v0 scheme and spends to a
    /// witness stack.
    pub has_witness: bool,

    /// The committed value of the output being spent. Required before a
    /// witness-hashed input can be signed; set once.
    pub value: Option<u64>,

    /// Expected public key per slot, `None` where unknown.
    pub pubkeys: Vec<Option<Vec<u8>>>,

    /// DER-plus-hash-type signature per slot, `None` where empty.
    pub signatures: Vec<Option<Vec<u8>>>,

    /// Total signatures the script calls for (slot count).
    pub max_signatures: Option<usize>,
}

impl InputSigningState {
    /// Whether enough context exists to compute a signature for this input.
    ///
    /// Requires a sign-script, non-empty equal-length slot arrays, and a
    /// known value when the input is witness-hashed.
    pub fn can_sign(&self) -> bool {
        self.sign_script.is_some()
            && !self.pubkeys.is_empty()
            && self.signatures.len() == self.pubkeys.len()
            && self.max_signatures.map_or(true, |max| max == self.pubkeys.len())
            && (!self.has_witness || self.value.is_some())
    }

    /// Whether any signature slot is filled.
    pub fn has_signatures(&self) -> bool {
        self.signatures.iter().any(|sig| sig.is_some())
    }
}

// -----------------------------------------------------------------------
// Output expansion
// -----------------------------------------------------------------------

/// Signing context recovered from a locking script.
#[derive(Clone, Debug)]
pub(crate) struct ExpandedOutput {
    /// Classification of the script.
    pub script_type: ScriptType,
    /// Pubkey slots, populated when derivable from the script and the
    /// signer's key.
    pub pubkeys: Option<Vec<Option<Vec<u8>>>>,
    /// Matching empty signature slots.
    pub signatures: Option<Vec<Option<Vec<u8>>>>,
    /// Slot count.
    pub max_signatures: Option<usize>,
}

/// Parse a locking script into signing context.
///
/// For the single-key types the pubkey slot is populated only when
/// `our_pubkey` is supplied and hashes to the script's committed hash;
/// otherwise only the type is known.
///
/// # Arguments
/// * `script` - The locking script (or redeem script) to expand.
/// * `our_pubkey` - The signer's SEC1 public key, if known.
///
/// # Returns
/// The recovered context.
pub(crate) fn expand_output(script: &Script, our_pubkey: Option<&[u8]>) -> ExpandedOutput {
    let script_type = script.classify();

    let committed_hash = match script_type {
        ScriptType::P2pkh => script.public_key_hash().ok(),
        ScriptType::P2wpkh => script.witness_program().ok(),
        _ => None,
    };

    if let (Some(hash), Some(pubkey)) = (committed_hash, our_pubkey) {
        if hash160(pubkey) == hash {
            return ExpandedOutput {
                script_type,
                pubkeys: Some(vec![Some(pubkey.to_vec())]),
                signatures: Some(vec![None]),
                max_signatures: Some(1),
            };
        }
    }

    ExpandedOutput {
        script_type,
        pubkeys: None,
        signatures: None,
        max_signatures: None,
    }
}

// -----------------------------------------------------------------------
// Input expansion
// -----------------------------------------------------------------------

/// Signing context recovered from already-built unlocking data.
#[derive(Clone, Debug, Default)]
pub(crate) struct ExpandedInput {
    /// The locking script implied by the unlocking data.
    pub prev_out_script: Option<Script>,
    /// Classification of the implied locking script.
    pub prev_out_type: Option<ScriptType>,
    /// The revealed redeem script, for P2SH inputs.
    pub redeem_script: Option<Script>,
    /// Classification of the redeem script.
    pub redeem_script_type: Option<ScriptType>,
    /// Recovered pubkey slots.
    pub pubkeys: Vec<Option<Vec<u8>>>,
    /// Recovered signature slots.
    pub signatures: Vec<Option<Vec<u8>>>,
    /// Slot count.
    pub max_signatures: Option<usize>,
}

/// Recover signing context from a prior scriptSig and witness stack.
///
/// Recognizes the P2PKH scriptSig shape, the P2WPKH witness shape, and
/// P2SH wrappers of either (the final scriptSig push is the redeem
/// script). Anything else is nonstandard.
///
/// # Arguments
/// * `script_sig` - The observed unlocking script.
/// * `witness` - The observed witness stack.
///
/// # Returns
/// The recovered context; empty when there is no unlocking data at all.
pub(crate) fn expand_input(script_sig: &Script, witness: &[Vec<u8>]) -> ExpandedInput {
    if script_sig.is_empty() && witness.is_empty() {
        return ExpandedInput::default();
    }

    // P2WPKH: bare [sig, pubkey] witness, empty scriptSig.
    if script_sig.is_empty() {
        if let Some((sig, pubkey)) = match_signature_pubkey_pair(witness) {
            return ExpandedInput {
                prev_out_script: Some(templates::p2wpkh_lock(&hash160(&pubkey))),
                prev_out_type: Some(ScriptType::P2wpkh),
                pubkeys: vec![Some(pubkey)],
                signatures: vec![Some(sig)],
                max_signatures: Some(1),
                ..Default::default()
            };
        }
        return nonstandard_input();
    }

    let chunks = match script_sig.chunks() {
        Ok(chunks) => chunks,
        Err(_) => return nonstandard_input(),
    };

    // P2PKH: <sig> <pubkey>.
    if witness.is_empty() && chunks.len() == 2 {
        if let (Some(sig), Some(pubkey)) = (&chunks[0].data, &chunks[1].data) {
            if is_canonical_signature(sig) && is_canonical_pubkey(pubkey) {
                return ExpandedInput {
                    prev_out_script: Some(templates::p2pkh_lock(&hash160(pubkey))),
                    prev_out_type: Some(ScriptType::P2pkh),
                    pubkeys: vec![Some(pubkey.clone())],
                    signatures: vec![Some(sig.clone())],
                    max_signatures: Some(1),
                    ..Default::default()
                };
            }
        }
    }

    // P2SH: the final push is the redeem script; the inner unlocking data
    // expands recursively by the redeem script's own type.
    if let Some(redeem_bytes) = chunks.last().and_then(|chunk| chunk.data.clone()) {
        let redeem = Script::from_bytes(&redeem_bytes);
        let redeem_type = redeem.classify();

        let inner = match redeem_type {
            ScriptType::P2pkh if witness.is_empty() && chunks.len() == 3 => {
                match (&chunks[0].data, &chunks[1].data) {
                    (Some(sig), Some(pubkey))
                        if is_canonical_signature(sig) && is_canonical_pubkey(pubkey) =>
                    {
                        Some((sig.clone(), pubkey.clone()))
                    }
                    _ => None,
                }
            }
            ScriptType::P2wpkh if chunks.len() == 1 => match_signature_pubkey_pair(witness),
            _ => None,
        };

        if let Some((sig, pubkey)) = inner {
            return ExpandedInput {
                prev_out_script: Some(templates::p2sh_lock_from_redeem(&redeem)),
                prev_out_type: Some(ScriptType::P2sh),
                redeem_script: Some(redeem),
                redeem_script_type: Some(redeem_type),
                pubkeys: vec![Some(pubkey)],
                signatures: vec![Some(sig)],
                max_signatures: Some(1),
            };
        }
    }

    nonstandard_input()
}

/// Match a two-item witness stack of canonical [signature, pubkey].
fn match_signature_pubkey_pair(witness: &[Vec<u8>]) -> Option<(Vec<u8>, Vec<u8>)> {
    if witness.len() == 2 && is_canonical_signature(&witness[0]) && is_canonical_pubkey(&witness[1])
    {
        Some((witness[0].clone(), witness[1].clone()))
    } else {
        None
    }
}

fn nonstandard_input() -> ExpandedInput {
    ExpandedInput {
        prev_out_type: Some(ScriptType::Nonstandard),
        ..Default::default()
    }
}

// -----------------------------------------------------------------------
// Assembly
// -----------------------------------------------------------------------

/// Outcome of rendering one input's signing state.
pub(crate) enum BuildResult {
    /// A full scriptSig and witness stack.
    Complete {
        /// The assembled unlocking script.
        script: Script,
        /// The assembled witness stack (empty for legacy inputs).
        witness: Vec<Vec<u8>>,
    },
    /// The type is known but signatures are missing.
    Missing,
    /// The type is unknown or unsupported.
    Unknown,
}

/// Render an input's signing state into unlocking data, recursively for
/// P2SH wrappers.
///
/// # Arguments
/// * `script_type` - The type to render as (the prior-output type at the
///   top level, the redeem type when recursing into a P2SH wrapper).
/// * `state` - The input's signing state.
///
/// # Returns
/// The assembled data, or a marker for missing/unknown inputs.
pub(crate) fn build_by_type(script_type: Option<ScriptType>, state: &InputSigningState) -> BuildResult {
    match script_type {
        Some(ScriptType::P2pkh) => match first_slot(state) {
            Some((signature, pubkey)) => {
                let mut script = Script::new();
                // Push sizes are bounded by signature and key encodings.
                let _ = script.append_push_data(&signature);
                let _ = script.append_push_data(&pubkey);
                BuildResult::Complete {
                    script,
                    witness: Vec::new(),
                }
            }
            None => BuildResult::Missing,
        },
        Some(ScriptType::P2wpkh) => match first_slot(state) {
            Some((signature, pubkey)) => BuildResult::Complete {
                script: Script::new(),
                witness: vec![signature, pubkey],
            },
            None => BuildResult::Missing,
        },
        Some(ScriptType::P2sh) => {
            let redeem = match &state.redeem_script {
                Some(redeem) => redeem,
                None => return BuildResult::Missing,
            };
            match build_by_type(state.redeem_script_type, state) {
                BuildResult::Complete { script, witness } => {
                    // The inner scriptSig gains the redeem script as its
                    // final push; the witness stack transfers unchanged.
                    let mut wrapped = script;
                    let _ = wrapped.append_push_data(redeem.to_bytes());
                    BuildResult::Complete {
                        script: wrapped,
                        witness,
                    }
                }
                other => other,
            }
        }
        Some(ScriptType::Nonstandard) | None => BuildResult::Unknown,
    }
}

/// Extract the filled first slot, if both its pubkey and signature are known.
fn first_slot(state: &InputSigningState) -> Option<(Vec<u8>, Vec<u8>)> {
    let signature = state.signatures.first()?.clone()?;
    let pubkey = state.pubkeys.first()?.clone()?;
    Some((signature, pubkey))
}
