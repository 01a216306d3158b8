//! Bitcoin script opcode constants.
//!
//! Defines the opcode byte values used by the script codec, the
//! classifier, and the output templates, plus name lookups for ASM
//! rendering and parsing.

/// Push an empty byte array onto the stack.
pub const OP_0: u8 = 0x00;
/// Alias for OP_0.
pub const OP_FALSE: u8 = 0x00;
/// Push the next 1 byte of data.
pub const OP_DATA_1: u8 = 0x01;
/// Push the next 20 bytes of data (pubkey hash / script hash).
pub const OP_DATA_20: u8 = 0x14;
/// Push the next 32 bytes of data.
pub const OP_DATA_32: u8 = 0x20;
/// Push the next 33 bytes of data (compressed public key).
pub const OP_DATA_33: u8 = 0x21;
/// Largest direct data push (75 bytes).
pub const OP_DATA_75: u8 = 0x4b;
/// The next byte holds the number of bytes to push.
pub const OP_PUSHDATA1: u8 = 0x4c;
/// The next 2 bytes (LE) hold the number of bytes to push.
pub const OP_PUSHDATA2: u8 = 0x4d;
/// The next 4 bytes (LE) hold the number of bytes to push.
pub const OP_PUSHDATA4: u8 = 0x4e;
/// Push the number -1 onto the stack.
pub const OP_1NEGATE: u8 = 0x4f;
/// Push the number 1 onto the stack.
pub const OP_1: u8 = 0x51;
/// Alias for OP_1.
pub const OP_TRUE: u8 = 0x51;
/// Push the number 16 onto the stack.
pub const OP_16: u8 = 0x60;

/// Flow control.
pub const OP_IF: u8 = 0x63;
/// Flow control (inverted).
pub const OP_NOTIF: u8 = 0x64;
/// Reserved.
pub const OP_VERIF: u8 = 0x65;
/// Reserved.
pub const OP_VERNOTIF: u8 = 0x66;
/// Flow control.
pub const OP_ELSE: u8 = 0x67;
/// Flow control.
pub const OP_ENDIF: u8 = 0x68;
/// Mark transaction as invalid (data carrier).
pub const OP_RETURN: u8 = 0x6a;

/// Duplicate the top stack item.
pub const OP_DUP: u8 = 0x76;

/// Push equality of the top two items.
pub const OP_EQUAL: u8 = 0x87;
/// OP_EQUAL then OP_VERIFY.
pub const OP_EQUALVERIFY: u8 = 0x88;

/// Hash the top item with RIPEMD160(SHA256(x)).
pub const OP_HASH160: u8 = 0xa9;
/// Signature-hash boundary marker, excluded from script code.
pub const OP_CODESEPARATOR: u8 = 0xab;
/// Verify an ECDSA signature.
pub const OP_CHECKSIG: u8 = 0xac;
/// OP_CHECKSIG then OP_VERIFY.
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
/// Verify m-of-n ECDSA signatures.
pub const OP_CHECKMULTISIG: u8 = 0xae;

/// Look up the canonical name of an opcode for ASM rendering.
///
/// Data push opcodes (OP_DATA_1..OP_DATA_75) have no names; chunk
/// rendering emits their payload as hex instead.
///
/// # Arguments
/// * `op` - The opcode byte.
///
/// # Returns
/// The `OP_xxx` name, or "OP_UNKNOWN" for bytes without one.
pub fn opcode_to_string(op: u8) -> &'static str {
    match op {
        OP_0 => "OP_0",
        OP_PUSHDATA1 => "OP_PUSHDATA1",
        OP_PUSHDATA2 => "OP_PUSHDATA2",
        OP_PUSHDATA4 => "OP_PUSHDATA4",
        OP_1NEGATE => "OP_1NEGATE",
        0x51 => "OP_1",
        0x52 => "OP_2",
        0x53 => "OP_3",
        0x54 => "OP_4",
        0x55 => "OP_5",
        0x56 => "OP_6",
        0x57 => "OP_7",
        0x58 => "OP_8",
        0x59 => "OP_9",
        0x5a => "OP_10",
        0x5b => "OP_11",
        0x5c => "OP_12",
        0x5d => "OP_13",
        0x5e => "OP_14",
        0x5f => "OP_15",
        OP_16 => "OP_16",
        OP_IF => "OP_IF",
        OP_NOTIF => "OP_NOTIF",
        OP_VERIF => "OP_VERIF",
        OP_VERNOTIF => "OP_VERNOTIF",
        OP_ELSE => "OP_ELSE",
        OP_ENDIF => "OP_ENDIF",
        OP_RETURN => "OP_RETURN",
        OP_DUP => "OP_DUP",
        OP_EQUAL => "OP_EQUAL",
        OP_EQUALVERIFY => "OP_EQUALVERIFY",
        OP_HASH160 => "OP_HASH160",
        OP_CODESEPARATOR => "OP_CODESEPARATOR",
        OP_CHECKSIG => "OP_CHECKSIG",
        OP_CHECKSIGVERIFY => "OP_CHECKSIGVERIFY",
        OP_CHECKMULTISIG => "OP_CHECKMULTISIG",
        _ => "OP_UNKNOWN",
    }
}

/// Look up an opcode byte from its canonical `OP_xxx` name.
///
/// # Arguments
/// * `name` - The opcode name, e.g. "OP_DUP".
///
/// # Returns
/// `Some(byte)` for known names, `None` otherwise.
pub fn string_to_opcode(name: &str) -> Option<u8> {
    let op = match name {
        "OP_0" | "OP_FALSE" => OP_0,
        "OP_PUSHDATA1" => OP_PUSHDATA1,
        "OP_PUSHDATA2" => OP_PUSHDATA2,
        "OP_PUSHDATA4" => OP_PUSHDATA4,
        "OP_1NEGATE" => OP_1NEGATE,
        "OP_1" | "OP_TRUE" => OP_1,
        "OP_2" => 0x52,
        "OP_3" => 0x53,
        "OP_4" => 0x54,
        "OP_5" => 0x55,
        "OP_6" => 0x56,
        "OP_7" => 0x57,
        "OP_8" => 0x58,
        "OP_9" => 0x59,
        "OP_10" => 0x5a,
        "OP_11" => 0x5b,
        "OP_12" => 0x5c,
        "OP_13" => 0x5d,
        "OP_14" => 0x5e,
        "OP_15" => 0x5f,
        "OP_16" => OP_16,
        "OP_IF" => OP_IF,
        "OP_NOTIF" => OP_NOTIF,
        "OP_ELSE" => OP_ELSE,
        "OP_ENDIF" => OP_ENDIF,
        "OP_RETURN" => OP_RETURN,
        "OP_DUP" => OP_DUP,
        "OP_EQUAL" => OP_EQUAL,
        "OP_EQUALVERIFY" => OP_EQUALVERIFY,
        "OP_HASH160" => OP_HASH160,
        "OP_CODESEPARATOR" => OP_CODESEPARATOR,
        "OP_CHECKSIG" => OP_CHECKSIG,
        "OP_CHECKSIGVERIFY" => OP_CHECKSIGVERIFY,
        "OP_CHECKMULTISIG" => OP_CHECKMULTISIG,
        _ => return None,
    };
    Some(op)
}
