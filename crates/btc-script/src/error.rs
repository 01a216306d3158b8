/// Error types for script operations.
///
/// Covers parsing errors, encoding/decoding failures, address validation,
/// and script classification problems.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Generic invalid script error.
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// Invalid opcode data encountered during ASM parsing.
    #[error("invalid opcode data")]
    InvalidOpcodeData,

    /// Attempted to use append_opcodes for a push data opcode.
    #[error("use append_push_data for push data funcs: {0}")]
    InvalidOpcodeType(String),

    /// Invalid address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid address length after Base58 decoding.
    #[error("invalid address length for '{0}'")]
    InvalidAddressLength(String),

    /// Address type not supported (unknown version byte or witness program).
    #[error("address not supported {0}")]
    UnsupportedAddress(String),

    /// The decoded address does not belong to the expected network.
    #[error("Invalid version or Network mismatch")]
    NetworkMismatch,

    /// Invalid hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Script is empty when a non-empty script was expected.
    #[error("script is empty")]
    EmptyScript,

    /// Script does not match the expected template.
    #[error("script is not of type {0}")]
    WrongScriptType(&'static str),

    /// Not enough data in script to complete a push operation.
    #[error("not enough data")]
    DataTooSmall,

    /// Push data exceeds maximum allowed size.
    #[error("data too big")]
    DataTooBig,

    /// A push data part exceeds protocol limits.
    #[error("part too big '{0}'")]
    PartTooBig(usize),

    /// Script index is out of range.
    #[error("script index out of range")]
    IndexOutOfRange,

    /// Base58Check checksum does not match.
    #[error("checksum failed")]
    EncodingChecksumFailed,

    /// Invalid DER signature encoding.
    #[error("invalid signature encoding: {0}")]
    InvalidSignatureEncoding(String),

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] btc_primitives::PrimitivesError),
}
