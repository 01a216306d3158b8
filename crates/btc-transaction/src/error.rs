/// Error types for transaction serialization and hashing.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The transaction structure is invalid (e.g. an out-of-range input index).
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// An error occurred during binary/hex serialization or deserialization.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// An underlying script error (forwarded from `btc-script`).
    #[error("script error: {0}")]
    Script(#[from] btc_script::ScriptError),
    /// An underlying primitives error (forwarded from `btc-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] btc_primitives::PrimitivesError),
}

/// Error type for the TransactionBuilder surface.
///
/// Each variant is one failure kind; the payload carries the exact
/// message the builder reports, which tests assert on.
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    /// An argument was out of range, unresolvable, or inconsistent with
    /// previously supplied data.
    #[error("{0}")]
    InvalidArgument(String),

    /// A mutation or build was refused in the current builder state.
    #[error("{0}")]
    InvalidState(String),

    /// An outpoint or signature slot was already occupied.
    #[error("{0}")]
    Duplicate(String),

    /// `build` was invoked before every input was fully signed.
    #[error("{0}")]
    Incomplete(String),

    /// The computed fee rate exceeds the builder's ceiling.
    #[error("Transaction has absurd fees")]
    AbsurdFee,

    /// A path intentionally left for future work.
    #[error("{0}")]
    Unimplemented(String),

    /// An underlying script error (forwarded from `btc-script`).
    #[error("script error: {0}")]
    Script(#[from] btc_script::ScriptError),

    /// An underlying transaction error.
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// An underlying primitives error (forwarded from `btc-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] btc_primitives::PrimitivesError),
}
