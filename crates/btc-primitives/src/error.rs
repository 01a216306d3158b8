/// Unified error type for all primitives operations.
///
/// Covers errors from hashing, EC operations, encoding, and serialization.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    /// Invalid private key data.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Invalid public key data.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid signature data.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// EC point is not on the secp256k1 curve.
    #[error("point not on curve")]
    PointNotOnCurve,

    /// Invalid hexadecimal string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Invalid hash value.
    #[error("invalid hash: {0}")]
    InvalidHash(String),

    /// A reader ran out of bytes mid-field.
    #[error("unexpected end of data")]
    UnexpectedEof,
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}

impl From<k256::ecdsa::Error> for PrimitivesError {
    fn from(e: k256::ecdsa::Error) -> Self {
        PrimitivesError::InvalidPublicKey(e.to_string())
    }
}
