/// BTC SDK - Transaction building, signing, and serialization.
///
/// Provides the segwit-aware Transaction type, legacy and BIP-143
/// signature hash computation, WIF key pairs, and the staged
/// TransactionBuilder with signature-preserving mutation rules.

pub mod builder;
pub mod input;
pub mod keypair;
pub mod output;
pub mod sighash;
pub mod transaction;

mod error;
pub use builder::{OutPointRef, SignOptions, TransactionBuilder};
pub use error::{BuilderError, TransactionError};
pub use input::TransactionInput;
pub use keypair::KeyPair;
pub use output::TransactionOutput;
pub use transaction::Transaction;
