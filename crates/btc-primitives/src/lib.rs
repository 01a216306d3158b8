
#![allow(
    clippy::manual_range_contains,
    clippy::new_without_default,
    clippy::question_mark
)]

//! BTC SDK - Cryptographic and serialization primitives.
//!
//! Provides the hash functions, secp256k1 key and signature types, the
//! chain hash (txid) type, and the binary reader/writer utilities used by
//! the script and transaction crates.

pub mod chainhash;
pub mod ec;
pub mod hash;
pub mod util;

mod error;
pub use error::PrimitivesError;
