
#![allow(
    clippy::collapsible_if,
    clippy::manual_range_contains,
    clippy::new_without_default,
    clippy::question_mark
)]

//! BTC SDK - Script parsing, classification, and address handling.
//!
//! Provides the Bitcoin Script type, opcode definitions, script chunk
//! parsing, output-script templates, signature encoding, and network-aware
//! address generation/validation (Base58Check and bech32 segwit v0).

pub mod address;
pub mod chunk;
pub mod opcodes;
pub mod script;
pub mod signature;
pub mod templates;

mod error;
pub use address::{Address, AddressPayload, Network};
pub use chunk::ScriptChunk;
pub use error::ScriptError;
pub use script::{Script, ScriptType};
