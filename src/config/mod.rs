//! Inputs for a validation run
//!
//! This module loads device keys (from a decrypted key vault or hex strings)
//! and captured traces stored as JSON.

mod keyvault;
mod trace_file;

pub use keyvault::{parse_hex_key, KeyVault};
pub use trace_file::TraceFile;

/// Smallest decrypted key vault that holds both device keys
pub const KEYVAULT_MIN_SIZE: usize = 0x158;

/// Offset of the challenge decryption key in the key vault
pub const KEYVAULT_K1_OFFSET: usize = 0x138;

/// Offset of the challenge MAC key in the key vault
pub const KEYVAULT_K2_OFFSET: usize = 0x148;
