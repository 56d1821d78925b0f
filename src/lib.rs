//! xsm3-replay - XSM3 handshake validator
//!
//! Replays a captured XSM3 authentication session (identification,
//! challenge, challenge response and one verify round) against a device
//! key pair and reports the first message that does not check out.
//!
//! # Usage
//!
//! ```no_run
//! use xsm3_replay::{HandshakeValidator, KeyVault, SessionTrace};
//!
//! fn main() -> xsm3_replay::error::Result<()> {
//!     let keys = KeyVault::from_file("keyvault.bin")?.device_keys();
//!     let outcome = HandshakeValidator::new(keys).run(&SessionTrace::canonical())?;
//!     println!("verified {} round(s)", outcome.rounds);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod protocol;

pub use config::{KeyVault, TraceFile};
pub use error::Xsm3Error;
pub use protocol::{DeviceKeyPair, HandshakeOutcome, HandshakeValidator, SessionTrace};
