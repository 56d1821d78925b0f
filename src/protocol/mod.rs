//! XSM3 protocol implementation
//!
//! This module contains the handshake replay components:
//! - Message wire formats and checksums
//! - The captured reference session
//! - Per-run session state
//! - Handshake validation state machine

pub mod handshake;
pub mod messages;
pub mod session;
pub mod trace;

#[cfg(test)]
pub(crate) mod testing;

pub use handshake::{HandshakeOutcome, HandshakeState, HandshakeValidator, Verdict};
pub use messages::{Challenge, ChallengeResponse, Identification, Opcode, Packet, VerifyMessage};
pub use session::{DeviceKeyPair, FixedSessionKeys, SessionState};
pub use trace::{SessionTrace, VerifyRound};
