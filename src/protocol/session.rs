//! Per-run session state
//!
//! Everything the handshake derives lives in [`SessionState`]; it is created
//! zeroed when a validation run starts and dropped when the run ends.

use crate::crypto::mac::{DESCRIPTOR_LEN, SALT_LEN};
use crate::crypto::tables::{FIXED_SESSION_KEY_1, FIXED_SESSION_KEY_2};
use crate::crypto::tdes::KEY_LEN;

/// Length of the session nonce
pub const NONCE_LEN: usize = 16;

/// Length of the peer certificate fragment
pub const CERT_LEN: usize = 8;

/// Device-specific keys from the key store
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceKeyPair {
    /// Decrypts the SetChallenge payload
    pub k1: [u8; KEY_LEN],
    /// Authenticates the SetChallenge payload
    pub k2: [u8; KEY_LEN],
}

impl DeviceKeyPair {
    pub fn new(k1: [u8; KEY_LEN], k2: [u8; KEY_LEN]) -> Self {
        Self { k1, k2 }
    }
}

impl std::fmt::Debug for DeviceKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceKeyPair")
            .field("k1", &"<redacted>")
            .field("k2", &"<redacted>")
            .finish()
    }
}

/// Device-independent keys that derive the session nonce keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSessionKeys {
    /// Encrypts the nonce into `random_enc`
    pub nonce_key: [u8; KEY_LEN],
    /// Encrypts the half-swapped nonce into `random_swap_enc`
    pub swapped_nonce_key: [u8; KEY_LEN],
}

impl Default for FixedSessionKeys {
    fn default() -> Self {
        Self {
            nonce_key: FIXED_SESSION_KEY_1,
            swapped_nonce_key: FIXED_SESSION_KEY_2,
        }
    }
}

/// Mutable state threaded through the handshake steps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Session nonce; bytes `0..8` double as the rolling MAC salt
    pub random: [u8; NONCE_LEN],
    /// Peer certificate fragment from SetChallenge
    pub cert: [u8; CERT_LEN],
    /// Nonce under the first fixed key
    pub random_enc: [u8; KEY_LEN],
    /// Half-swapped nonce under the second fixed key
    pub random_swap_enc: [u8; KEY_LEN],
    /// Normalized identification descriptor
    pub descriptor: [u8; DESCRIPTOR_LEN],
    /// Peripheral random from the challenge response
    pub usb_random: [u8; NONCE_LEN],
    /// SHA-1 of the decrypted challenge response, truncated to a key
    pub content_hash: [u8; KEY_LEN],
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rolling salt (first half of the nonce)
    pub fn salt(&self) -> [u8; SALT_LEN] {
        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&self.random[..SALT_LEN]);
        salt
    }

    /// Replace the rolling salt
    pub fn set_salt(&mut self, salt: [u8; SALT_LEN]) {
        self.random[..SALT_LEN].copy_from_slice(&salt);
    }

    /// Second half of the nonce, the key of the verify-round ACR
    pub fn nonce_tail(&self) -> [u8; 8] {
        let mut tail = [0u8; 8];
        tail.copy_from_slice(&self.random[8..]);
        tail
    }

    /// Interchange nonce fields ahead of the first verify round
    ///
    /// Bytes `0..4` take `usb_random[12..16]` and bytes `4..8` take the
    /// nonce's own bytes `12..16`.
    pub fn interchange_nonce(&mut self) {
        self.random[..4].copy_from_slice(&self.usb_random[12..16]);
        self.random.copy_within(12..16, 4);
    }
}

/// Exchange the two 8-byte halves of a nonce
pub fn swap_halves(nonce: &[u8; NONCE_LEN]) -> [u8; NONCE_LEN] {
    let mut out = [0u8; NONCE_LEN];
    out[..8].copy_from_slice(&nonce[8..]);
    out[8..].copy_from_slice(&nonce[..8]);
    out
}
