//! Peripheral simulator for tests
//!
//! Produces internally consistent sessions for arbitrary device keys by
//! running the peripheral's side of the exchange.

use crate::crypto::mac::{self, MacMode};
use crate::crypto::tdes::{self, CryptMode};
use crate::protocol::messages::{self, Opcode, HEADER_LEN};
use crate::protocol::session::{swap_halves, DeviceKeyPair, FixedSessionKeys, SessionState};
use crate::protocol::trace::{SessionTrace, VerifyRound, GET_IDENTIFICATION};

/// Secrets and choices of one simulated session
#[derive(Debug, Clone)]
pub struct Peripheral {
    pub keys: DeviceKeyPair,
    pub nonce: [u8; 16],
    pub cert: [u8; 8],
    pub usb_random: [u8; 16],
    pub verify_plaintext: [u8; 8],
    /// Encrypt a wrong ACR into the last response
    pub corrupt_final_acr: bool,
}

/// A simulated session and the values the validator should arrive at
#[derive(Debug, Clone)]
pub struct SimulatedSession {
    pub trace: SessionTrace,
    pub random_enc: [u8; 16],
    pub random_swap_enc: [u8; 16],
    pub final_random: [u8; 16],
}

impl Peripheral {
    pub fn sample() -> Self {
        Self {
            keys: DeviceKeyPair::new(
                core::array::from_fn(|i| 0x10 + i as u8),
                core::array::from_fn(|i| 0xA0 ^ (i as u8 * 7)),
            ),
            nonce: core::array::from_fn(|i| (i as u8).wrapping_mul(0x1D) ^ 0x5A),
            cert: [0xC0, 0xFF, 0xEE, 0x01, 0x23, 0x45, 0x67, 0x89],
            usb_random: core::array::from_fn(|i| 0xF0 - i as u8),
            verify_plaintext: [0x31, 0x41, 0x59, 0x26, 0x53, 0x58, 0x97, 0x93],
            corrupt_final_acr: false,
        }
    }

    pub fn simulate(&self) -> SimulatedSession {
        let fixed = FixedSessionKeys::default();
        let mut state = SessionState::new();
        state.descriptor = messages::normalize_identification(&GET_IDENTIFICATION).unwrap();
        state.random = self.nonce;
        state.cert = self.cert;
        state.usb_random = self.usb_random;

        // SetChallenge
        let mut plaintext = [0u8; 24];
        plaintext[..16].copy_from_slice(&self.nonce);
        plaintext[16..].copy_from_slice(&self.cert);
        let ciphertext =
            tdes::authentication_crypt_fixed(&self.keys.k1, &plaintext, CryptMode::Encrypt).unwrap();
        let mac = mac::authentication_mac(&self.keys.k2, None, &ciphertext, MacMode::Generate)
            .unwrap()
            .mac;
        let challenge = messages::seal(Opcode::SetChallenge, &[&ciphertext[..], &mac[4..]].concat());

        state.random_enc =
            tdes::authentication_crypt_fixed(&fixed.nonce_key, &self.nonce, CryptMode::Encrypt)
                .unwrap();
        state.random_swap_enc = tdes::authentication_crypt_fixed(
            &fixed.swapped_nonce_key,
            &swap_halves(&self.nonce),
            CryptMode::Encrypt,
        )
        .unwrap();

        // GetResponse to the challenge
        let mut plaintext = [0u8; 32];
        plaintext[..16].copy_from_slice(&self.usb_random);
        plaintext[16..].copy_from_slice(&self.nonce);
        let ciphertext =
            tdes::authentication_crypt_fixed(&state.random_enc, &plaintext, CryptMode::Encrypt)
                .unwrap();
        let acr_key = mac::authentication_mac(&state.random_swap_enc, None, &ciphertext, MacMode::Verify)
            .unwrap()
            .mac;
        let acr = mac::authentication_acr(&acr_key, &self.cert, &state.descriptor).unwrap();
        let challenge_response =
            messages::seal(Opcode::GetResponse, &[&ciphertext[..], &acr[..]].concat());
        state.content_hash = mac::content_hash(&plaintext);

        // SetVerify
        state.interchange_nonce();
        let ciphertext = tdes::authentication_crypt_fixed(
            &self.usb_random,
            &self.verify_plaintext,
            CryptMode::Encrypt,
        )
        .unwrap();
        state.random[8..].copy_from_slice(&self.verify_plaintext);
        let result = mac::authentication_mac(
            &state.content_hash,
            Some(&state.salt()),
            &ciphertext,
            MacMode::Generate,
        )
        .unwrap();
        state.set_salt(result.salt.unwrap());
        let set_verify = messages::seal(Opcode::SetVerify, &[&ciphertext[..], &result.mac[..]].concat());

        // GetResponse to SetVerify
        let mut acr =
            mac::authentication_acr(&state.nonce_tail(), &self.cert, &state.descriptor).unwrap();
        if self.corrupt_final_acr {
            acr[0] ^= 0x01;
        }
        let ciphertext =
            tdes::authentication_crypt_fixed(&state.random_enc, &acr, CryptMode::Encrypt).unwrap();
        let result = mac::authentication_mac(
            &state.random_swap_enc,
            Some(&state.salt()),
            &ciphertext,
            MacMode::Generate,
        )
        .unwrap();
        state.set_salt(result.salt.unwrap());
        let response = messages::seal(Opcode::GetResponse, &[&ciphertext[..], &result.mac[..]].concat());

        SimulatedSession {
            trace: SessionTrace {
                identification: GET_IDENTIFICATION.to_vec(),
                challenge,
                challenge_response,
                verify_rounds: vec![VerifyRound {
                    set_verify,
                    response,
                }],
            },
            random_enc: state.random_enc,
            random_swap_enc: state.random_swap_enc,
            final_random: state.random,
        }
    }
}

/// Recompute the trailing checksum after editing a payload
pub fn reseal(packet: &mut [u8]) {
    let end = packet.len() - 1;
    packet[end] = messages::xor_fold(&packet[HEADER_LEN..end]);
}
