//! XSM3 handshake validator
//!
//! Replays a captured session step by step, re-deriving every value the
//! peripheral would have produced, and stops at the first inconsistency.
//!
//! ```text
//! Init -> Identified -> Challenged -> ResponseReceived
//!      -> Verified(1) -> ResponseVerified(1) -> Complete
//! ```
//!
//! Any failed check moves the machine to `Failed`, which is terminal.

use std::fmt;

use crate::crypto::mac::{self, MacMode};
use crate::crypto::tdes::{self, CryptMode};
use crate::error::{CryptoError, ProtocolError, Step};
use crate::protocol::messages::{Challenge, ChallengeResponse, Identification, VerifyMessage};
use crate::protocol::session::{
    swap_halves, DeviceKeyPair, FixedSessionKeys, SessionState, CERT_LEN, NONCE_LEN,
};
use crate::protocol::trace::SessionTrace;

/// Position of the validator in the handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    Init,
    Identified,
    Challenged,
    ResponseReceived,
    Verified(u8),
    ResponseVerified(u8),
    Complete,
    Failed(ProtocolError),
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("Init"),
            Self::Identified => f.write_str("Identified"),
            Self::Challenged => f.write_str("Challenged"),
            Self::ResponseReceived => f.write_str("ResponseReceived"),
            Self::Verified(round) => write!(f, "Verified{}", round),
            Self::ResponseVerified(round) => write!(f, "ResponseVerified{}", round),
            Self::Complete => f.write_str("Complete"),
            Self::Failed(_) => f.write_str("Failed"),
        }
    }
}

/// Session values of a successfully validated handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeOutcome {
    /// Nonce after the last verify round
    pub random: [u8; NONCE_LEN],
    /// Peer certificate fragment
    pub cert: [u8; CERT_LEN],
    /// Nonce under the first fixed session key
    pub random_enc: [u8; 16],
    /// Half-swapped nonce under the second fixed session key
    pub random_swap_enc: [u8; 16],
    /// Number of verify rounds replayed
    pub rounds: u8,
}

/// Result of a full replay: the outcome, or the first failed check
pub type Verdict = Result<HandshakeOutcome, ProtocolError>;

/// Replays one captured session against a device key pair
pub struct HandshakeValidator {
    keys: DeviceKeyPair,
    fixed: FixedSessionKeys,
    session: SessionState,
    state: HandshakeState,
    last_step: Option<Step>,
}

impl HandshakeValidator {
    /// Create a validator using the standard fixed session keys
    pub fn new(keys: DeviceKeyPair) -> Self {
        Self::with_fixed_keys(keys, FixedSessionKeys::default())
    }

    pub fn with_fixed_keys(keys: DeviceKeyPair, fixed: FixedSessionKeys) -> Self {
        Self {
            keys,
            fixed,
            session: SessionState::new(),
            state: HandshakeState::Init,
            last_step: None,
        }
    }

    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Replay every message of `trace` and finish the handshake
    pub fn run(mut self, trace: &SessionTrace) -> Verdict {
        self.identify(&trace.identification)?;
        self.challenge(&trace.challenge)?;
        self.challenge_response(&trace.challenge_response)?;

        for (index, round) in trace.verify_rounds.iter().enumerate() {
            let number = u8::try_from(index + 1).unwrap_or(u8::MAX);
            self.set_verify(number, &round.set_verify)?;
            self.verify_response(number, &round.response)?;
        }

        self.finish()
    }

    /// GetIdentification: Init -> Identified
    pub fn identify(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        let step = Step::Identification;
        self.enter(step, &HandshakeState::Init)?;
        let result = self.process_identify(data);
        self.settle(step, result, HandshakeState::Identified)
    }

    /// SetChallenge: Identified -> Challenged
    pub fn challenge(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        let step = Step::Challenge;
        self.enter(step, &HandshakeState::Identified)?;
        let result = self.process_challenge(data);
        self.settle(step, result, HandshakeState::Challenged)
    }

    /// GetResponse to the challenge: Challenged -> ResponseReceived
    pub fn challenge_response(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        let step = Step::ChallengeResponse;
        self.enter(step, &HandshakeState::Challenged)?;
        let result = self.process_challenge_response(data);
        self.settle(step, result, HandshakeState::ResponseReceived)
    }

    /// SetVerify of `round`: ResponseReceived / ResponseVerified(round - 1) -> Verified(round)
    pub fn set_verify(&mut self, round: u8, data: &[u8]) -> Result<(), ProtocolError> {
        let step = Step::Verify(round);
        let required = match round {
            0 | 1 => HandshakeState::ResponseReceived,
            n => HandshakeState::ResponseVerified(n - 1),
        };
        self.enter(step, &required)?;
        let result = match round {
            1 => self.process_set_verify(step, data),
            _ => Err(ProtocolError::UnsupportedRound { step, round }),
        };
        self.settle(step, result, HandshakeState::Verified(round))
    }

    /// GetResponse to SetVerify `round`: Verified(round) -> ResponseVerified(round)
    pub fn verify_response(&mut self, round: u8, data: &[u8]) -> Result<(), ProtocolError> {
        let step = Step::VerifyResponse(round);
        self.enter(step, &HandshakeState::Verified(round))?;
        let result = match round {
            1 => self.process_verify_response(step, data),
            _ => Err(ProtocolError::UnsupportedRound { step, round }),
        };
        self.settle(step, result, HandshakeState::ResponseVerified(round))
    }

    /// ResponseVerified(n) -> Complete
    ///
    /// Before that point the error names the step still outstanding. A
    /// finished handshake is refused without leaving `Complete`.
    pub fn finish(&mut self) -> Verdict {
        let rounds = match &self.state {
            HandshakeState::ResponseVerified(round) => *round,
            HandshakeState::Failed(err) => return Err(err.clone()),
            other => {
                let err = ProtocolError::UnexpectedStep {
                    step: self.pending_step(),
                    state: other.to_string(),
                };
                if *other != HandshakeState::Complete {
                    self.state = HandshakeState::Failed(err.clone());
                }
                return Err(err);
            }
        };

        self.state = HandshakeState::Complete;
        tracing::info!("Handshake complete after {} verify round(s)", rounds);

        Ok(HandshakeOutcome {
            random: self.session.random,
            cert: self.session.cert,
            random_enc: self.session.random_enc,
            random_swap_enc: self.session.random_swap_enc,
            rounds,
        })
    }

    fn enter(&mut self, step: Step, required: &HandshakeState) -> Result<(), ProtocolError> {
        if &self.state != required {
            let err = ProtocolError::UnexpectedStep {
                step,
                state: self.state.to_string(),
            };
            // Terminal states keep their verdict
            if !matches!(self.state, HandshakeState::Failed(_) | HandshakeState::Complete) {
                self.state = HandshakeState::Failed(err.clone());
            }
            return Err(err);
        }

        tracing::info!("{}", step);
        Ok(())
    }

    /// The step the current state is waiting for, or the last one replayed
    /// once the machine has stopped
    fn pending_step(&self) -> Step {
        match &self.state {
            HandshakeState::Init => Step::Identification,
            HandshakeState::Identified => Step::Challenge,
            HandshakeState::Challenged => Step::ChallengeResponse,
            HandshakeState::ResponseReceived => Step::Verify(1),
            HandshakeState::Verified(round) => Step::VerifyResponse(*round),
            HandshakeState::ResponseVerified(round) => Step::Verify(round.saturating_add(1)),
            HandshakeState::Complete => self.last_step.unwrap_or(Step::Identification),
            HandshakeState::Failed(err) => err.step(),
        }
    }

    fn settle(
        &mut self,
        step: Step,
        result: Result<(), ProtocolError>,
        next: HandshakeState,
    ) -> Result<(), ProtocolError> {
        match result {
            Ok(()) => {
                tracing::debug!("{} ok -> {}", step, next);
                self.state = next;
                self.last_step = Some(step);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("{}", err);
                self.state = HandshakeState::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn process_identify(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        let identification = Identification::from_bytes(data)?;
        self.session.descriptor = identification.descriptor;
        tracing::debug!("Descriptor: {:02x?}", &self.session.descriptor);
        Ok(())
    }

    fn process_challenge(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        let step = Step::Challenge;
        let crypto = |source: CryptoError| ProtocolError::Crypto { step, source };

        let challenge = Challenge::from_bytes(data)?;

        let plaintext =
            tdes::authentication_crypt_fixed(&self.keys.k1, &challenge.ciphertext, CryptMode::Decrypt)
                .map_err(crypto)?;
        self.session.random.copy_from_slice(&plaintext[..NONCE_LEN]);
        self.session.cert.copy_from_slice(&plaintext[NONCE_LEN..]);
        tracing::debug!("Random: {:02x?}", &self.session.random);
        tracing::debug!("Cert: {:02x?}", &self.session.cert);

        self.session.random_enc = tdes::authentication_crypt_fixed(
            &self.fixed.nonce_key,
            &self.session.random,
            CryptMode::Encrypt,
        )
        .map_err(crypto)?;

        let swapped = swap_halves(&self.session.random);
        self.session.random_swap_enc = tdes::authentication_crypt_fixed(
            &self.fixed.swapped_nonce_key,
            &swapped,
            CryptMode::Encrypt,
        )
        .map_err(crypto)?;
        tracing::debug!("random_enc: {:02x?}", &self.session.random_enc);
        tracing::debug!("random_swap_enc: {:02x?}", &self.session.random_swap_enc);

        let computed =
            mac::authentication_mac(&self.keys.k2, None, &challenge.ciphertext, MacMode::Generate)
                .map_err(crypto)?;
        tracing::debug!(
            "MAC: computed {:02x?}, received {:02x?}",
            &computed.mac[4..],
            &challenge.mac
        );
        if computed.mac[4..] != challenge.mac {
            return Err(ProtocolError::MacMismatch { step });
        }

        Ok(())
    }

    fn process_challenge_response(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        let step = Step::ChallengeResponse;
        let crypto = |source: CryptoError| ProtocolError::Crypto { step, source };

        let response = ChallengeResponse::from_bytes(data)?;

        let plaintext = tdes::authentication_crypt_fixed(
            &self.session.random_enc,
            &response.ciphertext,
            CryptMode::Decrypt,
        )
        .map_err(crypto)?;
        let mut usb_random = [0u8; NONCE_LEN];
        usb_random.copy_from_slice(&plaintext[..NONCE_LEN]);
        let echoed = &plaintext[NONCE_LEN..];
        tracing::debug!("USB random: {:02x?}", &usb_random);

        let computed = mac::authentication_mac(
            &self.session.random_swap_enc,
            None,
            &response.ciphertext,
            MacMode::Verify,
        )
        .map_err(crypto)?;

        if self.session.random[..] != *echoed {
            tracing::debug!(
                "Random: stored {:02x?}, echoed {:02x?}",
                &self.session.random,
                echoed
            );
            return Err(ProtocolError::NonceMismatch { step });
        }

        let acr = mac::authentication_acr(&computed.mac, &self.session.cert, &self.session.descriptor)
            .map_err(crypto)?;
        tracing::debug!("ACR: computed {:02x?}, received {:02x?}", &acr, &response.acr);
        if acr != response.acr {
            return Err(ProtocolError::AcrMismatch { step });
        }

        self.session.usb_random = usb_random;
        self.session.content_hash = mac::content_hash(&plaintext);
        tracing::debug!("Content hash: {:02x?}", &self.session.content_hash);

        Ok(())
    }

    fn process_set_verify(&mut self, step: Step, data: &[u8]) -> Result<(), ProtocolError> {
        let crypto = |source: CryptoError| ProtocolError::Crypto { step, source };

        self.session.interchange_nonce();

        let verify = VerifyMessage::set_verify(1, data)?;

        let plaintext = tdes::authentication_crypt_fixed(
            &self.session.usb_random,
            &verify.ciphertext,
            CryptMode::Decrypt,
        )
        .map_err(crypto)?;
        self.session.random[8..].copy_from_slice(&plaintext);
        tracing::debug!("Random: {:02x?}", &self.session.random);

        let computed = mac::authentication_mac(
            &self.session.content_hash,
            Some(&self.session.salt()),
            &verify.ciphertext,
            MacMode::Generate,
        )
        .map_err(crypto)?;
        if let Some(salt) = computed.salt {
            self.session.set_salt(salt);
        }

        tracing::debug!("MAC: computed {:02x?}, received {:02x?}", &computed.mac, &verify.mac);
        if computed.mac != verify.mac {
            return Err(ProtocolError::MacMismatch { step });
        }

        Ok(())
    }

    fn process_verify_response(&mut self, step: Step, data: &[u8]) -> Result<(), ProtocolError> {
        let crypto = |source: CryptoError| ProtocolError::Crypto { step, source };

        let response = VerifyMessage::response(1, data)?;

        let expected_acr = tdes::authentication_crypt_fixed(
            &self.session.random_enc,
            &response.ciphertext,
            CryptMode::Decrypt,
        )
        .map_err(crypto)?;

        let computed = mac::authentication_mac(
            &self.session.random_swap_enc,
            Some(&self.session.salt()),
            &response.ciphertext,
            MacMode::Generate,
        )
        .map_err(crypto)?;
        if let Some(salt) = computed.salt {
            self.session.set_salt(salt);
        }

        tracing::debug!("MAC: computed {:02x?}, received {:02x?}", &computed.mac, &response.mac);
        if computed.mac != response.mac {
            return Err(ProtocolError::MacMismatch { step });
        }

        let acr = mac::authentication_acr(
            &self.session.nonce_tail(),
            &self.session.cert,
            &self.session.descriptor,
        )
        .map_err(crypto)?;
        tracing::debug!("ACR: computed {:02x?}, expected {:02x?}", &acr, &expected_acr);
        if acr != expected_acr {
            return Err(ProtocolError::AcrMismatch { step });
        }

        Ok(())
    }
}
