//! Captured XSM3 session
//!
//! The five messages of one identification, challenge and first verify
//! exchange, as recorded on the wire.

use crate::error::Step;

/// GetIdentification from the peripheral
pub const GET_IDENTIFICATION: [u8; 29] = [
    0x49, 0x4B, 0x00, 0x00, 0x17, 0x04, 0xE1, 0x11,
    0x54, 0x15, 0xED, 0x88, 0x55, 0x21, 0x01, 0x33,
    0x00, 0x00, 0x80, 0x02, 0x5E, 0x04, 0x8E, 0x02,
    0x03, 0x00, 0x01, 0x01, 0xC1,
];

/// SetChallenge from the host
pub const SET_CHALLENGE: [u8; 34] = [
    0x09, 0x40, 0x00, 0x00, 0x1C, 0x0A, 0x0F, 0x6B,
    0x0B, 0xA1, 0x18, 0x26, 0x5F, 0x83, 0x3C, 0x45,
    0x13, 0x49, 0x53, 0xBD, 0x18, 0x61, 0x73, 0xCF,
    0x29, 0xDE, 0x2C, 0xD8, 0x66, 0xE4, 0xAE, 0x34,
    0xA9, 0x9C,
];

/// GetResponse answering the challenge
pub const GET_RESPONSE_CHALLENGE: [u8; 46] = [
    0x49, 0x4C, 0x00, 0x00, 0x28, 0x81, 0xBD, 0x7C,
    0xB3, 0x70, 0xBD, 0x76, 0x1A, 0x2F, 0x28, 0x6E,
    0xD1, 0xF2, 0xC3, 0x8E, 0xF9, 0x0B, 0xB2, 0x83,
    0x49, 0xCB, 0x4B, 0x24, 0xA2, 0x90, 0x6C, 0x27,
    0xB1, 0x05, 0x0A, 0xB0, 0x47, 0x09, 0x75, 0x16,
    0x07, 0xE1, 0xD7, 0xE8, 0xAF, 0x57,
];

/// SetVerify, round 1
pub const SET_VERIFY: [u8; 22] = [
    0x09, 0x41, 0x00, 0x00, 0x10, 0x5A, 0xDD, 0x1B,
    0xA0, 0x74, 0x87, 0xB7, 0x62, 0xB7, 0xA5, 0x8F,
    0x34, 0xFF, 0xE3, 0xD1, 0xD9, 0xA7,
];

/// GetResponse answering verify round 1
pub const GET_RESPONSE_VERIFY: [u8; 22] = [
    0x49, 0x4C, 0x00, 0x00, 0x10, 0x5A, 0x9C, 0xD6,
    0x72, 0xB3, 0x70, 0x8D, 0xA7, 0x57, 0x01, 0x06,
    0x50, 0x20, 0x60, 0xA9, 0xBC, 0xDE,
];

/// One verify round: the host's SetVerify and the peripheral's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRound {
    pub set_verify: Vec<u8>,
    pub response: Vec<u8>,
}

/// The messages of one handshake, in wire order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTrace {
    pub identification: Vec<u8>,
    pub challenge: Vec<u8>,
    pub challenge_response: Vec<u8>,
    pub verify_rounds: Vec<VerifyRound>,
}

impl SessionTrace {
    /// The built-in capture
    pub fn canonical() -> Self {
        Self {
            identification: GET_IDENTIFICATION.to_vec(),
            challenge: SET_CHALLENGE.to_vec(),
            challenge_response: GET_RESPONSE_CHALLENGE.to_vec(),
            verify_rounds: vec![VerifyRound {
                set_verify: SET_VERIFY.to_vec(),
                response: GET_RESPONSE_VERIFY.to_vec(),
            }],
        }
    }

    /// Every message with the step it belongs to
    pub fn messages(&self) -> Vec<(Step, &[u8])> {
        let mut out = vec![
            (Step::Identification, self.identification.as_slice()),
            (Step::Challenge, self.challenge.as_slice()),
            (Step::ChallengeResponse, self.challenge_response.as_slice()),
        ];
        for (index, round) in self.verify_rounds.iter().enumerate() {
            let number = index as u8 + 1;
            out.push((Step::Verify(number), round.set_verify.as_slice()));
            out.push((Step::VerifyResponse(number), round.response.as_slice()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_messages() {
        let trace = SessionTrace::canonical();
        let messages = trace.messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].0, Step::Identification);
        assert_eq!(messages[4].0, Step::VerifyResponse(1));
        assert_eq!(messages[3].1, &SET_VERIFY[..]);
    }
}
