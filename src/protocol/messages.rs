//! XSM3 message wire formats
//!
//! Every message is framed the same way:
//!
//! ```text
//! opcode(2, BE) | parameter(2) | length(1) | payload(length) | checksum(1)
//! ```
//!
//! where `checksum` is the XOR of all payload bytes. Payload layouts:
//! - GetIdentification: descriptor(15) | fields(8)
//! - SetChallenge: ciphertext(24) | mac(4)
//! - GetResponse (challenge): ciphertext(32) | acr(8)
//! - SetVerify / GetResponse (verify): ciphertext(8) | mac(8)

use crate::crypto::mac::DESCRIPTOR_LEN;
use crate::error::{ProtocolError, Step};

/// Bytes preceding the payload
pub const HEADER_LEN: usize = 5;

/// Offset of the length byte
const LENGTH_OFFSET: usize = 4;

/// XSM3 opcodes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    GetIdentification = 0x494B,
    GetResponse = 0x494C,
    SetChallenge = 0x0940,
    SetVerify = 0x0941,
}

impl TryFrom<u16> for Opcode {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x494B => Ok(Self::GetIdentification),
            0x494C => Ok(Self::GetResponse),
            0x0940 => Ok(Self::SetChallenge),
            0x0941 => Ok(Self::SetVerify),
            other => Err(other),
        }
    }
}

/// A framed message, borrowed from the capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    pub opcode: u16,
    pub parameter: u16,
    pub payload: &'a [u8],
    pub checksum: u8,
}

impl<'a> Packet<'a> {
    /// Split a message into its fields without checking the checksum
    pub fn parse(step: Step, data: &'a [u8]) -> Result<Self, ProtocolError> {
        if data.len() <= LENGTH_OFFSET {
            return Err(ProtocolError::InvalidMessageLength {
                step,
                expected: HEADER_LEN + 1,
                got: data.len(),
            });
        }

        let length = data[LENGTH_OFFSET] as usize;
        let total = HEADER_LEN + length + 1;
        if data.len() < total {
            return Err(ProtocolError::InvalidMessageLength {
                step,
                expected: total,
                got: data.len(),
            });
        }

        Ok(Self {
            opcode: u16::from_be_bytes([data[0], data[1]]),
            parameter: u16::from_be_bytes([data[2], data[3]]),
            payload: &data[HEADER_LEN..HEADER_LEN + length],
            checksum: data[HEADER_LEN + length],
        })
    }

    /// XOR-fold of the payload
    pub fn computed_checksum(&self) -> u8 {
        xor_fold(self.payload)
    }

    /// Check the trailing byte against the payload
    pub fn verify_checksum(&self, step: Step) -> Result<(), ProtocolError> {
        let expected = self.computed_checksum();
        if expected != self.checksum {
            return Err(ProtocolError::ChecksumMismatch {
                step,
                expected,
                got: self.checksum,
            });
        }
        Ok(())
    }

    /// Require a specific opcode and payload length
    fn expect(&self, step: Step, opcode: Opcode, payload_len: usize) -> Result<(), ProtocolError> {
        if self.opcode != opcode as u16 {
            return Err(ProtocolError::InvalidOpcode {
                step,
                opcode: self.opcode,
            });
        }
        if self.payload.len() != payload_len {
            return Err(ProtocolError::InvalidMessageLength {
                step,
                expected: payload_len,
                got: self.payload.len(),
            });
        }
        Ok(())
    }

    /// Parse, verify the checksum, then check opcode and payload length
    fn open(
        step: Step,
        data: &'a [u8],
        opcode: Opcode,
        payload_len: usize,
    ) -> Result<Self, ProtocolError> {
        let packet = Self::parse(step, data)?;
        packet.verify_checksum(step)?;
        packet.expect(step, opcode, payload_len)?;
        Ok(packet)
    }
}

/// XOR of all bytes
pub fn xor_fold(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Verify the checksum of a raw message
pub fn verify_checksum(step: Step, data: &[u8]) -> Result<(), ProtocolError> {
    Packet::parse(step, data)?.verify_checksum(step)
}

/// Frame a payload: header, payload and checksum
///
/// Panics if the payload does not fit the one-byte length field.
#[cfg(test)]
pub fn seal(opcode: Opcode, payload: &[u8]) -> Vec<u8> {
    let length = u8::try_from(payload.len()).expect("payload longer than 255 bytes");

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len() + 1);
    buf.extend_from_slice(&(opcode as u16).to_be_bytes());
    buf.extend_from_slice(&[0, 0]); // parameter
    buf.push(length);
    buf.extend_from_slice(payload);
    buf.push(xor_fold(payload));
    buf
}

/// GetIdentification (23-byte payload)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    /// Normalized 32-byte descriptor bound into every ACR
    pub descriptor: [u8; DESCRIPTOR_LEN],
}

impl Identification {
    pub const PAYLOAD_LEN: usize = 23;

    /// Verbatim descriptor bytes at the start of the payload
    const PREFIX_LEN: usize = 15;

    pub fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        let packet = Packet::open(
            Step::Identification,
            data,
            Opcode::GetIdentification,
            Self::PAYLOAD_LEN,
        )?;
        Ok(Self {
            descriptor: Self::normalize(packet.payload),
        })
    }

    /// Re-pack the trailing fields from `(u16, u16, u8, u16, u8)` to
    /// `(u16, u16, u8, u8, u16)`, swapping the last two
    fn normalize(payload: &[u8]) -> [u8; DESCRIPTOR_LEN] {
        let mut out = [0u8; DESCRIPTOR_LEN];
        out[..Self::PREFIX_LEN].copy_from_slice(&payload[..Self::PREFIX_LEN]);

        let fields = &payload[Self::PREFIX_LEN..];
        let vendor = [fields[0], fields[1]];
        let product = [fields[2], fields[3]];
        let kind = fields[4];
        let version = [fields[5], fields[6]];
        let flags = fields[7];

        out[16..18].copy_from_slice(&vendor);
        out[18..20].copy_from_slice(&product);
        out[20] = kind;
        out[21] = flags;
        out[22..24].copy_from_slice(&version);
        out
    }
}

/// Normalize a GetIdentification message into its 32-byte descriptor
///
/// Only the length is checked; the checksum is the caller's concern.
pub fn normalize_identification(data: &[u8]) -> Result<[u8; DESCRIPTOR_LEN], ProtocolError> {
    let packet = Packet::parse(Step::Identification, data)?;
    if packet.payload.len() < Identification::PAYLOAD_LEN {
        return Err(ProtocolError::InvalidMessageLength {
            step: Step::Identification,
            expected: Identification::PAYLOAD_LEN,
            got: packet.payload.len(),
        });
    }
    Ok(Identification::normalize(packet.payload))
}

/// SetChallenge (28-byte payload)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Nonce (16) and certificate fragment (8) under the device key
    pub ciphertext: [u8; 24],
    /// Low half of the MAC over `ciphertext`
    pub mac: [u8; 4],
}

impl Challenge {
    pub const PAYLOAD_LEN: usize = 28;

    pub fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        let packet = Packet::open(Step::Challenge, data, Opcode::SetChallenge, Self::PAYLOAD_LEN)?;

        let mut ciphertext = [0u8; 24];
        ciphertext.copy_from_slice(&packet.payload[..24]);
        let mut mac = [0u8; 4];
        mac.copy_from_slice(&packet.payload[24..28]);

        Ok(Self { ciphertext, mac })
    }
}

/// GetResponse answering the challenge (40-byte payload)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeResponse {
    /// Peripheral random (16) and echoed nonce (16)
    pub ciphertext: [u8; 32],
    pub acr: [u8; 8],
}

impl ChallengeResponse {
    pub const PAYLOAD_LEN: usize = 40;

    pub fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        let packet = Packet::open(
            Step::ChallengeResponse,
            data,
            Opcode::GetResponse,
            Self::PAYLOAD_LEN,
        )?;

        let mut ciphertext = [0u8; 32];
        ciphertext.copy_from_slice(&packet.payload[..32]);
        let mut acr = [0u8; 8];
        acr.copy_from_slice(&packet.payload[32..40]);

        Ok(Self { ciphertext, acr })
    }
}

/// SetVerify or the GetResponse answering it (16-byte payload)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyMessage {
    pub ciphertext: [u8; 8],
    pub mac: [u8; 8],
}

impl VerifyMessage {
    pub const PAYLOAD_LEN: usize = 16;

    /// Parse a host-to-peripheral SetVerify
    pub fn set_verify(round: u8, data: &[u8]) -> Result<Self, ProtocolError> {
        Self::from_bytes(Step::Verify(round), Opcode::SetVerify, data)
    }

    /// Parse the peripheral's GetResponse to a verify round
    pub fn response(round: u8, data: &[u8]) -> Result<Self, ProtocolError> {
        Self::from_bytes(Step::VerifyResponse(round), Opcode::GetResponse, data)
    }

    fn from_bytes(step: Step, opcode: Opcode, data: &[u8]) -> Result<Self, ProtocolError> {
        let packet = Packet::open(step, data, opcode, Self::PAYLOAD_LEN)?;

        let mut ciphertext = [0u8; 8];
        ciphertext.copy_from_slice(&packet.payload[..8]);
        let mut mac = [0u8; 8];
        mac.copy_from_slice(&packet.payload[8..16]);

        Ok(Self { ciphertext, mac })
    }
}
