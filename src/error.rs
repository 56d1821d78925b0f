//! Error types for the XSM3 replay validator

use std::fmt;

use thiserror::Error;

/// Main error type for xsm3-replay
#[derive(Error, Debug)]
pub enum Xsm3Error {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Cryptographic errors
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Protocol errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// System I/O errors
    #[error("System error: {0}")]
    System(#[from] std::io::Error),
}

/// Key-store and trace-file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid trace format at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Invalid hex key: {field}")]
    InvalidKey { field: String },

    #[error("Key vault too small: {size} bytes")]
    InvalidKeyVault { size: usize },

    #[error("Invalid packet {field}: {message}")]
    InvalidPacket { field: String, message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cryptographic primitive errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid data length: expected a multiple of {expected_multiple}, got {got}")]
    InvalidLength { expected_multiple: usize, got: usize },

    #[error("Invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
}

/// A single message exchange of the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// GetIdentification (peripheral -> host)
    Identification,
    /// SetChallenge (host -> peripheral)
    Challenge,
    /// GetResponse answering the challenge
    ChallengeResponse,
    /// SetVerify of the given round
    Verify(u8),
    /// GetResponse answering the given verify round
    VerifyResponse(u8),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identification => f.write_str("GetIdentification"),
            Self::Challenge => f.write_str("SetChallenge"),
            Self::ChallengeResponse => f.write_str("GetResponseChallenge"),
            Self::Verify(round) => write!(f, "SetVerify{}", round),
            Self::VerifyResponse(round) => write!(f, "GetResponseVerify{}", round),
        }
    }
}

/// Handshake failures
///
/// Every variant is terminal: the trace is fixed, so a mismatch means the
/// keys or the capture are inconsistent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("{step}: checksum mismatch (expected {expected:#04x}, got {got:#04x})")]
    ChecksumMismatch { step: Step, expected: u8, got: u8 },

    #[error("{step}: MAC is wrong")]
    MacMismatch { step: Step },

    #[error("{step}: ACR is wrong")]
    AcrMismatch { step: Step },

    #[error("{step}: random is wrong")]
    NonceMismatch { step: Step },

    #[error("{step}: invalid message length: expected {expected}, got {got}")]
    InvalidMessageLength {
        step: Step,
        expected: usize,
        got: usize,
    },

    #[error("{step}: invalid opcode {opcode:#06x}")]
    InvalidOpcode { step: Step, opcode: u16 },

    #[error("{step} is not valid in state {state}")]
    UnexpectedStep { step: Step, state: String },

    #[error("{step}: verify round {round} is not supported")]
    UnsupportedRound { step: Step, round: u8 },

    #[error("{step}: {source}")]
    Crypto { step: Step, source: CryptoError },
}

impl ProtocolError {
    /// The handshake step that produced this failure
    pub fn step(&self) -> Step {
        match self {
            Self::ChecksumMismatch { step, .. }
            | Self::MacMismatch { step }
            | Self::AcrMismatch { step }
            | Self::NonceMismatch { step }
            | Self::InvalidMessageLength { step, .. }
            | Self::InvalidOpcode { step, .. }
            | Self::UnexpectedStep { step, .. }
            | Self::UnsupportedRound { step, .. }
            | Self::Crypto { step, .. } => *step,
        }
    }
}

impl Xsm3Error {
    /// Get a user-friendly error message with suggested action
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!(
                    "File not found: {}\n  Check the path and try again.",
                    path
                )
            }

            Self::Config(ConfigError::InvalidKey { field }) => {
                format!(
                    "Invalid {}. Expected a 16-byte key as 32 hex digits.",
                    field
                )
            }

            Self::Config(ConfigError::InvalidKeyVault { size }) => {
                format!(
                    "Key vault is {} bytes; expected a decrypted key vault of at least {} bytes.",
                    size,
                    crate::config::KEYVAULT_MIN_SIZE
                )
            }

            Self::Protocol(ProtocolError::MacMismatch {
                step: Step::Challenge,
            }) => "MAC is wrong at SetChallenge.\n  \
                   The device keys probably do not belong to the console that captured this trace."
                .to_string(),

            Self::Protocol(ProtocolError::ChecksumMismatch { step, .. }) => {
                format!(
                    "Checksum mismatch in {}.\n  The captured packet is corrupt.",
                    step
                )
            }

            _ => format!("{}", self),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Protocol(_) => 4,
            Self::Crypto(_) => 5,
            Self::System(_) => 7,
        }
    }
}

/// Result type alias for xsm3-replay operations
pub type Result<T> = std::result::Result<T, Xsm3Error>;
