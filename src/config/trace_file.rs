//! JSON trace files
//!
//! A trace file names each captured packet and gives its bytes as a hex
//! string; whitespace inside the string is ignored so dumps can be pasted
//! as-is:
//!
//! ```json
//! {
//!   "identification": "494b0000 17...",
//!   "challenge": "...",
//!   "challenge_response": "...",
//!   "verify": "...",
//!   "verify_response": "..."
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::protocol::{SessionTrace, VerifyRound};

/// Raw contents of a trace file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraceFile {
    pub identification: Option<String>,
    pub challenge: Option<String>,
    pub challenge_response: Option<String>,
    pub verify: Option<String>,
    pub verify_response: Option<String>,
}

impl TraceFile {
    /// Load a trace from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SessionTrace, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// Parse a trace from a JSON string
    pub fn parse(content: &str) -> Result<SessionTrace, ConfigError> {
        let file: TraceFile =
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError {
                line: e.line(),
                message: e.to_string(),
            })?;
        file.into_trace()
    }

    /// Decode every packet, requiring all five
    pub fn into_trace(self) -> Result<SessionTrace, ConfigError> {
        Ok(SessionTrace {
            identification: decode_packet(self.identification, "identification")?,
            challenge: decode_packet(self.challenge, "challenge")?,
            challenge_response: decode_packet(self.challenge_response, "challenge_response")?,
            verify_rounds: vec![VerifyRound {
                set_verify: decode_packet(self.verify, "verify")?,
                response: decode_packet(self.verify_response, "verify_response")?,
            }],
        })
    }
}

fn decode_packet(value: Option<String>, field: &str) -> Result<Vec<u8>, ConfigError> {
    let value = value.ok_or_else(|| ConfigError::MissingField {
        field: field.to_string(),
    })?;

    let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&digits).map_err(|e| ConfigError::InvalidPacket {
        field: field.to_string(),
        message: e.to_string(),
    })
}
