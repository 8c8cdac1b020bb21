//! Error types for the record codec
//!
//! Decoding failures are split by cause so callers can tell foreign bytes
//! apart from a record of the wrong kind sitting at the requested key.

use thiserror::Error;

use crate::records::RecordKind;

/// Codec-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("Malformed record: {reason}")]
    Malformed { reason: String },

    #[error("Missing record kind discriminator")]
    MissingKind,

    #[error("Wrong record kind: expected {expected}, found {found}")]
    WrongKind { expected: RecordKind, found: String },

    #[error("Encoding failed: {reason}")]
    Encode { reason: String },
}

impl CodecError {
    pub(crate) fn malformed(err: serde_json::Error) -> Self {
        Self::Malformed {
            reason: err.to_string(),
        }
    }
}
