//! Chaincode error types
//!
//! Store failures, codec failures and lifecycle policy outcomes are folded
//! into `ChaincodeError`; `ErrorKind` gives callers a flat classification.

use thiserror::Error;
use will_types::errors::CodecError;

/// Errors raised by a `KvStore` implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Failed to read state for {key}: {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write state for {key}: {reason}")]
    Write { key: String, reason: String },
}

/// Flat classification of every chaincode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgumentCount,
    NotFound,
    DecodeError,
    StorageError,
    PartialWriteError,
    Unauthorized,
    AlreadyUnlocked,
    UnknownOperation,
    ConcurrentModification,
    ReservedKey,
}

/// Top-level chaincode error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChaincodeError {
    #[error("Incorrect number of arguments for {operation}: expecting {expected}, got {actual}")]
    InvalidArgumentCount {
        operation: String,
        expected: usize,
        actual: usize,
    },

    #[error("No state found for key {key}")]
    NotFound { key: String },

    #[error("Will not found: {will_id}")]
    WillNotFound { will_id: String },

    #[error("Decode error: {0}")]
    Decode(#[from] CodecError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error(
        "Partial write: {written} updated but {failed} failed after {attempts} attempts: {reason}"
    )]
    PartialWrite {
        written: String,
        failed: String,
        attempts: u32,
        reason: String,
    },

    #[error("Unauthorized: invalid administrator credentials")]
    Unauthorized,

    #[error("Will already unlocked: {will_id}")]
    AlreadyUnlocked { will_id: String },

    #[error("Received unknown function: {function}")]
    UnknownOperation { function: String },

    #[error("Concurrent modification of {key}: gave up after {attempts} attempts")]
    ConcurrentModification { key: String, attempts: u32 },

    #[error("Key {key} is reserved for the will replicas")]
    ReservedKey { key: String },
}

impl ChaincodeError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChaincodeError::InvalidArgumentCount { .. } => ErrorKind::InvalidArgumentCount,
            ChaincodeError::NotFound { .. } | ChaincodeError::WillNotFound { .. } => {
                ErrorKind::NotFound
            }
            ChaincodeError::Decode(_) => ErrorKind::DecodeError,
            ChaincodeError::Storage(_) => ErrorKind::StorageError,
            ChaincodeError::PartialWrite { .. } => ErrorKind::PartialWriteError,
            ChaincodeError::Unauthorized => ErrorKind::Unauthorized,
            ChaincodeError::AlreadyUnlocked { .. } => ErrorKind::AlreadyUnlocked,
            ChaincodeError::UnknownOperation { .. } => ErrorKind::UnknownOperation,
            ChaincodeError::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            ChaincodeError::ReservedKey { .. } => ErrorKind::ReservedKey,
        }
    }

    /// True when the two will replicas may now differ.
    pub fn is_replica_divergence(&self) -> bool {
        matches!(self, ChaincodeError::PartialWrite { .. })
    }
}
