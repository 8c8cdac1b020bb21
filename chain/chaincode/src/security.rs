//! Shared security primitives for chaincode operations
//!
//! Provides the pluggable administrator check and the write lock that
//! serialises read-modify-write cycles on the will replicas.

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use crate::config::ChaincodeConfig;

/// Administrator credential check.
///
/// Implementations decide whether a `(name, password)` pair grants
/// administrator rights. The lifecycle only consumes the yes/no answer.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, name: &str, password: &str) -> bool;
}

/// Plaintext administrator pair compared by exact, case-sensitive equality.
#[derive(Clone)]
pub struct StaticCredentials {
    name: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }

    /// Use the administrator pair from configuration.
    pub fn from_config(config: &ChaincodeConfig) -> Self {
        Self::new(config.admin_name.clone(), config.admin_password.clone())
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, name: &str, password: &str) -> bool {
        name == self.name && password == self.password
    }
}

/// Write lock over the will replica keys.
///
/// Held for a full read-modify-write so two requests in this process cannot
/// interleave their dual writes. The lock guards no data, so a poisoned lock
/// is simply re-entered.
#[derive(Debug, Default)]
pub struct DocumentLock {
    inner: Mutex<()>,
}

impl DocumentLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock is held.
    pub fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check if currently held by someone.
    pub fn is_locked(&self) -> bool {
        matches!(self.inner.try_lock(), Err(TryLockError::WouldBlock))
    }
}
