//! Dual-write across the register and department replicas
//!
//! The store has no cross-key transaction, so a replicated write is two
//! sequential puts: register first, department second. A failure on the
//! first put leaves both replicas untouched and is a plain storage error. A
//! failure on the second put is retried a bounded number of times and, if it
//! still fails, is reported as a partial write because the replicas now
//! differ.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use will_types::codec::document_digest;

use crate::errors::ChaincodeError;
use crate::store::KvStore;

/// The two keys holding copies of the will document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicaPair<'a> {
    pub register: &'a str,
    pub department: &'a str,
}

/// Consistency of the two replicas as observed by a single read of each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReplicaStatus {
    /// Neither key holds a value.
    Empty,
    /// Both keys hold identical bytes.
    Consistent { digest: [u8; 32] },
    /// The keys differ; `None` marks a missing replica.
    Diverged {
        register: Option<[u8; 32]>,
        department: Option<[u8; 32]>,
    },
}

impl ReplicaStatus {
    pub fn is_consistent(&self) -> bool {
        !matches!(self, ReplicaStatus::Diverged { .. })
    }
}

/// Write `bytes` to both replicas.
///
/// `retries` is the number of extra attempts granted to the department write.
pub fn dual_write<S: KvStore + ?Sized>(
    store: &S,
    pair: ReplicaPair<'_>,
    bytes: &[u8],
    retries: u32,
) -> Result<(), ChaincodeError> {
    store.put(pair.register, bytes)?;
    debug!(key = pair.register, "Register replica written");

    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match store.put(pair.department, bytes) {
            Ok(()) => {
                if attempts > 1 {
                    warn!(
                        key = pair.department,
                        attempts, "Department replica written after retry"
                    );
                }
                return Ok(());
            }
            Err(err) if attempts <= retries => {
                warn!(
                    key = pair.department,
                    attempt = attempts,
                    error = %err,
                    "Department replica write failed, retrying"
                );
            }
            Err(err) => {
                error!(
                    written = pair.register,
                    failed = pair.department,
                    attempts,
                    error = %err,
                    "Replica divergence: department write abandoned"
                );
                return Err(ChaincodeError::PartialWrite {
                    written: pair.register.to_string(),
                    failed: pair.department.to_string(),
                    attempts,
                    reason: err.to_string(),
                });
            }
        }
    }
}

/// Read both replicas and compare them.
pub fn check_replicas<S: KvStore + ?Sized>(
    store: &S,
    pair: ReplicaPair<'_>,
) -> Result<ReplicaStatus, ChaincodeError> {
    let register = store.get(pair.register)?;
    let department = store.get(pair.department)?;

    let status = match (register, department) {
        (None, None) => ReplicaStatus::Empty,
        (Some(r), Some(d)) if r == d => ReplicaStatus::Consistent {
            digest: document_digest(&r),
        },
        (r, d) => ReplicaStatus::Diverged {
            register: r.as_deref().map(document_digest),
            department: d.as_deref().map(document_digest),
        },
    };
    Ok(status)
}
