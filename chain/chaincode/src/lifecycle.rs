//! Will document lifecycle
//!
//! Owns the single will document replicated at the register and department
//! keys. State machine: `Locked` (initial) -> `Unlocked` (terminal), the only
//! transition being an administrator unlock with a matching will id.
//!
//! Every write to the replica keys goes through `dual_write` while holding the
//! `DocumentLock`, so requests in this process never interleave their
//! read-modify-write cycles. The unlock also re-reads the register right
//! before writing and starts over if another writer changed it in between.

use std::sync::Arc;

use tracing::{debug, info, warn};
use will_types::codec::{decode, document_digest, encode};
use will_types::records::WillDocument;

use crate::config::ChaincodeConfig;
use crate::errors::ChaincodeError;
use crate::events::{LedgerEvent, ReplicasRepaired, ReplicasSeeded, WillCreated, WillUnlocked};
use crate::replica::{check_replicas, dual_write, ReplicaPair, ReplicaStatus};
use crate::security::{CredentialVerifier, DocumentLock, StaticCredentials};
use crate::store::KvStore;

/// Creates, unlocks and maintains the replicated will document.
pub struct WillLifecycle<S: KvStore> {
    store: Arc<S>,
    config: Arc<ChaincodeConfig>,
    verifier: Box<dyn CredentialVerifier>,
    lock: DocumentLock,
}

impl<S: KvStore> WillLifecycle<S> {
    /// Lifecycle checking the administrator pair from configuration.
    pub fn new(store: Arc<S>, config: Arc<ChaincodeConfig>) -> Self {
        let verifier = StaticCredentials::from_config(&config);
        Self::with_verifier(store, config, Box::new(verifier))
    }

    /// Lifecycle with a custom administrator check.
    pub fn with_verifier(
        store: Arc<S>,
        config: Arc<ChaincodeConfig>,
        verifier: Box<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            store,
            config,
            verifier,
            lock: DocumentLock::new(),
        }
    }

    fn pair(&self) -> ReplicaPair<'_> {
        ReplicaPair {
            register: &self.config.register_key,
            department: &self.config.department_key,
        }
    }

    fn authorize(&self, admin_name: &str, admin_password: &str) -> Result<(), ChaincodeError> {
        if !self.verifier.verify(admin_name, admin_password) {
            warn!(admin = admin_name, "Rejected administrator credentials");
            return Err(ChaincodeError::Unauthorized);
        }
        Ok(())
    }

    // ───────────────────────── Replica writes ─────────────────────────

    /// Write a raw seed value to both replicas.
    pub fn seed(&self, value: &[u8]) -> Result<LedgerEvent, ChaincodeError> {
        let _guard = self.lock.acquire();
        dual_write(
            &*self.store,
            self.pair(),
            value,
            self.config.replica_write_retries,
        )?;

        info!(bytes = value.len(), "Replicas seeded");
        Ok(LedgerEvent::ReplicasSeeded(ReplicasSeeded {
            digest: document_digest(value),
        }))
    }

    /// Create a locked will document on both replicas.
    ///
    /// Replaces whatever document the replicas held before.
    pub fn create_document(
        &self,
        id: &str,
        visible_info: &str,
        hidden_info: &str,
    ) -> Result<LedgerEvent, ChaincodeError> {
        let document = WillDocument::new(id, visible_info, hidden_info);
        let bytes = encode(&document)?;

        let _guard = self.lock.acquire();
        dual_write(
            &*self.store,
            self.pair(),
            &bytes,
            self.config.replica_write_retries,
        )?;

        info!(will_id = id, "Will document created");
        Ok(LedgerEvent::WillCreated(WillCreated {
            will_id: document.id,
            digest: document_digest(&bytes),
        }))
    }

    /// Unlock the will document on both replicas.
    ///
    /// Credentials are checked before any state is read. The document must
    /// carry `will_id` and be locked; otherwise nothing is written.
    pub fn unlock_by_admin(
        &self,
        will_id: &str,
        admin_name: &str,
        admin_password: &str,
    ) -> Result<LedgerEvent, ChaincodeError> {
        self.authorize(admin_name, admin_password)?;

        let _guard = self.lock.acquire();
        let pair = self.pair();
        let max_attempts = self.config.conflict_retries.saturating_add(1);

        for attempt in 1..=max_attempts {
            let observed = self.load_register()?;
            let mut document: WillDocument = decode(&observed)?;

            if document.id != will_id {
                return Err(ChaincodeError::WillNotFound {
                    will_id: will_id.to_string(),
                });
            }
            if !document.unlock() {
                return Err(ChaincodeError::AlreadyUnlocked {
                    will_id: will_id.to_string(),
                });
            }
            let bytes = encode(&document)?;

            if self.store.get(pair.register)?.as_deref() != Some(observed.as_slice()) {
                warn!(
                    key = pair.register,
                    attempt, "Register changed during unlock, retrying"
                );
                continue;
            }

            dual_write(
                &*self.store,
                pair,
                &bytes,
                self.config.replica_write_retries,
            )?;

            info!(will_id, admin = admin_name, "Will document unlocked");
            return Ok(LedgerEvent::WillUnlocked(WillUnlocked {
                will_id: will_id.to_string(),
                admin: admin_name.to_string(),
                digest: document_digest(&bytes),
            }));
        }

        Err(ChaincodeError::ConcurrentModification {
            key: pair.register.to_string(),
            attempts: max_attempts,
        })
    }

    // ───────────────────────── Maintenance ─────────────────────────

    /// Compare the two replicas.
    pub fn check_replicas(&self) -> Result<ReplicaStatus, ChaincodeError> {
        let status = check_replicas(&*self.store, self.pair())?;
        if !status.is_consistent() {
            warn!(?status, "Will replicas diverged");
        }
        Ok(status)
    }

    /// Copy the register replica onto the department key. Admin-only.
    pub fn repair_replicas(
        &self,
        admin_name: &str,
        admin_password: &str,
    ) -> Result<LedgerEvent, ChaincodeError> {
        self.authorize(admin_name, admin_password)?;

        let _guard = self.lock.acquire();
        let bytes = self.load_register()?;
        dual_write(
            &*self.store,
            self.pair(),
            &bytes,
            self.config.replica_write_retries,
        )?;

        info!(admin = admin_name, "Will replicas repaired from register");
        Ok(LedgerEvent::ReplicasRepaired(ReplicasRepaired {
            admin: admin_name.to_string(),
            digest: document_digest(&bytes),
        }))
    }

    /// Current document at the register key.
    pub fn read_document(&self) -> Result<WillDocument, ChaincodeError> {
        let bytes = self.load_register()?;
        Ok(decode(&bytes)?)
    }

    fn load_register(&self) -> Result<Vec<u8>, ChaincodeError> {
        let key = self.config.register_key.as_str();
        let bytes = self
            .store
            .get(key)?
            .ok_or_else(|| ChaincodeError::NotFound {
                key: key.to_string(),
            })?;
        debug!(key, bytes = bytes.len(), "Register replica loaded");
        Ok(bytes)
    }
}
