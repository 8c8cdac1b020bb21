//! Account registry
//!
//! Accounts live under `account_key_prefix + storage_key`, so an account
//! lookup never lands on a will replica or a raw passthrough value written
//! under the bare key. A resolved key that equals a replica key is refused.
//! Creation otherwise overwrites without checking prior existence.

use std::sync::Arc;

use tracing::{debug, info, warn};
use will_types::codec::{decode, encode};
use will_types::records::Account;

use crate::config::ChaincodeConfig;
use crate::errors::ChaincodeError;
use crate::events::{AccountRegistered, LedgerEvent};
use crate::store::KvStore;

/// Creates and reads `Account` records.
pub struct AccountRegistry<S: KvStore> {
    store: Arc<S>,
    config: Arc<ChaincodeConfig>,
}

impl<S: KvStore> AccountRegistry<S> {
    pub fn new(store: Arc<S>, config: Arc<ChaincodeConfig>) -> Self {
        Self { store, config }
    }

    /// Store a new account under `storage_key`.
    ///
    /// The property id is always the configured default. Any record already
    /// at the key is replaced (last write wins).
    pub fn create(
        &self,
        storage_key: &str,
        name: &str,
        password: &str,
        info: &str,
    ) -> Result<LedgerEvent, ChaincodeError> {
        let key = self.config.account_key(storage_key);
        if self.config.is_replica_key(&key) {
            warn!(storage_key, key = %key, "Account creation refused on replica key");
            return Err(ChaincodeError::ReservedKey { key });
        }

        let account = Account::new(name, password, self.config.default_property_id.as_str(), info);
        let bytes = encode(&account)?;
        self.store.put(&key, &bytes)?;

        info!(storage_key, name, "Account registered");
        Ok(LedgerEvent::AccountRegistered(AccountRegistered {
            storage_key: storage_key.to_string(),
            name: account.name,
        }))
    }

    /// Read the full account stored under `storage_key`.
    pub fn get(&self, storage_key: &str) -> Result<Account, ChaincodeError> {
        let key = self.config.account_key(storage_key);
        let bytes = self
            .store
            .get(&key)?
            .ok_or_else(|| ChaincodeError::NotFound { key: key.clone() })?;

        let account: Account = decode(&bytes)?;
        debug!(storage_key, "Account loaded");
        Ok(account)
    }

    /// Name of the account stored under `storage_key`.
    pub fn lookup_name(&self, storage_key: &str) -> Result<String, ChaincodeError> {
        self.get(storage_key).map(|account| account.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::store::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, AccountRegistry<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let registry = AccountRegistry::new(store.clone(), Arc::new(ChaincodeConfig::default()));
        (store, registry)
    }

    #[test]
    fn test_create_then_lookup_name() {
        let (_, registry) = setup();
        registry.create("k1", "alice", "pw1", "bio").unwrap();
        assert_eq!(registry.lookup_name("k1").unwrap(), "alice");
    }

    #[test]
    fn test_create_assigns_default_property_id() {
        let (_, registry) = setup();
        registry.create("k1", "alice", "pw1", "bio").unwrap();
        let account = registry.get("k1").unwrap();
        assert_eq!(account.property_id, "property1");
        assert_eq!(account.info, "bio");
        assert_eq!(account.password, "pw1");
    }

    #[test]
    fn test_create_stores_under_prefixed_key() {
        let (store, registry) = setup();
        registry.create("k1", "alice", "pw1", "bio").unwrap();
        assert!(store.get("account:k1").unwrap().is_some());
        assert!(store.get("k1").unwrap().is_none());
    }

    #[test]
    fn test_create_overwrites_existing() {
        let (_, registry) = setup();
        registry.create("k1", "alice", "pw1", "bio").unwrap();
        registry.create("k1", "bob", "pw2", "other").unwrap();
        assert_eq!(registry.lookup_name("k1").unwrap(), "bob");
    }

    #[test]
    fn test_lookup_missing_is_not_found() {
        let (_, registry) = setup();
        let err = registry.lookup_name("ghost").unwrap_err();
        assert_eq!(
            err,
            ChaincodeError::NotFound {
                key: "account:ghost".to_string()
            }
        );
    }

    #[test]
    fn test_lookup_foreign_bytes_is_decode_error() {
        let (store, registry) = setup();
        store.put("account:k1", b"not an account").unwrap();
        let err = registry.lookup_name("k1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeError);
    }

    #[test]
    fn test_create_event_omits_password() {
        let (_, registry) = setup();
        let event = registry.create("k1", "alice", "pw1", "bio").unwrap();
        assert_eq!(
            event,
            LedgerEvent::AccountRegistered(AccountRegistered {
                storage_key: "k1".to_string(),
                name: "alice".to_string(),
            })
        );
    }

    #[test]
    fn test_create_refuses_replica_key() {
        let store = Arc::new(MemoryStore::new());
        let config = ChaincodeConfig {
            account_key_prefix: "will".to_string(),
            ..ChaincodeConfig::default()
        };
        let registry = AccountRegistry::new(store.clone(), Arc::new(config));
        store.put("willRegister", b"doc").unwrap();

        let err = registry.create("Register", "mallory", "pw", "i").unwrap_err();
        assert_eq!(
            err,
            ChaincodeError::ReservedKey {
                key: "willRegister".to_string()
            }
        );
        assert_eq!(store.get("willRegister").unwrap().unwrap(), b"doc".to_vec());
    }
}
