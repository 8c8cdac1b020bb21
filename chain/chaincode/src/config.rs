//! Chaincode configuration
//!
//! Fixed keys and the administrator credential pair are injected rather than
//! compiled in, so deployments and tests can supply their own values.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {reason}")]
    Parse { reason: String },

    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },
}

/// Upper bound on either retry budget.
pub const MAX_RETRIES: u32 = 16;

/// Configuration for the will register chaincode.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaincodeConfig {
    /// Key holding the canonical will replica.
    pub register_key: String,
    /// Key holding the department replica.
    pub department_key: String,
    /// Property identifier assigned to every new account.
    pub default_property_id: String,
    /// Prefix placed in front of caller-chosen account keys.
    pub account_key_prefix: String,
    pub admin_name: String,
    pub admin_password: String,
    /// Extra attempts at the second replica write before reporting a partial write.
    pub replica_write_retries: u32,
    /// Extra read-modify-write rounds an unlock may take when the register changes underneath it.
    pub conflict_retries: u32,
}

impl Default for ChaincodeConfig {
    fn default() -> Self {
        Self {
            register_key: "willRegister".to_string(),
            department_key: "property1".to_string(),
            default_property_id: "property1".to_string(),
            account_key_prefix: "account:".to_string(),
            admin_name: "admin".to_string(),
            admin_password: "admin123".to_string(),
            replica_write_retries: 3,
            conflict_retries: 3,
        }
    }
}

impl ChaincodeConfig {
    /// Load configuration from JSON. Missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations under which the replica invariant is meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.register_key.is_empty() || self.department_key.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "register and department keys must be non-empty".to_string(),
            });
        }
        if self.register_key == self.department_key {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "register and department keys must differ (both are {})",
                    self.register_key
                ),
            });
        }
        if self.admin_name.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "admin name must be non-empty".to_string(),
            });
        }
        // Any prefix that starts a replica key lets some account key resolve onto it.
        for replica in [&self.register_key, &self.department_key] {
            if replica.starts_with(self.account_key_prefix.as_str()) {
                return Err(ConfigError::Invalid {
                    reason: format!(
                        "account key prefix {:?} can address replica key {}",
                        self.account_key_prefix, replica
                    ),
                });
            }
        }
        if self.replica_write_retries > MAX_RETRIES || self.conflict_retries > MAX_RETRIES {
            return Err(ConfigError::Invalid {
                reason: format!("retry budgets must not exceed {MAX_RETRIES}"),
            });
        }
        Ok(())
    }

    /// Storage key for a caller-chosen account key.
    pub fn account_key(&self, storage_key: &str) -> String {
        format!("{}{}", self.account_key_prefix, storage_key)
    }

    /// True when `key` is one of the two will replica keys.
    pub fn is_replica_key(&self, key: &str) -> bool {
        key == self.register_key || key == self.department_key
    }
}

impl fmt::Debug for ChaincodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaincodeConfig")
            .field("register_key", &self.register_key)
            .field("department_key", &self.department_key)
            .field("default_property_id", &self.default_property_id)
            .field("account_key_prefix", &self.account_key_prefix)
            .field("admin_name", &self.admin_name)
            .field("admin_password", &"<redacted>")
            .field("replica_write_retries", &self.replica_write_retries)
            .field("conflict_retries", &self.conflict_retries)
            .finish()
    }
}
