//! Ledger events emitted by chaincode operations
//!
//! Events are immutable records of successful state changes. They never carry
//! passwords or hidden will content.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account stored under a caller-chosen key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRegistered {
    pub storage_key: String,
    pub name: String,
}

/// Will document written to both replicas in the locked state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WillCreated {
    pub will_id: String,
    pub digest: [u8; 32],
}

/// Will document transitioned from locked to unlocked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WillUnlocked {
    pub will_id: String,
    pub admin: String,
    pub digest: [u8; 32],
}

/// Raw seed value written to both replicas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicasSeeded {
    pub digest: [u8; 32],
}

/// Department replica overwritten from the register replica
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicasRepaired {
    pub admin: String,
    pub digest: [u8; 32],
}

/// Enum wrapper for all ledger events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    AccountRegistered(AccountRegistered),
    WillCreated(WillCreated),
    WillUnlocked(WillUnlocked),
    ReplicasSeeded(ReplicasSeeded),
    ReplicasRepaired(ReplicasRepaired),
}

impl LedgerEvent {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            LedgerEvent::AccountRegistered(_) => "account_registered",
            LedgerEvent::WillCreated(_) => "will_created",
            LedgerEvent::WillUnlocked(_) => "will_unlocked",
            LedgerEvent::ReplicasSeeded(_) => "replicas_seeded",
            LedgerEvent::ReplicasRepaired(_) => "replicas_repaired",
        }
    }
}

/// An event stamped with the invocation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub tx_id: Uuid,
    /// Unix epoch milliseconds (UTC)
    pub recorded_at: i64,
    pub event: LedgerEvent,
}

impl EventRecord {
    pub fn new(tx_id: Uuid, event: LedgerEvent) -> Self {
        Self {
            tx_id,
            recorded_at: Utc::now().timestamp_millis(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_will_unlocked_serialization() {
        let event = LedgerEvent::WillUnlocked(WillUnlocked {
            will_id: "will-1".to_string(),
            admin: "admin".to_string(),
            digest: [7u8; 32],
        });
        let json = serde_json::to_string(&event).unwrap();
        let deser: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_event_record_stamps_time() {
        let record = EventRecord::new(
            Uuid::now_v7(),
            LedgerEvent::ReplicasSeeded(ReplicasSeeded { digest: [0u8; 32] }),
        );
        assert!(record.recorded_at > 0);
        assert_eq!(record.event.label(), "replicas_seeded");
    }

    #[test]
    fn test_account_event_has_no_password_field() {
        let event = LedgerEvent::AccountRegistered(AccountRegistered {
            storage_key: "k1".to_string(),
            name: "alice".to_string(),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("password"));
    }
}
