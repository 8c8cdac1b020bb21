//! Record types persisted in the ledger state
//!
//! Two record shapes share the store: registered accounts and the will
//! document. Field names on the wire are lowercase to stay readable by
//! existing ledger clients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator written into every encoded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Account,
    Will,
}

impl RecordKind {
    /// Wire label of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Account => "account",
            RecordKind::Will => "will",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record type that can be stored through the codec.
pub trait Record: Serialize + for<'de> Deserialize<'de> {
    const KIND: RecordKind;
}

/// Registered user account.
///
/// The password is kept in plaintext; the record is never updated after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub password: String,
    #[serde(rename = "propertyid")]
    pub property_id: String,
    pub info: String,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        password: impl Into<String>,
        property_id: impl Into<String>,
        info: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            property_id: property_id.into(),
            info: info.into(),
        }
    }
}

impl Record for Account {
    const KIND: RecordKind = RecordKind::Account;
}

/// Lock state of a will document.
///
/// `Locked` is initial, `Unlocked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockState {
    Locked,
    Unlocked,
}

/// The will document replicated across the register and department keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WillDocument {
    pub id: String,
    #[serde(rename = "visibleinfo")]
    pub visible_info: String,
    #[serde(rename = "hiddeninfo")]
    pub hidden_info: String,
    #[serde(rename = "islocked")]
    pub is_locked: bool,
}

impl WillDocument {
    /// Create a new document in the `Locked` state.
    pub fn new(
        id: impl Into<String>,
        visible_info: impl Into<String>,
        hidden_info: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            visible_info: visible_info.into(),
            hidden_info: hidden_info.into(),
            is_locked: true,
        }
    }

    pub fn lock_state(&self) -> LockState {
        if self.is_locked {
            LockState::Locked
        } else {
            LockState::Unlocked
        }
    }

    /// Transition `Locked -> Unlocked`.
    ///
    /// Returns `false` and leaves the document untouched when it is already
    /// unlocked. There is no transition back to `Locked`.
    pub fn unlock(&mut self) -> bool {
        if !self.is_locked {
            return false;
        }
        self.is_locked = false;
        true
    }
}

impl Record for WillDocument {
    const KIND: RecordKind = RecordKind::Will;
}
