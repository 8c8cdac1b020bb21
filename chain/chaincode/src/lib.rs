//! Will Register Chaincode
//!
//! This crate implements the ledger-side logic for the will register: account
//! registration, the will document lifecycle, and the consistency of the two
//! will replicas (register and department keys) on top of a flat key/value
//! state without cross-key transactions.
//!
//! # Modules
//! - `config`: Injected keys, administrator credentials and retry budgets
//! - `errors`: Chaincode error types and their flat classification
//! - `store`: Key/value state trait and in-memory implementation
//! - `security`: Pluggable administrator check, replica write lock
//! - `replica`: Dual-write helper and replica consistency check
//! - `registry`: Account creation and lookup
//! - `lifecycle`: Will creation, admin unlock, replica maintenance
//! - `events`: Ledger events emitted by successful mutations
//! - `dispatch`: Function-name dispatcher (`Chaincode`)

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod registry;
pub mod replica;
pub mod security;
pub mod store;

pub use config::ChaincodeConfig;
pub use dispatch::{Chaincode, Operation};
pub use errors::{ChaincodeError, ErrorKind, StoreError};
pub use store::{KvStore, MemoryStore};
