//! Types library for the will register chaincode
//!
//! This library provides the record shapes persisted by the chaincode and the
//! canonical byte encoding used to store them in the ledger key/value state.
//!
//! # Modules
//! - `records`: `Account` and `WillDocument` record types, lock state machine
//! - `codec`: Canonical JSON encoding with an explicit record-kind discriminator
//! - `errors`: Codec error taxonomy

pub mod codec;
pub mod errors;
pub mod records;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::codec::*;
    pub use crate::errors::*;
    pub use crate::records::*;
}
