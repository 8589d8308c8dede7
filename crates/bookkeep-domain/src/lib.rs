//! bookkeep-domain
//!
//! Pure record types for a bookkeeping file (Book, Account, Transaction,
//! Security, ScheduledTransaction, computed holdings and gains).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod account;
pub mod book;
pub mod common;
pub mod portfolio;
pub mod schedule;
pub mod security;
pub mod transaction;

pub use account::*;
pub use book::*;
pub use common::*;
pub use portfolio::*;
pub use schedule::*;
pub use security::*;
pub use transaction::*;
