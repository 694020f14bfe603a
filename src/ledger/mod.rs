//! Host-ledger boundary
//!
//! This module models the execution environment the wallets run against:
//! - Fixed-width account addresses
//! - An in-memory account book with an all-or-nothing transfer primitive
//! - The append-only notification log wallets emit into

pub mod accounts;
pub mod address;
pub mod events;

pub use accounts::{Ledger, LedgerError};
pub use address::{Address, AddressError, ADDRESS_LEN};
pub use events::{EventRecord, WalletEvent};
