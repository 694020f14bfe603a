//! Quorum Wallet: a multi-owner transaction-approval coordinator in Rust
//!
//! This crate provides:
//! - A wallet registry (factory) that creates wallet instances and indexes
//!   them by participant
//! - Multi-owner wallets with a fixed confirmation quorum for outgoing
//!   transactions and unconditional deposits
//! - An in-memory account ledger standing in for the host execution
//!   environment, with an append-only event log
//! - JSON snapshot persistence for the whole coordinator state
//!
//! # Example
//!
//! ```rust
//! use quorum_wallet::ledger::{Address, Ledger};
//! use quorum_wallet::registry::WalletRegistry;
//!
//! let mut ledger = Ledger::new();
//! let mut registry = WalletRegistry::new();
//!
//! // Create a wallet with three owners
//! let owners: Vec<Address> = (1..=3).map(|n| Address::new([n; 20])).collect();
//! let mut wallet = registry
//!     .create_wallet(owners[0], owners.clone(), &mut ledger)
//!     .unwrap();
//!
//! // Fund the wallet; deposits need no confirmation
//! ledger.mint(owners[0], 1_000);
//! wallet.deposit(owners[0], 1_000, &mut ledger).unwrap();
//!
//! // Propose an outgoing transfer, gather the quorum, execute
//! let recipient = Address::new([9; 20]);
//! let index = wallet
//!     .submit_transaction(owners[0], recipient, 250, vec![], &mut ledger)
//!     .unwrap();
//! for owner in &owners {
//!     wallet.confirm_transaction(*owner, index, &mut ledger).unwrap();
//! }
//! wallet.execute_transaction(owners[0], index, &mut ledger).unwrap();
//!
//! assert_eq!(ledger.balance_of(&recipient), 250);
//! ```

pub mod crypto;
pub mod ledger;
pub mod registry;
pub mod storage;
pub mod wallet;

// Re-export commonly used types
pub use crypto::{KeyError, KeyPair};
pub use ledger::{Address, EventRecord, Ledger, LedgerError, WalletEvent};
pub use registry::{RegistryError, WalletRegistry};
pub use storage::{Snapshot, Storage, StorageConfig, StorageError};
pub use wallet::{
    MultiOwnerWallet, OwnerSet, TransactionRecord, WalletError, MIN_OWNERS,
    REQUIRED_CONFIRMATIONS,
};
