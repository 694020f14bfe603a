//! Multi-owner wallet support
//!
//! A wallet is controlled by a fixed set of at least three owners. Any owner
//! may propose an outgoing transaction; it executes only after a fixed
//! quorum of owner confirmations, while deposits are accepted from anyone
//! with no confirmation at all.
//!
//! # Example
//!
//! ```ignore
//! use quorum_wallet::wallet::MultiOwnerWallet;
//!
//! let mut wallet = MultiOwnerWallet::new(address, owners)?;
//! let index = wallet.submit_transaction(owners[0], recipient, 500, vec![], &mut ledger)?;
//! wallet.confirm_transaction(owners[0], index, &mut ledger)?;
//! wallet.confirm_transaction(owners[1], index, &mut ledger)?;
//! wallet.confirm_transaction(owners[2], index, &mut ledger)?;
//! wallet.execute_transaction(owners[3], index, &mut ledger)?;
//! ```

pub mod owners;
pub mod transaction;
pub mod wallet;

pub use owners::{OwnerSet, MIN_OWNERS};
pub use transaction::TransactionRecord;
pub use wallet::{MultiOwnerWallet, WalletError, REQUIRED_CONFIRMATIONS};
