//! Wallet registry
//!
//! The factory entry point: creates wallet instances and answers
//! wallet-by-index and wallets-by-participant queries. Append-only.

pub mod registry;

pub use registry::{RegistryError, WalletRegistry};
