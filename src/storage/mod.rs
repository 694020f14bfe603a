//! Snapshot persistence for coordinator state

pub mod persistence;

pub use persistence::{Snapshot, Storage, StorageConfig, StorageError};
