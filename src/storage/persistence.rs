//! Snapshot persistence
//!
//! Saves and restores the whole coordinator state — registry, wallet
//! instances, and ledger — as a single JSON snapshot.

use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::Ledger;
use crate::registry::WalletRegistry;
use crate::wallet::MultiOwnerWallet;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub snapshot_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".quorum_wallet_data"),
            snapshot_file: "snapshot.json".to_string(),
        }
    }
}

/// A full coordinator state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub registry: WalletRegistry,
    pub wallets: Vec<MultiOwnerWallet>,
    pub ledger: Ledger,
}

/// Snapshot storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageConfig::default())
    }

    fn snapshot_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.snapshot_file)
    }

    /// Save a snapshot to disk
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        // Write to a temporary file, then rename into place
        let temp_path = self.config.data_dir.join("snapshot.tmp");
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, snapshot)?;

        fs::rename(&temp_path, self.snapshot_path())?;

        Ok(())
    }

    /// Load a snapshot from disk
    ///
    /// Rejects snapshots whose wallets fail the confirmation-count
    /// consistency check.
    pub fn load(&self) -> Result<Snapshot, StorageError> {
        let path = self.snapshot_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Snapshot file not found".to_string(),
            ));
        }

        let file = fs::File::open(&path)?;
        let reader = BufReader::new(file);

        let snapshot: Snapshot = serde_json::from_reader(reader)?;

        for wallet in &snapshot.wallets {
            if !wallet.is_consistent() {
                return Err(StorageError::InvalidData(format!(
                    "Wallet {} has inconsistent confirmation counts",
                    wallet.address()
                )));
            }
        }

        Ok(snapshot)
    }

    /// Check if a saved snapshot exists
    pub fn exists(&self) -> bool {
        self.snapshot_path().exists()
    }

    /// Delete the saved snapshot
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.snapshot_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Address;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    fn storage_in(dir: &tempfile::TempDir) -> Storage {
        Storage::new(StorageConfig {
            data_dir: dir.path().to_path_buf(),
            snapshot_file: "snapshot.json".to_string(),
        })
        .unwrap()
    }

    fn sample_snapshot() -> Snapshot {
        let mut registry = WalletRegistry::new();
        let mut ledger = Ledger::new();

        let mut wallet = registry
            .create_wallet(addr(1), vec![addr(1), addr(2), addr(3)], &mut ledger)
            .unwrap();
        ledger.mint(addr(1), 1_000);
        wallet.deposit(addr(1), 600, &mut ledger).unwrap();
        wallet
            .submit_transaction(addr(1), addr(9), 100, vec![0x01], &mut ledger)
            .unwrap();
        wallet
            .confirm_transaction(addr(2), 0, &mut ledger)
            .unwrap();

        Snapshot {
            registry,
            wallets: vec![wallet],
            ledger,
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        let snapshot = sample_snapshot();

        assert!(!storage.exists());
        storage.save(&snapshot).unwrap();
        assert!(storage.exists());

        let restored = storage.load().unwrap();
        assert_eq!(restored.registry.wallets_count(), 1);

        let wallet = &restored.wallets[0];
        assert_eq!(wallet.address(), snapshot.wallets[0].address());
        assert_eq!(wallet.transaction_count(), 1);
        assert_eq!(wallet.transaction(0).unwrap().confirmations, 1);
        assert!(wallet.is_consistent());
        assert_eq!(restored.ledger.balance_of(&wallet.address()), 600);
        assert_eq!(
            restored.ledger.events().len(),
            snapshot.ledger.events().len()
        );
    }

    #[test]
    fn test_load_missing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);

        assert!(matches!(
            storage.load(),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);

        storage.save(&sample_snapshot()).unwrap();
        assert!(storage.exists());

        storage.delete().unwrap();
        assert!(!storage.exists());

        // Deleting again is a no-op
        storage.delete().unwrap();
    }

    #[test]
    fn test_load_rejects_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);

        fs::write(dir.path().join("snapshot.json"), b"not json").unwrap();
        assert!(matches!(
            storage.load(),
            Err(StorageError::SerializationError(_))
        ));
    }
}
