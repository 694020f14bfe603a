//! Wallet factory and membership index
//!
//! Creates wallet instances and remembers, append-only, which addresses
//! exist and which identities participate in which wallets. After creation
//! all interaction happens against the wallet itself; the registry never
//! reaches into a wallet's internals.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::sha256;
use crate::ledger::{Address, Ledger, WalletEvent, ADDRESS_LEN};
use crate::wallet::{MultiOwnerWallet, OwnerSet, WalletError};

/// Errors from registry operations
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Index {index} out of range: {count} wallets")]
    IndexOutOfRange { index: u64, count: u64 },
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Factory for multi-owner wallets
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WalletRegistry {
    /// Created wallet addresses, in creation order
    wallets: Vec<Address>,
    /// Owner identity -> wallets they participate in, in creation order
    by_owner: HashMap<Address, Vec<Address>>,
    /// Creation counter for address derivation
    nonce: u64,
}

impl WalletRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new wallet owned by `owners`
    ///
    /// Validates the owner set, derives a fresh address, records the wallet
    /// and every owner's participation, and emits `WalletCreated`. The
    /// constructed wallet is returned to the caller, which owns it from
    /// here on; the registry keeps only the address.
    ///
    /// # Errors
    /// `InvalidOwnerSet` if the owner set has fewer than three identities,
    /// duplicates, or the zero address.
    pub fn create_wallet(
        &mut self,
        creator: Address,
        owners: Vec<Address>,
        ledger: &mut Ledger,
    ) -> Result<MultiOwnerWallet, RegistryError> {
        let owner_set = OwnerSet::new(owners)?;

        let address = self.derive_wallet_address(&creator);
        self.nonce += 1;

        let index = self.wallets.len() as u64;
        self.wallets.push(address);
        for owner in owner_set.iter() {
            self.by_owner.entry(*owner).or_default().push(address);
        }

        let wallet = MultiOwnerWallet::with_owner_set(address, owner_set);

        ledger.emit(WalletEvent::WalletCreated {
            wallet: address,
            registry_index: index,
        });

        log::info!(
            "Wallet created at {} ({} owners, registry index {})",
            address,
            wallet.owners().len(),
            index
        );

        Ok(wallet)
    }

    /// Derive a wallet address from the creator and the creation counter
    fn derive_wallet_address(&self, creator: &Address) -> Address {
        let input = format!("{}:{}", creator, self.nonce);
        let hash = sha256(input.as_bytes());

        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&hash[..ADDRESS_LEN]);
        Address::new(bytes)
    }

    /// Get the wallet address at a registry position
    pub fn get_wallet(&self, index: u64) -> Result<Address, RegistryError> {
        self.wallets
            .get(index as usize)
            .copied()
            .ok_or(RegistryError::IndexOutOfRange {
                index,
                count: self.wallets.len() as u64,
            })
    }

    /// Number of wallets ever created
    pub fn wallets_count(&self) -> u64 {
        self.wallets.len() as u64
    }

    /// All wallet addresses, in creation order
    pub fn wallets(&self) -> &[Address] {
        &self.wallets
    }

    /// Wallets an identity participates in, in creation order
    ///
    /// Empty for identities that are not an owner anywhere; never fails.
    pub fn user_wallets(&self, identity: &Address) -> &[Address] {
        self.by_owner
            .get(identity)
            .map(|wallets| wallets.as_slice())
            .unwrap_or(&[])
    }
}
