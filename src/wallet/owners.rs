//! Owner set management
//!
//! The set of signers authorized against a wallet, fixed at creation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::wallet::WalletError;
use crate::ledger::Address;

/// Minimum number of owners a wallet must have
pub const MIN_OWNERS: usize = 3;

/// An ordered, duplicate-free set of signer identities
///
/// Keeps the creation order for enumeration alongside a presence index for
/// O(1) membership checks; the two are built together and the set is
/// immutable afterwards, so they cannot diverge.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "Vec<Address>", into = "Vec<Address>")]
pub struct OwnerSet {
    ordered: Vec<Address>,
    index: HashSet<Address>,
}

impl OwnerSet {
    /// Validate and build an owner set
    ///
    /// # Errors
    /// Returns `InvalidOwnerSet` if fewer than [`MIN_OWNERS`] identities are
    /// given, any identity repeats, or the zero address is present.
    pub fn new(owners: Vec<Address>) -> Result<Self, WalletError> {
        if owners.len() < MIN_OWNERS {
            return Err(WalletError::InvalidOwnerSet(format!(
                "need at least {} owners, got {}",
                MIN_OWNERS,
                owners.len()
            )));
        }

        let mut index = HashSet::with_capacity(owners.len());
        for owner in &owners {
            if owner.is_zero() {
                return Err(WalletError::InvalidOwnerSet(
                    "zero address owner".to_string(),
                ));
            }
            if !index.insert(*owner) {
                return Err(WalletError::InvalidOwnerSet(format!(
                    "duplicate owner {}",
                    owner
                )));
            }
        }

        Ok(Self {
            ordered: owners,
            index,
        })
    }

    /// Check whether an identity belongs to this set
    pub fn contains(&self, identity: &Address) -> bool {
        self.index.contains(identity)
    }

    /// The owners in creation order
    pub fn as_slice(&self) -> &[Address] {
        &self.ordered
    }

    /// Number of owners
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Always false for a constructed set
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Iterate the owners in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.ordered.iter()
    }
}

impl TryFrom<Vec<Address>> for OwnerSet {
    type Error = WalletError;

    fn try_from(owners: Vec<Address>) -> Result<Self, Self::Error> {
        Self::new(owners)
    }
}

impl From<OwnerSet> for Vec<Address> {
    fn from(set: OwnerSet) -> Self {
        set.ordered
    }
}
