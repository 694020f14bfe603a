//! In-memory account ledger
//!
//! Stands in for the host execution environment at its boundary: account
//! balances in an unsigned base unit, a synchronous all-or-nothing transfer
//! primitive, and an append-only event log. Nothing here knows about owners
//! or quorums; wallets drive it from the outside.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::address::Address;
use super::events::{EventRecord, WalletEvent};

/// Errors reported by the ledger
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u128, need: u128 },
}

/// Account balances plus the shared event log
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// Balances: address -> amount in base units
    balances: HashMap<Address, u128>,
    /// Append-only notification log
    events: Vec<EventRecord>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account out of thin air
    ///
    /// This is the genesis/funding entry point; real value issuance belongs
    /// to the host environment, not to this crate.
    pub fn mint(&mut self, account: Address, amount: u128) {
        *self.balances.entry(account).or_insert(0) += amount;
    }

    /// Get the balance of an account (0 for unknown accounts)
    pub fn balance_of(&self, account: &Address) -> u128 {
        *self.balances.get(account).unwrap_or(&0)
    }

    /// Move value between accounts
    ///
    /// Fails with no partial transfer if `from` holds less than `amount`.
    pub fn send(&mut self, from: Address, to: Address, amount: u128) -> Result<(), LedgerError> {
        let from_balance = self.balance_of(&from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientFunds {
                have: from_balance,
                need: amount,
            });
        }

        *self.balances.entry(from).or_insert(0) -= amount;
        *self.balances.entry(to).or_insert(0) += amount;

        Ok(())
    }

    /// Append a notification to the event log
    pub fn emit(&mut self, event: WalletEvent) {
        self.events.push(EventRecord::new(event));
    }

    /// All recorded events, in emission order
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Events concerning one wallet, in emission order
    pub fn events_for(&self, wallet: &Address) -> Vec<&WalletEvent> {
        self.events
            .iter()
            .map(|record| &record.event)
            .filter(|event| event.wallet() == *wallet)
            .collect()
    }
}
