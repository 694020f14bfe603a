//! Wallet lifecycle notifications
//!
//! Every state-changing operation appends one immutable fact to the ledger's
//! event log. Each event carries the address of the wallet (or, for
//! `WalletCreated`, the newly created wallet) it concerns, so observers can
//! filter the shared log per instance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::address::Address;

/// A notification emitted by the registry or a wallet instance
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum WalletEvent {
    /// A new wallet was created and appended to the registry
    WalletCreated {
        wallet: Address,
        registry_index: u64,
    },
    /// Value arrived at the wallet; no confirmation required
    Deposit {
        wallet: Address,
        sender: Address,
        amount: u128,
        new_balance: u128,
    },
    /// An owner proposed an outgoing transaction
    SubmitTransaction {
        wallet: Address,
        submitter: Address,
        index: u64,
        destination: Address,
        value: u128,
        payload: Vec<u8>,
    },
    /// An owner confirmed a pending transaction
    ConfirmTransaction {
        wallet: Address,
        owner: Address,
        index: u64,
    },
    /// An owner withdrew a previously recorded confirmation
    RevokeConfirmation {
        wallet: Address,
        owner: Address,
        index: u64,
    },
    /// A transaction reached quorum and its transfer went through
    ExecuteTransaction {
        wallet: Address,
        executor: Address,
        index: u64,
    },
}

impl WalletEvent {
    /// The wallet address this event concerns
    pub fn wallet(&self) -> Address {
        match self {
            WalletEvent::WalletCreated { wallet, .. }
            | WalletEvent::Deposit { wallet, .. }
            | WalletEvent::SubmitTransaction { wallet, .. }
            | WalletEvent::ConfirmTransaction { wallet, .. }
            | WalletEvent::RevokeConfirmation { wallet, .. }
            | WalletEvent::ExecuteTransaction { wallet, .. } => *wallet,
        }
    }
}

/// A timestamped entry in the ledger's append-only event log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    /// When the event was appended
    pub timestamp: DateTime<Utc>,
    /// The event itself
    pub event: WalletEvent,
}

impl EventRecord {
    /// Record an event at the current time
    pub fn new(event: WalletEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}
