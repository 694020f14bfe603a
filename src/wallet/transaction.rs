//! Proposed outgoing transactions
//!
//! A record is created on submission, gathers confirmations, and is either
//! executed once quorum is reached or left pending forever. Records are
//! never deleted and their indices are never reused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wallet::REQUIRED_CONFIRMATIONS;
use crate::ledger::Address;

/// One proposed outgoing action of a wallet
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Recipient of the outbound transfer
    pub destination: Address,
    /// Amount in ledger base units
    pub value: u128,
    /// Opaque call data, not interpreted by the wallet
    pub payload: Vec<u8>,
    /// One-way flag; set when the outbound transfer went through
    pub executed: bool,
    /// Current number of outstanding confirmations
    pub confirmations: u32,
    /// When the transaction was submitted
    pub submitted_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub(crate) fn new(destination: Address, value: u128, payload: Vec<u8>) -> Self {
        Self {
            destination,
            value,
            payload,
            executed: false,
            confirmations: 0,
            submitted_at: Utc::now(),
        }
    }

    /// Whether the record has gathered enough confirmations to execute
    pub fn has_quorum(&self) -> bool {
        self.confirmations >= REQUIRED_CONFIRMATIONS
    }
}
