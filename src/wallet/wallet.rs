//! Multi-owner wallet implementation
//!
//! A quorum-gated transaction queue: any owner may propose an outgoing
//! transfer, owners confirm or revoke independently, and once the fixed
//! quorum is reached any owner may trigger execution. Deposits are the
//! deliberate asymmetry: value flows in from anyone with no confirmation,
//! value flows out only through the quorum gate.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::owners::OwnerSet;
use super::transaction::TransactionRecord;
use crate::ledger::{Address, Ledger, LedgerError, WalletEvent};

/// Confirmations required before a transaction may execute
///
/// Fixed at 3 regardless of owner-set size: a 10-owner wallet still needs
/// exactly 3 confirmations, not a majority. See DESIGN.md.
pub const REQUIRED_CONFIRMATIONS: u32 = 3;

/// Errors from wallet operations
///
/// Every failure leaves the wallet unchanged; the execute path rolls its
/// flag back before reporting `TransferFailed`.
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Invalid owner set: {0}")]
    InvalidOwnerSet(String),
    #[error("Caller {0} is not an owner")]
    NotAnOwner(Address),
    #[error("Transaction {0} not found")]
    TransactionNotFound(u64),
    #[error("Transaction {0} already executed")]
    TransactionAlreadyExecuted(u64),
    #[error("Transaction {index} already confirmed by {owner}")]
    AlreadyConfirmed { index: u64, owner: Address },
    #[error("Transaction {index} not confirmed by {owner}")]
    NotYetConfirmed { index: u64, owner: Address },
    #[error("Cannot execute: have {have} confirmations, need {need}")]
    QuorumNotMet { have: u32, need: u32 },
    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] LedgerError),
}

/// A wallet controlled by a fixed set of owners
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiOwnerWallet {
    /// The wallet's own ledger address; deposits land here
    address: Address,
    /// Authorized signers, immutable after creation
    owners: OwnerSet,
    /// Sequential transaction log; indices are positions, never reused
    transactions: Vec<TransactionRecord>,
    /// Transaction index -> owners with an outstanding confirmation
    confirmations: HashMap<u64, HashSet<Address>>,
    /// Creation timestamp
    created_at: DateTime<Utc>,
}

impl MultiOwnerWallet {
    /// Create a wallet at `address` with the given owners
    ///
    /// # Errors
    /// Returns `InvalidOwnerSet` under the same rules as [`OwnerSet::new`].
    pub fn new(address: Address, owners: Vec<Address>) -> Result<Self, WalletError> {
        Ok(Self::with_owner_set(address, OwnerSet::new(owners)?))
    }

    pub(crate) fn with_owner_set(address: Address, owners: OwnerSet) -> Self {
        Self {
            address,
            owners,
            transactions: Vec::new(),
            confirmations: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    // =========================================================================
    // View Functions
    // =========================================================================

    /// The wallet's ledger address
    pub fn address(&self) -> Address {
        self.address
    }

    /// The owners in creation order
    pub fn owners(&self) -> &[Address] {
        self.owners.as_slice()
    }

    /// Check whether an identity is an owner
    pub fn is_owner(&self, identity: &Address) -> bool {
        self.owners.contains(identity)
    }

    /// When the wallet was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of transactions ever submitted
    pub fn transaction_count(&self) -> u64 {
        self.transactions.len() as u64
    }

    /// Look up a transaction by index
    pub fn transaction(&self, index: u64) -> Result<&TransactionRecord, WalletError> {
        self.transactions
            .get(index as usize)
            .ok_or(WalletError::TransactionNotFound(index))
    }

    /// Current balance held at the wallet's address
    pub fn balance(&self, ledger: &Ledger) -> u128 {
        ledger.balance_of(&self.address)
    }

    /// Check that every confirmation count matches its confirmer set
    ///
    /// Also requires that confirmer sets reference only known transactions
    /// and authorized owners. Used by snapshot loading and tests.
    pub fn is_consistent(&self) -> bool {
        let counts_match = self.transactions.iter().enumerate().all(|(i, record)| {
            let confirmers = self
                .confirmations
                .get(&(i as u64))
                .map(|set| set.len())
                .unwrap_or(0);
            confirmers == record.confirmations as usize
        });

        counts_match
            && self.confirmations.iter().all(|(index, confirmers)| {
                (*index as usize) < self.transactions.len()
                    && confirmers.iter().all(|owner| self.owners.contains(owner))
            })
    }

    // =========================================================================
    // Mutating Operations
    // =========================================================================

    /// Accept an incoming transfer from any sender
    ///
    /// No owner gate and no quorum: deposits are unconditional. Returns the
    /// wallet's balance after the transfer. Fails only if the ledger rejects
    /// the inbound leg (sender underfunded).
    pub fn deposit(
        &self,
        sender: Address,
        amount: u128,
        ledger: &mut Ledger,
    ) -> Result<u128, LedgerError> {
        ledger.send(sender, self.address, amount)?;
        let new_balance = ledger.balance_of(&self.address);

        ledger.emit(WalletEvent::Deposit {
            wallet: self.address,
            sender,
            amount,
            new_balance,
        });

        Ok(new_balance)
    }

    /// Propose an outgoing transaction
    ///
    /// Appends a record at the next sequential index with zero
    /// confirmations. The wallet's balance is not checked here; that happens
    /// at execution. Returns the assigned index.
    pub fn submit_transaction(
        &mut self,
        caller: Address,
        destination: Address,
        value: u128,
        payload: Vec<u8>,
        ledger: &mut Ledger,
    ) -> Result<u64, WalletError> {
        self.require_owner(&caller)?;

        let index = self.transactions.len() as u64;
        self.transactions
            .push(TransactionRecord::new(destination, value, payload.clone()));

        ledger.emit(WalletEvent::SubmitTransaction {
            wallet: self.address,
            submitter: caller,
            index,
            destination,
            value,
            payload,
        });

        log::info!(
            "Wallet {}: transaction {} submitted, {} to {}",
            self.address,
            index,
            value,
            destination
        );

        Ok(index)
    }

    /// Record the caller's confirmation of a pending transaction
    pub fn confirm_transaction(
        &mut self,
        caller: Address,
        index: u64,
        ledger: &mut Ledger,
    ) -> Result<(), WalletError> {
        self.require_owner(&caller)?;
        self.require_pending(index)?;

        let confirmers = self.confirmations.entry(index).or_default();
        if !confirmers.insert(caller) {
            return Err(WalletError::AlreadyConfirmed {
                index,
                owner: caller,
            });
        }
        self.transactions[index as usize].confirmations += 1;

        ledger.emit(WalletEvent::ConfirmTransaction {
            wallet: self.address,
            owner: caller,
            index,
        });

        log::debug!(
            "Wallet {}: transaction {} confirmed by {} ({} total)",
            self.address,
            index,
            caller,
            self.transactions[index as usize].confirmations
        );

        Ok(())
    }

    /// Withdraw the caller's outstanding confirmation
    pub fn revoke_confirmation(
        &mut self,
        caller: Address,
        index: u64,
        ledger: &mut Ledger,
    ) -> Result<(), WalletError> {
        self.require_owner(&caller)?;
        self.require_pending(index)?;

        let removed = self
            .confirmations
            .get_mut(&index)
            .map(|confirmers| confirmers.remove(&caller))
            .unwrap_or(false);
        if !removed {
            return Err(WalletError::NotYetConfirmed {
                index,
                owner: caller,
            });
        }
        self.transactions[index as usize].confirmations -= 1;

        ledger.emit(WalletEvent::RevokeConfirmation {
            wallet: self.address,
            owner: caller,
            index,
        });

        log::debug!(
            "Wallet {}: confirmation on transaction {} revoked by {}",
            self.address,
            index,
            caller
        );

        Ok(())
    }

    /// Execute a transaction that has reached quorum
    ///
    /// Any owner may trigger execution, not only the submitter or a
    /// confirmer. The executed flag flips before the outbound transfer, so
    /// any observer reached during the send already sees the transaction as
    /// spent; a rejected send rolls the flag back and the attempt leaves no
    /// trace.
    pub fn execute_transaction(
        &mut self,
        caller: Address,
        index: u64,
        ledger: &mut Ledger,
    ) -> Result<(), WalletError> {
        self.require_owner(&caller)?;

        let wallet = self.address;
        let record = self
            .transactions
            .get_mut(index as usize)
            .ok_or(WalletError::TransactionNotFound(index))?;
        if record.executed {
            return Err(WalletError::TransactionAlreadyExecuted(index));
        }
        if record.confirmations < REQUIRED_CONFIRMATIONS {
            return Err(WalletError::QuorumNotMet {
                have: record.confirmations,
                need: REQUIRED_CONFIRMATIONS,
            });
        }

        record.executed = true;
        let destination = record.destination;
        let value = record.value;

        if let Err(err) = ledger.send(wallet, destination, value) {
            self.transactions[index as usize].executed = false;
            return Err(WalletError::TransferFailed(err));
        }

        ledger.emit(WalletEvent::ExecuteTransaction {
            wallet,
            executor: caller,
            index,
        });

        log::info!(
            "Wallet {}: transaction {} executed, {} to {}",
            wallet,
            index,
            value,
            destination
        );

        Ok(())
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn require_owner(&self, caller: &Address) -> Result<(), WalletError> {
        if !self.owners.contains(caller) {
            return Err(WalletError::NotAnOwner(*caller));
        }
        Ok(())
    }

    /// The transaction must exist and must not have executed
    fn require_pending(&self, index: u64) -> Result<(), WalletError> {
        let record = self.transaction(index)?;
        if record.executed {
            return Err(WalletError::TransactionAlreadyExecuted(index));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    /// Wallet at addr(100) with owners addr(1)..=addr(n), plus a ledger
    fn setup(n_owners: u8) -> (MultiOwnerWallet, Ledger) {
        let _ = env_logger::builder().is_test(true).try_init();
        let owners = (1..=n_owners).map(addr).collect();
        let wallet = MultiOwnerWallet::new(addr(100), owners).unwrap();
        (wallet, Ledger::new())
    }

    #[test]
    fn test_wallet_creation() {
        let (wallet, _) = setup(4);

        assert_eq!(wallet.owners(), &[addr(1), addr(2), addr(3), addr(4)]);
        assert!(wallet.is_owner(&addr(1)));
        assert!(!wallet.is_owner(&addr(9)));
        assert_eq!(wallet.transaction_count(), 0);
    }

    #[test]
    fn test_wallet_requires_three_owners() {
        let result = MultiOwnerWallet::new(addr(100), vec![addr(1), addr(2)]);
        assert!(matches!(result, Err(WalletError::InvalidOwnerSet(_))));
    }

    #[test]
    fn test_deposit_from_anyone() {
        let (wallet, mut ledger) = setup(3);
        let outsider = addr(50);
        ledger.mint(outsider, 1_000);

        let new_balance = wallet.deposit(outsider, 400, &mut ledger).unwrap();
        assert_eq!(new_balance, 400);

        let new_balance = wallet.deposit(outsider, 100, &mut ledger).unwrap();
        assert_eq!(new_balance, 500);
        assert_eq!(wallet.balance(&ledger), 500);

        assert_eq!(
            ledger.events_for(&wallet.address())[0],
            &WalletEvent::Deposit {
                wallet: wallet.address(),
                sender: outsider,
                amount: 400,
                new_balance: 400,
            }
        );
    }

    #[test]
    fn test_submit_assigns_sequential_indices() {
        let (mut wallet, mut ledger) = setup(3);

        let first = wallet
            .submit_transaction(addr(1), addr(50), 500, vec![0x01], &mut ledger)
            .unwrap();
        let second = wallet
            .submit_transaction(addr(2), addr(51), 700, Vec::new(), &mut ledger)
            .unwrap();

        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(wallet.transaction_count(), 2);

        let record = wallet.transaction(0).unwrap();
        assert_eq!(record.destination, addr(50));
        assert_eq!(record.value, 500);
        assert_eq!(record.payload, vec![0x01]);
        assert!(!record.executed);
        assert_eq!(record.confirmations, 0);
    }

    #[test]
    fn test_submit_rejects_non_owner() {
        let (mut wallet, mut ledger) = setup(3);

        let result = wallet.submit_transaction(addr(9), addr(50), 500, Vec::new(), &mut ledger);
        assert!(matches!(result, Err(WalletError::NotAnOwner(a)) if a == addr(9)));
        assert_eq!(wallet.transaction_count(), 0);
    }

    #[test]
    fn test_submit_without_balance_is_allowed() {
        let (mut wallet, mut ledger) = setup(3);
        assert_eq!(wallet.balance(&ledger), 0);

        wallet
            .submit_transaction(addr(1), addr(50), 10_000, Vec::new(), &mut ledger)
            .unwrap();
        assert_eq!(wallet.transaction_count(), 1);
    }

    #[test]
    fn test_confirm_increments_count() {
        let (mut wallet, mut ledger) = setup(3);
        wallet
            .submit_transaction(addr(1), addr(50), 500, Vec::new(), &mut ledger)
            .unwrap();

        wallet.confirm_transaction(addr(2), 0, &mut ledger).unwrap();
        assert_eq!(wallet.transaction(0).unwrap().confirmations, 1);
        assert!(wallet.is_consistent());
    }

    #[test]
    fn test_double_confirm_rejected_without_side_effect() {
        let (mut wallet, mut ledger) = setup(3);
        wallet
            .submit_transaction(addr(1), addr(50), 500, Vec::new(), &mut ledger)
            .unwrap();

        wallet.confirm_transaction(addr(1), 0, &mut ledger).unwrap();
        let result = wallet.confirm_transaction(addr(1), 0, &mut ledger);
        assert!(matches!(
            result,
            Err(WalletError::AlreadyConfirmed { index: 0, owner }) if owner == addr(1)
        ));

        // The failed attempt changed nothing
        assert_eq!(wallet.transaction(0).unwrap().confirmations, 1);
        assert!(wallet.is_consistent());
    }

    #[test]
    fn test_confirm_unknown_transaction() {
        let (mut wallet, mut ledger) = setup(3);
        let result = wallet.confirm_transaction(addr(1), 7, &mut ledger);
        assert!(matches!(result, Err(WalletError::TransactionNotFound(7))));
    }

    #[test]
    fn test_revoke_requires_prior_confirmation() {
        let (mut wallet, mut ledger) = setup(3);
        wallet
            .submit_transaction(addr(1), addr(50), 500, Vec::new(), &mut ledger)
            .unwrap();

        let result = wallet.revoke_confirmation(addr(2), 0, &mut ledger);
        assert!(matches!(
            result,
            Err(WalletError::NotYetConfirmed { index: 0, owner }) if owner == addr(2)
        ));
    }

    #[test]
    fn test_confirm_revoke_confirm_cycle() {
        let (mut wallet, mut ledger) = setup(3);
        wallet
            .submit_transaction(addr(1), addr(50), 500, Vec::new(), &mut ledger)
            .unwrap();

        wallet.confirm_transaction(addr(2), 0, &mut ledger).unwrap();
        wallet.revoke_confirmation(addr(2), 0, &mut ledger).unwrap();
        assert_eq!(wallet.transaction(0).unwrap().confirmations, 0);

        // Re-confirming after a revoke is not a double confirm
        wallet.confirm_transaction(addr(2), 0, &mut ledger).unwrap();
        assert_eq!(wallet.transaction(0).unwrap().confirmations, 1);
        assert!(wallet.is_consistent());
    }

    #[test]
    fn test_execute_requires_quorum() {
        let (mut wallet, mut ledger) = setup(4);
        ledger.mint(addr(50), 2_000);
        wallet.deposit(addr(50), 2_000, &mut ledger).unwrap();

        wallet
            .submit_transaction(addr(1), addr(60), 500, Vec::new(), &mut ledger)
            .unwrap();
        wallet.confirm_transaction(addr(1), 0, &mut ledger).unwrap();
        wallet.confirm_transaction(addr(2), 0, &mut ledger).unwrap();

        let result = wallet.execute_transaction(addr(3), 0, &mut ledger);
        assert!(matches!(
            result,
            Err(WalletError::QuorumNotMet { have: 2, need: 3 })
        ));
        assert!(!wallet.transaction(0).unwrap().executed);

        // The third confirmation crosses the threshold
        wallet.confirm_transaction(addr(3), 0, &mut ledger).unwrap();
        wallet.execute_transaction(addr(3), 0, &mut ledger).unwrap();
        assert!(wallet.transaction(0).unwrap().executed);
    }

    #[test]
    fn test_full_approval_flow() {
        // Four owners; deposit, submit, three confirmations, execution by
        // the fourth owner who never confirmed.
        let (mut wallet, mut ledger) = setup(4);
        let funder = addr(50);
        let recipient = addr(60);
        ledger.mint(funder, 2_000);

        wallet.deposit(funder, 2_000, &mut ledger).unwrap();
        wallet
            .submit_transaction(addr(1), recipient, 500, Vec::new(), &mut ledger)
            .unwrap();
        wallet.confirm_transaction(addr(1), 0, &mut ledger).unwrap();
        wallet.confirm_transaction(addr(2), 0, &mut ledger).unwrap();
        wallet.confirm_transaction(addr(3), 0, &mut ledger).unwrap();
        wallet.execute_transaction(addr(4), 0, &mut ledger).unwrap();

        assert_eq!(ledger.balance_of(&recipient), 500);
        assert_eq!(wallet.balance(&ledger), 1_500);
        assert!(wallet.transaction(0).unwrap().executed);
        assert!(wallet.is_consistent());

        // Event order: deposit, submit, three confirms, execute
        let events = ledger.events_for(&wallet.address());
        assert!(matches!(events[0], WalletEvent::Deposit { .. }));
        assert!(matches!(events[1], WalletEvent::SubmitTransaction { .. }));
        assert!(matches!(events[2], WalletEvent::ConfirmTransaction { .. }));
        assert!(matches!(events[3], WalletEvent::ConfirmTransaction { .. }));
        assert!(matches!(events[4], WalletEvent::ConfirmTransaction { .. }));
        assert!(matches!(
            events[5],
            WalletEvent::ExecuteTransaction { executor, index: 0, .. } if *executor == addr(4)
        ));
        assert_eq!(events.len(), 6);
    }

    #[test]
    fn test_execute_insufficient_balance_rolls_back() {
        let (mut wallet, mut ledger) = setup(4);
        let funder = addr(50);
        ledger.mint(funder, 2_000);
        wallet.deposit(funder, 2_000, &mut ledger).unwrap();

        // Proposal for five times the balance
        wallet
            .submit_transaction(addr(1), addr(60), 10_000, Vec::new(), &mut ledger)
            .unwrap();
        wallet.confirm_transaction(addr(1), 0, &mut ledger).unwrap();
        wallet.confirm_transaction(addr(2), 0, &mut ledger).unwrap();
        wallet.confirm_transaction(addr(3), 0, &mut ledger).unwrap();

        let result = wallet.execute_transaction(addr(4), 0, &mut ledger);
        assert!(matches!(result, Err(WalletError::TransferFailed(_))));

        // No trace: flag rolled back, balances unchanged, no execute event
        assert!(!wallet.transaction(0).unwrap().executed);
        assert_eq!(wallet.balance(&ledger), 2_000);
        assert_eq!(ledger.balance_of(&addr(60)), 0);
        assert!(!ledger
            .events_for(&wallet.address())
            .iter()
            .any(|e| matches!(e, WalletEvent::ExecuteTransaction { .. })));

        // Still pending; succeeds once the wallet is funded
        ledger.mint(funder, 10_000);
        wallet.deposit(funder, 10_000, &mut ledger).unwrap();
        wallet.execute_transaction(addr(4), 0, &mut ledger).unwrap();
        assert!(wallet.transaction(0).unwrap().executed);
        assert_eq!(ledger.balance_of(&addr(60)), 10_000);
    }

    #[test]
    fn test_executed_is_terminal() {
        let (mut wallet, mut ledger) = setup(3);
        ledger.mint(addr(50), 1_000);
        wallet.deposit(addr(50), 1_000, &mut ledger).unwrap();

        wallet
            .submit_transaction(addr(1), addr(60), 100, Vec::new(), &mut ledger)
            .unwrap();
        for owner in 1..=3 {
            wallet
                .confirm_transaction(addr(owner), 0, &mut ledger)
                .unwrap();
        }
        wallet.execute_transaction(addr(1), 0, &mut ledger).unwrap();

        // Every further mutation is rejected and the flag stays set
        assert!(matches!(
            wallet.execute_transaction(addr(2), 0, &mut ledger),
            Err(WalletError::TransactionAlreadyExecuted(0))
        ));
        assert!(matches!(
            wallet.confirm_transaction(addr(2), 0, &mut ledger),
            Err(WalletError::TransactionAlreadyExecuted(0))
        ));
        assert!(matches!(
            wallet.revoke_confirmation(addr(1), 0, &mut ledger),
            Err(WalletError::TransactionAlreadyExecuted(0))
        ));
        assert!(wallet.transaction(0).unwrap().executed);
        assert!(wallet.is_consistent());
    }

    #[test]
    fn test_quorum_is_fixed_regardless_of_owner_count() {
        // Ten owners, still three confirmations suffice
        let (mut wallet, mut ledger) = setup(10);
        ledger.mint(addr(50), 1_000);
        wallet.deposit(addr(50), 1_000, &mut ledger).unwrap();

        wallet
            .submit_transaction(addr(1), addr(60), 100, Vec::new(), &mut ledger)
            .unwrap();
        for owner in 1..=3 {
            wallet
                .confirm_transaction(addr(owner), 0, &mut ledger)
                .unwrap();
        }
        wallet.execute_transaction(addr(10), 0, &mut ledger).unwrap();
        assert!(wallet.transaction(0).unwrap().executed);
    }

    #[test]
    fn test_keypair_derived_owners() {
        let _ = env_logger::builder().is_test(true).try_init();
        let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
        let owners: Vec<Address> = keys.iter().map(|k| k.address()).collect();

        let mut wallet = MultiOwnerWallet::new(addr(100), owners.clone()).unwrap();
        let mut ledger = Ledger::new();

        wallet
            .submit_transaction(owners[0], addr(60), 0, Vec::new(), &mut ledger)
            .unwrap();
        for owner in &owners {
            wallet.confirm_transaction(*owner, 0, &mut ledger).unwrap();
        }
        wallet
            .execute_transaction(owners[0], 0, &mut ledger)
            .unwrap();
        assert!(wallet.transaction(0).unwrap().executed);
    }

    #[test]
    fn test_consistency_across_interleaved_operations() {
        let (mut wallet, mut ledger) = setup(5);
        wallet
            .submit_transaction(addr(1), addr(60), 100, Vec::new(), &mut ledger)
            .unwrap();
        wallet
            .submit_transaction(addr(2), addr(61), 200, Vec::new(), &mut ledger)
            .unwrap();

        wallet.confirm_transaction(addr(1), 0, &mut ledger).unwrap();
        assert!(wallet.is_consistent());
        wallet.confirm_transaction(addr(1), 1, &mut ledger).unwrap();
        assert!(wallet.is_consistent());
        wallet.confirm_transaction(addr(2), 0, &mut ledger).unwrap();
        assert!(wallet.is_consistent());
        wallet.revoke_confirmation(addr(1), 0, &mut ledger).unwrap();
        assert!(wallet.is_consistent());
        wallet.confirm_transaction(addr(3), 1, &mut ledger).unwrap();
        assert!(wallet.is_consistent());

        assert_eq!(wallet.transaction(0).unwrap().confirmations, 1);
        assert_eq!(wallet.transaction(1).unwrap().confirmations, 2);
    }
}
