// 6.0: the ledger store. durable system of record for balances, positions, and
// the append-only transaction log, behind a trait so the storage engine stays
// swappable. the trait contract carries the two consistency rules the whole
// system leans on:
//   - apply_settlement is CONDITIONAL on the version observed at read time.
//     a concurrent writer moves the version and the late writer gets
//     VersionConflict instead of clobbering state.
//   - balance, position upsert, and transaction append for one settled order
//     land as one atomic unit.
// 6.2 has the in-memory reference implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::account::{AccountSummary, UserAccount};
use crate::position::Position;
use crate::transaction::Transaction;
use crate::types::{Cash, UserId};

/// Sequence number the ledger assigns to a transaction at append time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TransactionId(pub u64);

/// One appended record: the id the ledger assigned plus the immutable payload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LedgerEntry {
    pub id: TransactionId,
    pub transaction: Transaction,
}

/// Account snapshot plus the per-user version that conditional writes check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedAccount {
    pub account: UserAccount,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("stale write for user {user_id}: account changed since it was read")]
    VersionConflict { user_id: UserId },

    #[error("refusing to persist negative balance {balance} for user {user_id}")]
    NegativeBalance { user_id: UserId, balance: Cash },

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    /// Conflicts and outages are worth retrying; the rest are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. } | Self::Unavailable(_))
    }
}

/// 6.1: the repository boundary. read-one, conditional-write, append.
pub trait LedgerStore {
    /// Current account state plus its version.
    fn read_user(&self, user_id: UserId) -> Result<VersionedAccount, LedgerError>;

    /// Persist one settled order: balance, optional position upsert, and the
    /// settled transaction, atomically, if and only if the stored version
    /// still equals `expected_version`.
    fn apply_settlement(
        &self,
        user_id: UserId,
        expected_version: u64,
        new_balance: Cash,
        position: Option<Position>,
        transaction: Transaction,
    ) -> Result<TransactionId, LedgerError>;

    /// Append a transaction with no state change. Used for failed attempts.
    fn append_transaction(&self, transaction: Transaction) -> Result<TransactionId, LedgerError>;

    /// Display projection: username and balance.
    fn read_summary(&self, user_id: UserId) -> Result<AccountSummary, LedgerError>;

    /// The user's slice of the append-only log, in append order.
    fn transactions_for(&self, user_id: UserId) -> Result<Vec<LedgerEntry>, LedgerError>;
}

// 6.2: in-memory ledger. thread-safe reference implementation: one RwLock over
// all state, so a conditional write and its log append happen under a single
// write acquisition.
#[derive(Debug)]
struct Inner {
    accounts: HashMap<UserId, VersionedAccount>,
    log: Vec<LedgerEntry>,
    next_tx_id: u64,
}

#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                accounts: HashMap::new(),
                log: Vec::new(),
                next_tx_id: 1,
            })),
        }
    }

    /// Register an account. Test/sim setup; production onboarding lives
    /// outside this core.
    pub fn create_user(&self, account: UserAccount) -> Result<(), LedgerError> {
        let mut inner = self.write()?;
        inner
            .accounts
            .insert(account.id, VersionedAccount { account, version: 0 });
        Ok(())
    }

    pub fn transaction_count(&self) -> usize {
        self.inner.read().map(|i| i.log.len()).unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, LedgerError> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Unavailable("ledger lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, LedgerError> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Unavailable("ledger lock poisoned".to_string()))
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn append_locked(inner: &mut Inner, transaction: Transaction) -> TransactionId {
    let id = TransactionId(inner.next_tx_id);
    inner.next_tx_id += 1;
    inner.log.push(LedgerEntry { id, transaction });
    id
}

impl LedgerStore for InMemoryLedger {
    fn read_user(&self, user_id: UserId) -> Result<VersionedAccount, LedgerError> {
        let inner = self.read()?;
        inner
            .accounts
            .get(&user_id)
            .cloned()
            .ok_or(LedgerError::UserNotFound(user_id))
    }

    fn apply_settlement(
        &self,
        user_id: UserId,
        expected_version: u64,
        new_balance: Cash,
        position: Option<Position>,
        transaction: Transaction,
    ) -> Result<TransactionId, LedgerError> {
        debug_assert!(transaction.status.is_settled());

        if new_balance.is_negative() {
            return Err(LedgerError::NegativeBalance {
                user_id,
                balance: new_balance,
            });
        }

        let mut inner = self.write()?;

        let entry = inner
            .accounts
            .get_mut(&user_id)
            .ok_or(LedgerError::UserNotFound(user_id))?;

        if entry.version != expected_version {
            return Err(LedgerError::VersionConflict { user_id });
        }

        entry.account.balance = new_balance;
        if let Some(position) = position {
            entry.account.set_position(position);
        }
        entry.version += 1;

        Ok(append_locked(&mut inner, transaction))
    }

    fn append_transaction(&self, transaction: Transaction) -> Result<TransactionId, LedgerError> {
        let mut inner = self.write()?;
        Ok(append_locked(&mut inner, transaction))
    }

    fn read_summary(&self, user_id: UserId) -> Result<AccountSummary, LedgerError> {
        let inner = self.read()?;
        inner
            .accounts
            .get(&user_id)
            .map(|v| v.account.summary())
            .ok_or(LedgerError::UserNotFound(user_id))
    }

    fn transactions_for(&self, user_id: UserId) -> Result<Vec<LedgerEntry>, LedgerError> {
        let inner = self.read()?;
        Ok(inner
            .log
            .iter()
            .filter(|e| e.transaction.user == user_id)
            .cloned()
            .collect())
    }
}
