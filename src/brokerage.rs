// 7.0: the brokerage front. owns the read-decide-write span around the pure
// settlement engine: fetch the quote, read versioned account state, decide,
// then persist through the ledger's conditional write. a VersionConflict
// restarts the WHOLE decision against fresh state, bounded by the retry cap,
// so two concurrent orders for one user can never both spend the same cash.

use tracing::{info, warn};

use crate::account::AccountSummary;
use crate::ledger::{LedgerEntry, LedgerError, LedgerStore};
use crate::order::OrderTicket;
use crate::quote::{QuoteError, QuoteProvider};
use crate::settlement::{self, Outcome};
use crate::types::{Cash, Timestamp, UserId};

pub const DEFAULT_CONFLICT_RETRIES: u32 = 3;

/// Infrastructure failures surfaced to the caller. Business rejections are not
/// errors: they come back as `Ok(Outcome::Rejected { .. })`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerError {
    #[error("quote lookup failed: {0}")]
    Quote(#[from] QuoteError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("settlement for user {user_id} kept conflicting after {attempts} attempts")]
    Contention { user_id: UserId, attempts: u32 },
}

impl BrokerError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Quote(e) => e.is_retryable(),
            Self::Ledger(e) => e.is_retryable(),
            Self::Contention { .. } => true,
        }
    }
}

pub struct Brokerage<L, Q> {
    ledger: L,
    quotes: Q,
    max_conflict_retries: u32,
}

impl<L: LedgerStore, Q: QuoteProvider> Brokerage<L, Q> {
    pub fn new(ledger: L, quotes: Q) -> Self {
        Self {
            ledger,
            quotes,
            max_conflict_retries: DEFAULT_CONFLICT_RETRIES,
        }
    }

    pub fn with_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    /// Price the ticket against a fresh quote, settle, persist. Quote failures
    /// happen before any priced attempt exists, so they record nothing.
    pub fn place_order(&self, user_id: UserId, ticket: &OrderTicket) -> Result<Outcome, BrokerError> {
        let quote = self.quotes.get_quote(&ticket.symbol)?;

        for attempt in 0..=self.max_conflict_retries {
            let versioned = self.ledger.read_user(user_id)?;
            let outcome = settlement::settle(&versioned.account, ticket, &quote, Timestamp::now());

            match outcome {
                Outcome::Settled {
                    new_balance,
                    position,
                    transaction,
                } => {
                    match self.ledger.apply_settlement(
                        user_id,
                        versioned.version,
                        new_balance,
                        position.clone(),
                        transaction.clone(),
                    ) {
                        Ok(tx_id) => {
                            info!(
                                user = %user_id,
                                side = %ticket.side,
                                symbol = %ticket.symbol,
                                shares = %ticket.shares,
                                price = %quote.price,
                                tx = tx_id.0,
                                "order settled"
                            );
                            return Ok(Outcome::Settled {
                                new_balance,
                                position,
                                transaction,
                            });
                        }
                        Err(LedgerError::VersionConflict { .. }) => {
                            warn!(
                                user = %user_id,
                                attempt,
                                "account changed while settling, retrying against fresh state"
                            );
                            continue;
                        }
                        Err(other) => return Err(other.into()),
                    }
                }
                Outcome::Rejected { reason, transaction } => {
                    let tx_id = self.ledger.append_transaction(transaction.clone())?;
                    info!(
                        user = %user_id,
                        side = %ticket.side,
                        symbol = %ticket.symbol,
                        reason = %reason,
                        tx = tx_id.0,
                        "order rejected"
                    );
                    return Ok(Outcome::Rejected { reason, transaction });
                }
            }
        }

        Err(BrokerError::Contention {
            user_id,
            attempts: self.max_conflict_retries + 1,
        })
    }

    /// Cash deposit, same read-decide-write discipline over the balance.
    pub fn top_up(&self, user_id: UserId, amount: Cash) -> Result<Outcome, BrokerError> {
        for attempt in 0..=self.max_conflict_retries {
            let versioned = self.ledger.read_user(user_id)?;
            let outcome =
                settlement::top_up(user_id, amount, versioned.account.balance, Timestamp::now());

            match outcome {
                Outcome::Settled {
                    new_balance,
                    position,
                    transaction,
                } => {
                    match self.ledger.apply_settlement(
                        user_id,
                        versioned.version,
                        new_balance,
                        None,
                        transaction.clone(),
                    ) {
                        Ok(tx_id) => {
                            info!(user = %user_id, amount = %amount, tx = tx_id.0, "top-up settled");
                            return Ok(Outcome::Settled {
                                new_balance,
                                position,
                                transaction,
                            });
                        }
                        Err(LedgerError::VersionConflict { .. }) => {
                            warn!(user = %user_id, attempt, "balance changed while topping up, retrying");
                            continue;
                        }
                        Err(other) => return Err(other.into()),
                    }
                }
                Outcome::Rejected { reason, transaction } => {
                    let tx_id = self.ledger.append_transaction(transaction.clone())?;
                    info!(user = %user_id, reason = %reason, tx = tx_id.0, "top-up rejected");
                    return Ok(Outcome::Rejected { reason, transaction });
                }
            }
        }

        Err(BrokerError::Contention {
            user_id,
            attempts: self.max_conflict_retries + 1,
        })
    }

    pub fn account_summary(&self, user_id: UserId) -> Result<AccountSummary, BrokerError> {
        Ok(self.ledger.read_summary(user_id)?)
    }

    pub fn transaction_history(&self, user_id: UserId) -> Result<Vec<LedgerEntry>, BrokerError> {
        Ok(self.ledger.transactions_for(user_id)?)
    }
}
