// 5.0: the settlement engine. pure decision logic: given an account snapshot,
// an order ticket, and the quote it was priced against, decide acceptance and
// compute the resulting balance and position. deterministic, no I/O, no clock.
// callers persist what this returns; nothing here touches a store.
// 5.2 has the top-up engine, which shares the same discipline.

use crate::account::UserAccount;
use crate::order::{OrderSide, OrderTicket};
use crate::position::Position;
use crate::quote::StockQuote;
use crate::transaction::{Transaction, TransactionStatus};
use crate::types::{Cash, ShareCount, Timestamp, UserId};
use std::fmt;

/// Why an attempt was refused. Every reason pairs with a `Failed` transaction
/// carrying the attempted numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    InsufficientBalance { required: Cash, available: Cash },
    InsufficientShares { requested: ShareCount, held: ShareCount },
    EmptyOrder,
    NonPositiveTopUp { amount: Cash },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientBalance { required, available } => {
                write!(f, "insufficient balance: required {required}, available {available}")
            }
            Self::InsufficientShares { requested, held } => {
                write!(f, "insufficient shares: requested {requested}, held {held}")
            }
            Self::EmptyOrder => write!(f, "order must be for at least one share"),
            Self::NonPositiveTopUp { amount } => {
                write!(f, "top-up amount must be positive, got {amount}")
            }
        }
    }
}

/// The decision. `Settled` carries the state the caller must persist together
/// with the settled transaction, as one atomic unit. `Rejected` carries only
/// the failed transaction: balance and positions stay untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Settled {
        new_balance: Cash,
        /// Post-trade position for orders; `None` for top-ups.
        position: Option<Position>,
        transaction: Transaction,
    },
    Rejected {
        reason: RejectReason,
        transaction: Transaction,
    },
}

impl Outcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled { .. })
    }

    pub fn transaction(&self) -> &Transaction {
        match self {
            Self::Settled { transaction, .. } | Self::Rejected { transaction, .. } => transaction,
        }
    }
}

// 5.1: order settlement. the ticket was priced against `quote` by the caller.
pub fn settle(
    account: &UserAccount,
    ticket: &OrderTicket,
    quote: &StockQuote,
    now: Timestamp,
) -> Outcome {
    debug_assert_eq!(ticket.symbol, quote.symbol, "ticket priced against wrong quote");

    let trade_tx = |status: TransactionStatus| {
        Transaction::trade(
            account.id,
            ticket.side,
            ticket.symbol.clone(),
            ticket.shares,
            quote.price,
            status,
            now,
        )
    };

    // zero-share tickets are refused upstream; guard here anyway rather than
    // settling a no-op
    if ticket.shares.is_zero() {
        return Outcome::Rejected {
            reason: RejectReason::EmptyOrder,
            transaction: trade_tx(TransactionStatus::Failed),
        };
    }

    let notional = quote.price.notional(ticket.shares);

    match ticket.side {
        OrderSide::Buy => {
            if account.balance < notional {
                return Outcome::Rejected {
                    reason: RejectReason::InsufficientBalance {
                        required: notional,
                        available: account.balance,
                    },
                    transaction: trade_tx(TransactionStatus::Failed),
                };
            }

            let new_balance = account.balance.sub(notional);
            debug_assert!(!new_balance.is_negative());

            let position = match account.position(&ticket.symbol) {
                Some(existing) => existing.apply_buy(ticket.shares, quote.price, &quote.sector),
                None => Position::opened_by_buy(
                    ticket.symbol.clone(),
                    ticket.shares,
                    quote.price,
                    &quote.sector,
                ),
            };

            Outcome::Settled {
                new_balance,
                position: Some(position),
                transaction: trade_tx(TransactionStatus::Settled),
            }
        }
        OrderSide::Sell => {
            let held = account.held_shares(&ticket.symbol);
            let updated = account
                .position(&ticket.symbol)
                .and_then(|p| p.apply_sell(ticket.shares, quote.price, &quote.sector));

            match updated {
                Some(position) => Outcome::Settled {
                    new_balance: account.balance.add(notional),
                    position: Some(position),
                    transaction: trade_tx(TransactionStatus::Settled),
                },
                None => Outcome::Rejected {
                    reason: RejectReason::InsufficientShares {
                        requested: ticket.shares,
                        held,
                    },
                    transaction: trade_tx(TransactionStatus::Failed),
                },
            }
        }
    }
}

// 5.2: cash top-up. non-positive amounts are refused; there is no withdrawal
// operation on this surface.
pub fn top_up(user: UserId, amount: Cash, current_balance: Cash, now: Timestamp) -> Outcome {
    if !amount.is_positive() {
        return Outcome::Rejected {
            reason: RejectReason::NonPositiveTopUp { amount },
            transaction: Transaction::top_up(user, amount, TransactionStatus::Failed, now),
        };
    }

    let new_balance = current_balance.add(amount);
    debug_assert!(!new_balance.is_negative());

    Outcome::Settled {
        new_balance,
        position: None,
        transaction: Transaction::top_up(user, amount, TransactionStatus::Settled, now),
    }
}
