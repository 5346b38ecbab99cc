// 4.0: every attempt, settled or failed, becomes one immutable transaction
// record. append-only: the ledger assigns ids at append time and nothing
// mutates a record afterwards.

use serde::{Deserialize, Serialize};

use crate::order::OrderSide;
use crate::types::{Cash, Price, ShareCount, Symbol, Timestamp, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Settled,
    Failed,
}

impl TransactionStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled)
    }
}

// what the attempt was: a cash top-up, or a priced order leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransactionDetail {
    TopUp {
        amount: Cash,
    },
    Trade {
        side: OrderSide,
        symbol: Symbol,
        shares: ShareCount,
        price: Price,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub user: UserId,
    pub detail: TransactionDetail,
    pub status: TransactionStatus,
    pub created_at: Timestamp,
}

impl Transaction {
    pub fn trade(
        user: UserId,
        side: OrderSide,
        symbol: Symbol,
        shares: ShareCount,
        price: Price,
        status: TransactionStatus,
        created_at: Timestamp,
    ) -> Self {
        Self {
            user,
            detail: TransactionDetail::Trade {
                side,
                symbol,
                shares,
                price,
            },
            status,
            created_at,
        }
    }

    pub fn top_up(user: UserId, amount: Cash, status: TransactionStatus, created_at: Timestamp) -> Self {
        Self {
            user,
            detail: TransactionDetail::TopUp { amount },
            status,
            created_at,
        }
    }

    /// The record's kind for logs and display: `topUp`, `buy`, or `sell`.
    pub fn kind(&self) -> &'static str {
        match &self.detail {
            TransactionDetail::TopUp { .. } => "topUp",
            TransactionDetail::Trade { side, .. } => match side {
                OrderSide::Buy => "buy",
                OrderSide::Sell => "sell",
            },
        }
    }
}
