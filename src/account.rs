//! User accounts: one cash balance plus the map of open positions.
//!
//! Accounts are snapshots here. Mutation happens by replacing state through the
//! ledger store after a settlement decision, never in place mid-flight.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::position::Position;
use crate::types::{Cash, ShareCount, Symbol, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub balance: Cash,
    pub investments: HashMap<Symbol, Position>,
    pub created_at: Timestamp,
}

impl UserAccount {
    pub fn new(id: UserId, username: impl Into<String>, opening_balance: Cash, timestamp: Timestamp) -> Self {
        Self {
            id,
            username: username.into(),
            balance: opening_balance,
            investments: HashMap::new(),
            created_at: timestamp,
        }
    }

    pub fn position(&self, symbol: &Symbol) -> Option<&Position> {
        self.investments.get(symbol)
    }

    /// Shares currently held in `symbol`; zero when no position exists.
    pub fn held_shares(&self, symbol: &Symbol) -> ShareCount {
        self.investments
            .get(symbol)
            .map(|p| p.shares)
            .unwrap_or_else(ShareCount::zero)
    }

    pub fn set_position(&mut self, position: Position) {
        self.investments.insert(position.symbol.clone(), position);
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            username: self.username.clone(),
            balance: self.balance,
        }
    }
}

/// Read-only projection for display: who and how much cash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub username: String,
    pub balance: Cash,
}
