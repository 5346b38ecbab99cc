// 3.0: holdings in one symbol. entry_price is the CUMULATIVE cost basis:
// raised by each buy's notional, lowered by each sell's notional. it is an
// aggregate, never divided into a per-share average, and it can go negative
// once sells have returned more cash than the buys spent.
// 3.1 has the buy/sell application logic at the bottom.

use serde::{Deserialize, Serialize};

use crate::types::{Cash, Price, ShareCount, Symbol};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: Symbol,
    pub shares: ShareCount,
    pub sector: String,
    pub entry_price: Cash,
}

impl Position {
    /// First buy of a symbol opens the position.
    pub fn opened_by_buy(symbol: Symbol, shares: ShareCount, price: Price, sector: &str) -> Self {
        Self {
            symbol,
            entry_price: price.notional(shares),
            shares,
            sector: sector.to_string(),
        }
    }

    // zero shares left. the position is still kept: entry_price is history.
    pub fn is_empty(&self) -> bool {
        self.shares.is_zero()
    }

    // 3.1: buys stack onto the holding. sector refreshes from the quote.
    pub fn apply_buy(&self, shares: ShareCount, price: Price, sector: &str) -> Position {
        Position {
            symbol: self.symbol.clone(),
            shares: self.shares.add(shares),
            sector: sector.to_string(),
            entry_price: self.entry_price.add(price.notional(shares)),
        }
    }

    // None when the holding cannot cover the sale. share counts are unsigned,
    // so an oversell is unrepresentable rather than silently negative.
    #[must_use]
    pub fn apply_sell(&self, shares: ShareCount, price: Price, sector: &str) -> Option<Position> {
        let remaining = self.shares.checked_sub(shares)?;
        Some(Position {
            symbol: self.symbol.clone(),
            shares: remaining,
            sector: sector.to_string(),
            entry_price: self.entry_price.sub(price.notional(shares)),
        })
    }
}
