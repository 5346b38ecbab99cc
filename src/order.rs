// 2.0: order tickets. what a user submits: side, symbol, share count.
// pricing happens later, against a quote the caller fetched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{ShareCount, Symbol};

// Buy spends cash for shares. Sell does the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

// anything other than "buy"/"sell" is refused at the edge. inside the crate
// an order side is always one of the two variants.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported order type: {0}")]
pub struct UnsupportedOrderType(pub String);

impl FromStr for OrderSide {
    type Err = UnsupportedOrderType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(UnsupportedOrderType(other.to_string())),
        }
    }
}

// 2.1: one order attempt. share count zero is caught by the settlement engine,
// not here: a ticket is plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTicket {
    pub symbol: Symbol,
    pub shares: ShareCount,
    pub side: OrderSide,
}

impl OrderTicket {
    pub fn new(symbol: Symbol, shares: ShareCount, side: OrderSide) -> Self {
        Self {
            symbol,
            shares,
            side,
        }
    }
}
