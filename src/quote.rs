// Quote Provider Integration
//
// This module abstracts where prices come from. The settlement core is agnostic
// to whether quotes arrive from a market-data HTTP API, a cached feed, or a
// fixture table. We define the trait and types any quote source can implement.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{Price, Symbol};

/// A priced snapshot for one symbol: latest price plus the company sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: Symbol,
    pub price: Price,
    pub sector: String,
}

impl StockQuote {
    pub fn new(symbol: Symbol, price: Price, sector: impl Into<String>) -> Self {
        Self {
            symbol,
            price,
            sector: sector.into(),
        }
    }
}

/// Errors from quote lookup. A missing symbol is a terminal answer; an
/// unreachable provider is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    #[error("the stock {0} does not exist")]
    SymbolNotFound(Symbol),

    #[error("quote provider unavailable: {0}")]
    Unavailable(String),
}

impl QuoteError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Any source of quotes. Implementations own transport, caching, and auth.
pub trait QuoteProvider {
    fn get_quote(&self, symbol: &Symbol) -> Result<StockQuote, QuoteError>;
}

/// Deterministic in-memory quote table for tests and simulations.
#[derive(Debug, Clone, Default)]
pub struct StaticQuotes {
    quotes: HashMap<Symbol, StockQuote>,
    // when set, every lookup fails as if the upstream were down
    outage: Option<String>,
}

impl StaticQuotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, quote: StockQuote) {
        self.quotes.insert(quote.symbol.clone(), quote);
    }

    pub fn with_quote(mut self, quote: StockQuote) -> Self {
        self.insert(quote);
        self
    }

    pub fn set_outage(&mut self, reason: impl Into<String>) {
        self.outage = Some(reason.into());
    }

    pub fn clear_outage(&mut self) {
        self.outage = None;
    }
}

impl QuoteProvider for StaticQuotes {
    fn get_quote(&self, symbol: &Symbol) -> Result<StockQuote, QuoteError> {
        if let Some(reason) = &self.outage {
            return Err(QuoteError::Unavailable(reason.clone()));
        }
        self.quotes
            .get(symbol)
            .cloned()
            .ok_or_else(|| QuoteError::SymbolNotFound(symbol.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn abc() -> Symbol {
        Symbol::new("ABC").unwrap()
    }

    #[test]
    fn lookup_known_symbol() {
        let quotes = StaticQuotes::new().with_quote(StockQuote::new(
            abc(),
            Price::new_unchecked(dec!(50)),
            "Technology",
        ));

        let quote = quotes.get_quote(&abc()).unwrap();
        assert_eq!(quote.price.value(), dec!(50));
        assert_eq!(quote.sector, "Technology");
    }

    #[test]
    fn unknown_symbol_is_terminal() {
        let quotes = StaticQuotes::new();
        let err = quotes.get_quote(&abc()).unwrap_err();
        assert_eq!(err, QuoteError::SymbolNotFound(abc()));
        assert!(!err.is_retryable());
    }

    #[test]
    fn outage_is_retryable() {
        let mut quotes = StaticQuotes::new().with_quote(StockQuote::new(
            abc(),
            Price::new_unchecked(dec!(50)),
            "Technology",
        ));
        quotes.set_outage("connection refused");

        let err = quotes.get_quote(&abc()).unwrap_err();
        assert!(err.is_retryable());

        quotes.clear_outage();
        assert!(quotes.get_quote(&abc()).is_ok());
    }
}
