// broker-core: cash-account brokerage settlement engine.
// ledger-first architecture: every order attempt leaves an immutable
// transaction record, and balance/position writes are conditional on the
// state they were decided from. the settlement core is deterministic with
// no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: UserId, Symbol, ShareCount, Price, Cash
//   2.x  order.rs: order side and ticket, edge parsing
//   3.x  position.rs: holdings, cumulative cost-basis math
//   4.x  transaction.rs: immutable attempt records
//   5.x  settlement.rs: the decision engine: settle + top_up
//   6.x  ledger.rs: repository boundary, versioned conditional writes
//   7.x  brokerage.rs: read-decide-write orchestration, conflict retry
//   account.rs: user account aggregate + display projection
//   quote.rs: quote provider boundary (trait + static table)
//   config.rs: env-sourced settings for embedders

// core settlement modules
pub mod account;
pub mod order;
pub mod position;
pub mod settlement;
pub mod transaction;
pub mod types;

// integration modules
pub mod brokerage;
pub mod config;
pub mod ledger;
pub mod quote;

// re exports for convenience
pub use account::{AccountSummary, UserAccount};
pub use brokerage::{Brokerage, BrokerError, DEFAULT_CONFLICT_RETRIES};
pub use config::{QuoteSource, Settings};
pub use ledger::{InMemoryLedger, LedgerEntry, LedgerError, LedgerStore, TransactionId, VersionedAccount};
pub use order::{OrderSide, OrderTicket, UnsupportedOrderType};
pub use position::Position;
pub use quote::{QuoteError, QuoteProvider, StaticQuotes, StockQuote};
pub use settlement::{settle, top_up, Outcome, RejectReason};
pub use transaction::{Transaction, TransactionDetail, TransactionStatus};
pub use types::{Cash, Price, ShareCount, Symbol, Timestamp, UserId};
