//! Brokerage Settlement Simulation.
//!
//! Walks the settlement core through its full lifecycle: funding, buys and
//! sells, rejection paths, cost-basis tracking, and concurrent orders racing
//! for the same balance.

use std::sync::Arc;
use std::thread;

use broker_core::*;
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let settings = Settings::from_env();
    init_logging(&settings);

    if let Err(errors) = settings.validate() {
        for e in &errors {
            eprintln!("Configuration error: {e}");
        }
        std::process::exit(1);
    }

    info!(source = ?settings.quote_source, "broker-sim starting");

    println!("Brokerage Settlement Core Simulation");
    println!("Single Ledger, Versioned Writes, Full Lifecycle\n");

    scenario_1_fund_and_first_buy(&settings);
    scenario_2_rejection_paths(&settings);
    scenario_3_sell_to_flat(&settings);
    scenario_4_cost_basis_round_trip(&settings);
    scenario_5_concurrent_double_spend(&settings);

    println!("\nAll simulations completed successfully.");
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_new(&settings.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn demo_quotes() -> StaticQuotes {
    StaticQuotes::new()
        .with_quote(StockQuote::new(
            Symbol::new("ABC").unwrap(),
            Price::new_unchecked(dec!(50)),
            "Technology",
        ))
        .with_quote(StockQuote::new(
            Symbol::new("XYZ").unwrap(),
            Price::new_unchecked(dec!(120)),
            "Healthcare",
        ))
}

fn demo_desk(settings: &Settings) -> (Brokerage<InMemoryLedger, StaticQuotes>, InMemoryLedger) {
    let ledger = InMemoryLedger::new();
    ledger
        .create_user(UserAccount::new(
            UserId(1),
            "alice",
            Cash::new(settings.default_opening_balance),
            Timestamp::now(),
        ))
        .unwrap();

    let desk = Brokerage::new(ledger.clone(), demo_quotes())
        .with_conflict_retries(settings.max_conflict_retries);
    (desk, ledger)
}

/// Top-up, then a first buy that opens a position.
fn scenario_1_fund_and_first_buy(settings: &Settings) {
    println!("Scenario 1: Fund and First Buy\n");

    let (desk, _ledger) = demo_desk(settings);
    let abc = Symbol::new("ABC").unwrap();

    desk.top_up(UserId(1), Cash::new(dec!(500))).unwrap();
    let summary = desk.account_summary(UserId(1)).unwrap();
    println!("  alice tops up $500, balance now ${}", summary.balance);

    let outcome = desk
        .place_order(UserId(1), &OrderTicket::new(abc.clone(), ShareCount::new(10), OrderSide::Buy))
        .unwrap();

    match outcome {
        Outcome::Settled { new_balance, position: Some(position), .. } => {
            println!("  BUY 10 ABC @ $50 settled");
            println!("  balance ${new_balance}, holding {} ABC, cost basis ${}\n", position.shares, position.entry_price);
        }
        other => println!("  unexpected outcome: {other:?}\n"),
    }
}

/// Insufficient balance and insufficient shares both leave failed records.
fn scenario_2_rejection_paths(settings: &Settings) {
    println!("Scenario 2: Rejection Paths\n");

    let (desk, _ledger) = demo_desk(settings);
    let xyz = Symbol::new("XYZ").unwrap();

    let outcome = desk
        .place_order(UserId(1), &OrderTicket::new(xyz.clone(), ShareCount::new(100), OrderSide::Buy))
        .unwrap();
    if let Outcome::Rejected { reason, .. } = &outcome {
        println!("  BUY 100 XYZ @ $120 rejected: {reason}");
    }

    let outcome = desk
        .place_order(UserId(1), &OrderTicket::new(xyz, ShareCount::new(5), OrderSide::Sell))
        .unwrap();
    if let Outcome::Rejected { reason, .. } = &outcome {
        println!("  SELL 5 XYZ rejected: {reason}");
    }

    let history = desk.transaction_history(UserId(1)).unwrap();
    println!("  {} failed transactions on record, balance untouched at ${}\n",
        history.len(),
        desk.account_summary(UserId(1)).unwrap().balance,
    );
}

/// Selling every held share keeps the position row at zero shares.
fn scenario_3_sell_to_flat(settings: &Settings) {
    println!("Scenario 3: Sell to Flat\n");

    let (desk, ledger) = demo_desk(settings);
    let abc = Symbol::new("ABC").unwrap();

    desk.place_order(UserId(1), &OrderTicket::new(abc.clone(), ShareCount::new(10), OrderSide::Buy))
        .unwrap();
    desk.place_order(UserId(1), &OrderTicket::new(abc.clone(), ShareCount::new(10), OrderSide::Sell))
        .unwrap();

    let account = ledger.read_user(UserId(1)).unwrap().account;
    let position = account.position(&abc).unwrap();
    println!("  bought 10, sold 10: balance back to ${}", account.balance);
    println!("  position retained at {} shares, cost basis ${}\n", position.shares, position.entry_price);
}

/// Cost basis is a running aggregate of notionals, never an average.
fn scenario_4_cost_basis_round_trip(settings: &Settings) {
    println!("Scenario 4: Aggregate Cost Basis\n");

    let (desk, ledger) = demo_desk(settings);
    let abc = Symbol::new("ABC").unwrap();

    desk.top_up(UserId(1), Cash::new(dec!(500))).unwrap();
    desk.place_order(UserId(1), &OrderTicket::new(abc.clone(), ShareCount::new(10), OrderSide::Buy))
        .unwrap();
    desk.place_order(UserId(1), &OrderTicket::new(abc.clone(), ShareCount::new(10), OrderSide::Buy))
        .unwrap();
    desk.place_order(UserId(1), &OrderTicket::new(abc.clone(), ShareCount::new(5), OrderSide::Sell))
        .unwrap();

    let account = ledger.read_user(UserId(1)).unwrap().account;
    let position = account.position(&abc).unwrap();
    println!("  buy 10 @ $50, buy 10 @ $50, sell 5 @ $50");
    println!("  holding {} shares, aggregate cost basis ${}\n", position.shares, position.entry_price);
}

/// Two orders race for one balance; the versioned write lets exactly one win.
fn scenario_5_concurrent_double_spend(settings: &Settings) {
    println!("Scenario 5: Concurrent Double Spend\n");

    let (desk, ledger) = demo_desk(settings);
    let desk = Arc::new(desk);

    // $1000 balance, two $800 orders: each affordable alone, not together
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let desk = Arc::clone(&desk);
            thread::spawn(move || {
                let ticket = OrderTicket::new(
                    Symbol::new("ABC").unwrap(),
                    ShareCount::new(16),
                    OrderSide::Buy,
                );
                desk.place_order(UserId(1), &ticket).unwrap()
            })
        })
        .collect();

    let outcomes: Vec<Outcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let settled = outcomes.iter().filter(|o| o.is_settled()).count();
    let rejected = outcomes.len() - settled;

    let account = ledger.read_user(UserId(1)).unwrap().account;
    println!("  two concurrent BUY 16 ABC @ $50 against $1000:");
    println!("  {settled} settled, {rejected} rejected, final balance ${}", account.balance);
    assert!(!account.balance.is_negative());
}
