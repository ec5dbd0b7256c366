// tests/valuation.rs
// Mark-to-market behavior

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use nifty_desk::application::usecase::{mark_to_market, PriceBook};
use nifty_desk::domain::errors::MarketDataError;
use nifty_desk::domain::models::{percent_change, Holding, Portfolio};

fn holding(name: &str, buy: Decimal, cur: Decimal, units: Decimal) -> Holding {
    Holding {
        name: name.to_string(),
        buying_price: buy,
        current_price: cur,
        units,
        total_amount: (cur * units).round_dp(2),
        percent_change: percent_change(cur, buy),
    }
}

fn sample_portfolio() -> Portfolio {
    Portfolio::new(vec![
        holding("BEL", dec!(300), dec!(300), dec!(10)),
        holding("MCX", dec!(6000), dec!(6000), dec!(2)),
        Holding::cash(dec!(1500)),
    ])
}

fn sample_prices() -> PriceBook {
    let mut prices = PriceBook::default();
    prices.insert("BEL", dec!(312.4));
    prices.insert("MCX", dec!(5875.05));
    prices
}

#[test]
fn revalues_every_priced_row() {
    let outcome = mark_to_market(sample_portfolio(), &sample_prices());
    assert!(outcome.stale.is_empty());

    let bel = &outcome.portfolio.holdings[0];
    assert_eq!(bel.buying_price, dec!(300));
    assert_eq!(bel.current_price, dec!(312.40));
    assert_eq!(bel.total_amount, dec!(3124.00));
    assert_eq!(bel.percent_change, dec!(4.13));

    let mcx = &outcome.portfolio.holdings[1];
    assert_eq!(mcx.units, dec!(2));
    assert_eq!(mcx.total_amount, dec!(11750.10));
    assert_eq!(mcx.percent_change, dec!(-2.08));
}

#[test]
fn symbol_match_is_case_insensitive() {
    let portfolio = Portfolio::new(vec![holding("bel", dec!(300), dec!(300), dec!(10))]);
    let outcome = mark_to_market(portfolio, &sample_prices());
    assert_eq!(outcome.portfolio.holdings[0].current_price, dec!(312.40));
}

#[test]
fn missing_symbol_leaves_its_row_untouched() {
    let mut prices = PriceBook::default();
    prices.insert("BEL", dec!(312.4));

    let before = sample_portfolio();
    let outcome = mark_to_market(before.clone(), &prices);

    assert_eq!(outcome.portfolio.holdings[1], before.holdings[1]);
    assert_eq!(outcome.stale.len(), 1);
    assert!(matches!(
        &outcome.stale[0],
        MarketDataError::PriceUnavailable(symbol) if symbol == "MCX"
    ));

    // The priced row still updated.
    assert_eq!(outcome.portfolio.holdings[0].current_price, dec!(312.40));
}

#[test]
fn cash_row_is_never_touched() {
    let mut prices = sample_prices();
    // Even a hostile book entry for "Cash" must not apply.
    prices.insert("CASH", dec!(2.00));

    let outcome = mark_to_market(sample_portfolio(), &prices);
    let cash = outcome.portfolio.holdings.last().unwrap();
    assert!(cash.is_cash());
    assert_eq!(cash.current_price, dec!(1500.00));
    assert_eq!(cash.total_amount, dec!(1500.00));
    assert_eq!(cash.units, Decimal::ONE);
}

#[test]
fn marking_twice_equals_marking_once() {
    let prices = sample_prices();
    let once = mark_to_market(sample_portfolio(), &prices).portfolio;
    let twice = mark_to_market(once.clone(), &prices).portfolio;
    assert_eq!(once, twice);
}

#[test]
fn zero_cost_basis_reports_zero_change() {
    let portfolio = Portfolio::new(vec![holding("BEL", dec!(0), dec!(0), dec!(10))]);
    let outcome = mark_to_market(portfolio, &sample_prices());
    let bel = &outcome.portfolio.holdings[0];
    assert_eq!(bel.current_price, dec!(312.40));
    assert_eq!(bel.percent_change, Decimal::ZERO);
}

#[test]
fn row_order_is_preserved() {
    let portfolio = Portfolio::new(vec![
        holding("MCX", dec!(6000), dec!(6000), dec!(2)),
        Holding::cash(dec!(100)),
        holding("BEL", dec!(300), dec!(300), dec!(10)),
    ]);
    let outcome = mark_to_market(portfolio, &sample_prices());
    let names: Vec<&str> = outcome
        .portfolio
        .holdings
        .iter()
        .map(|h| h.name.as_str())
        .collect();
    assert_eq!(names, vec!["MCX", "Cash", "BEL"]);
}
