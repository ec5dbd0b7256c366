// tests/ledger.rs
// Trade application behavior

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use nifty_desk::application::usecase::{apply_trades, rebuild, PriceBook};
use nifty_desk::domain::errors::LedgerError;
use nifty_desk::domain::models::{
    percent_change, Decision, Holding, Portfolio, TradeAction, TradeInstruction,
};

fn trade(action: TradeAction, symbol: &str, shares: Decimal, amount: Decimal) -> TradeInstruction {
    TradeInstruction {
        symbol: symbol.to_string(),
        action,
        shares,
        amount,
    }
}

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

#[test]
fn buying_two_lots_weights_the_cost_basis() {
    let trades = vec![
        trade(TradeAction::Buy, "BEL", dec!(10), dec!(1000)),
        trade(TradeAction::Buy, "BEL", dec!(10), dec!(2000)),
    ];
    let (table, _) = apply_trades(Portfolio::default(), dec!(5000), &trades).unwrap();

    let bel = &table.holdings[0];
    assert_eq!(bel.name, "BEL");
    assert_eq!(bel.buying_price, dec!(150.00));
    assert_eq!(bel.units, dec!(20));
    assert_eq!(bel.current_price, dec!(200.00));
    assert_eq!(bel.total_amount, dec!(4000.00));
}

#[test]
fn adding_to_a_position_marks_it_at_the_trade_price() {
    // Holding 10 units at 100; buying 10 more for 1100 implies a
    // 110 trade price and a 105 weighted cost basis.
    let table = Portfolio::new(vec![holding("RELIANCE", dec!(100), dec!(100), dec!(10))]);
    let trades = vec![trade(TradeAction::Buy, "RELIANCE", dec!(10), dec!(1100))];

    let (table, cash) = apply_trades(table, dec!(500), &trades).unwrap();

    let rel = &table.holdings[0];
    assert_eq!(rel.buying_price, dec!(105.00));
    assert_eq!(rel.current_price, dec!(110.00));
    assert_eq!(rel.units, dec!(20));
    assert_eq!(rel.total_amount, dec!(2200.00));
    assert_eq!(rel.percent_change, dec!(4.76));

    // No margin check: the balance goes negative and the Cash row
    // records it as-is.
    assert_eq!(cash, dec!(-600.00));
    let cash_row = table.holdings.last().unwrap();
    assert!(cash_row.is_cash());
    assert_eq!(cash_row.buying_price, dec!(-600.00));
    assert_eq!(cash_row.current_price, dec!(-600.00));
    assert_eq!(cash_row.total_amount, dec!(-600.00));
    assert_eq!(cash_row.units, Decimal::ONE);
    assert_eq!(cash_row.percent_change, Decimal::ZERO);
}

#[test]
fn cash_moves_by_exactly_the_trade_amounts() {
    let trades = vec![
        trade(TradeAction::Buy, "BEL", dec!(10), dec!(3124.00)),
        trade(TradeAction::Buy, "MCX", dec!(2), dec!(13000.50)),
        trade(TradeAction::Sell, "IRCTC", dec!(5), dec!(3600.25)),
    ];
    let table = Portfolio::new(vec![holding("IRCTC", dec!(700), dec!(700), dec!(10))]);

    let (_, cash) = apply_trades(table, dec!(20000), &trades).unwrap();
    assert_eq!(cash, dec!(20000) - dec!(3124.00) - dec!(13000.50) + dec!(3600.25));
}

#[test]
fn selling_every_unit_deletes_the_row() {
    let table = Portfolio::new(vec![holding("BEL", dec!(100), dec!(120), dec!(20))]);
    let trades = vec![trade(TradeAction::Sell, "BEL", dec!(20), dec!(2400))];

    let (table, cash) = apply_trades(table, dec!(0), &trades).unwrap();
    assert!(table.position("BEL").is_none());
    assert_eq!(cash, dec!(2400.00));
}

#[test]
fn overselling_also_deletes_the_row() {
    let table = Portfolio::new(vec![holding("BEL", dec!(100), dec!(120), dec!(20))]);
    let trades = vec![trade(TradeAction::Sell, "BEL", dec!(30), dec!(3600))];

    let (table, _) = apply_trades(table, dec!(0), &trades).unwrap();
    // No negative position surfaces.
    assert!(table.position("BEL").is_none());
    assert_eq!(table.holdings.len(), 1);
    assert!(table.holdings[0].is_cash());
}

#[test]
fn partial_sell_keeps_the_cost_basis() {
    let table = Portfolio::new(vec![holding("MCX", dec!(6000), dec!(6000), dec!(4))]);
    let trades = vec![trade(TradeAction::Sell, "MCX", dec!(2), dec!(13000))];

    let (table, _) = apply_trades(table, dec!(0), &trades).unwrap();
    let mcx = &table.holdings[0];
    assert_eq!(mcx.buying_price, dec!(6000.00));
    assert_eq!(mcx.units, dec!(2));
    assert_eq!(mcx.current_price, dec!(6500.00));
    assert_eq!(mcx.total_amount, dec!(13000.00));
    assert_eq!(mcx.percent_change, dec!(8.33));
}

#[test]
fn selling_an_unknown_symbol_still_credits_cash() {
    let trades = vec![trade(TradeAction::Sell, "GHOST", dec!(5), dec!(500))];
    let (table, cash) = apply_trades(Portfolio::default(), dec!(100), &trades).unwrap();

    assert_eq!(cash, dec!(600.00));
    assert!(table.position("GHOST").is_none());
}

#[test]
fn exactly_one_cash_row_and_it_comes_last() {
    let trades = vec![
        trade(TradeAction::Buy, "BEL", dec!(10), dec!(1000)),
        trade(TradeAction::Sell, "BEL", dec!(4), dec!(480)),
    ];
    let (table, _) = apply_trades(Portfolio::default(), dec!(2000), &trades).unwrap();

    let cash_rows: Vec<_> = table.holdings.iter().filter(|h| h.is_cash()).collect();
    assert_eq!(cash_rows.len(), 1);
    assert_eq!(cash_rows[0].units, Decimal::ONE);
    assert!(table.holdings.last().unwrap().is_cash());
}

#[test]
fn trade_order_changes_the_cost_basis() {
    let start = Portfolio::new(vec![holding("ABC", dec!(100), dec!(100), dec!(10))]);

    let buy_then_sell = vec![
        trade(TradeAction::Buy, "ABC", dec!(10), dec!(1500)),
        trade(TradeAction::Sell, "ABC", dec!(5), dec!(700)),
    ];
    let sell_then_buy = vec![
        trade(TradeAction::Sell, "ABC", dec!(5), dec!(700)),
        trade(TradeAction::Buy, "ABC", dec!(10), dec!(1500)),
    ];

    let (a, _) = apply_trades(start.clone(), dec!(0), &buy_then_sell).unwrap();
    let (b, _) = apply_trades(start, dec!(0), &sell_then_buy).unwrap();

    let basis_a = a.holdings[a.position("ABC").unwrap()].buying_price;
    let basis_b = b.holdings[b.position("ABC").unwrap()].buying_price;
    assert_eq!(basis_a, dec!(125.00));
    assert_eq!(basis_b, dec!(133.33));
}

#[test]
fn remove_drops_the_row_and_silences_later_trades() {
    let table = Portfolio::new(vec![holding("BEL", dec!(100), dec!(120), dec!(20))]);
    let trades = vec![
        trade(TradeAction::Remove, "BEL", dec!(0), dec!(0)),
        trade(TradeAction::Buy, "BEL", dec!(10), dec!(1200)),
    ];

    let (table, cash) = apply_trades(table, dec!(1000), &trades).unwrap();
    assert!(table.position("BEL").is_none());
    // The buy after the remove has no effect, cash included.
    assert_eq!(cash, dec!(1000.00));
}

#[test]
fn zero_share_trades_abort_the_batch() {
    let trades = vec![
        trade(TradeAction::Buy, "BEL", dec!(10), dec!(1000)),
        trade(TradeAction::Sell, "MCX", dec!(0), dec!(500)),
    ];
    let err = apply_trades(Portfolio::default(), dec!(5000), &trades).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::ZeroShares { index: 1, ref symbol } if symbol == "MCX"
    ));
}

#[test]
fn rebuild_starts_from_snapshot_cash_and_prices_the_result() {
    let decision = Decision::new(json!({
        "portfolio": { "holdings": ["BEL", "MCX"], "cash": 10000.0 },
        "trades": [
            { "symbol": "BEL", "action": "buy", "shares": 10, "amount": 3000.0 },
            { "symbol": "MCX", "action": "buy", "shares": 1, "amount": 6500.0 },
        ],
    }));

    let mut prices = PriceBook::default();
    prices.insert("BEL", dec!(310.40));

    let table = rebuild(&decision, &prices).unwrap();

    let bel = &table.holdings[table.position("BEL").unwrap()];
    assert_eq!(bel.buying_price, dec!(300.00));
    assert_eq!(bel.current_price, dec!(310.40));
    assert_eq!(bel.total_amount, dec!(3104.00));

    // No close for MCX: it stays at its trade price.
    let mcx = &table.holdings[table.position("MCX").unwrap()];
    assert_eq!(mcx.current_price, dec!(6500.00));

    let cash_row = table.holdings.last().unwrap();
    assert!(cash_row.is_cash());
    assert_eq!(cash_row.total_amount, dec!(500.00));
}

#[test]
fn malformed_trade_is_reported_with_its_position() {
    let decision = Decision::new(json!({
        "trades": [
            { "symbol": "BEL", "action": "buy", "shares": 10, "amount": 3000.0 },
            { "symbol": "MCX", "action": "buy" },
        ],
    }));
    let err = decision.trades().unwrap_err();
    assert!(matches!(err, LedgerError::Trade { index: 1, .. }));
}
