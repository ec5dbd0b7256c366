// src/application/usecase/ledger_usecase.rs
// Trade application and portfolio rebuild

use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::application::usecase::valuation_usecase::{mark_to_market, PriceBook};
use crate::domain::errors::{LedgerError, LedgerResult};
use crate::domain::models::{Decision, Holding, Portfolio, TradeAction, TradeInstruction};

/// Apply a batch of trade instructions to a holdings table.
///
/// `holdings` must not contain a Cash row; detach it first and pass
/// the balance as `cash`. Trades apply strictly in input order, since
/// a buy-then-sell pair on one symbol yields a different cost basis
/// than the reverse. A symbol closed by `remove` is excluded for the
/// remainder of the batch.
///
/// Returns the new table, Cash row appended last, together with the
/// final balance. Any error leaves nothing persisted: the caller only
/// writes the table on `Ok`.
pub fn apply_trades(
    mut holdings: Portfolio,
    mut cash: Decimal,
    trades: &[TradeInstruction],
) -> LedgerResult<(Portfolio, Decimal)> {
    let mut closed: HashSet<&str> = HashSet::new();

    for (index, trade) in trades.iter().enumerate() {
        if closed.contains(trade.symbol.as_str()) {
            log::warn!(
                "trade {} skipped: {} was closed earlier in this batch",
                index,
                trade.symbol
            );
            continue;
        }

        match trade.action {
            TradeAction::Remove => {
                if let Some(idx) = holdings.position(&trade.symbol) {
                    holdings.holdings.remove(idx);
                }
                closed.insert(trade.symbol.as_str());
            }
            TradeAction::Sell => sell(&mut holdings, &mut cash, index, trade)?,
            TradeAction::Buy => buy(&mut holdings, &mut cash, index, trade)?,
        }
    }

    for holding in &mut holdings.holdings {
        holding.round();
    }
    cash = cash.round_dp(2);
    holdings.holdings.push(Holding::cash(cash));
    Ok((holdings, cash))
}

/// Rebuild a holdings table from scratch out of a decision payload,
/// then value it with the supplied closes. Starting cash comes from
/// the payload's portfolio snapshot when one is present.
pub fn rebuild(decision: &Decision, prices: &PriceBook) -> LedgerResult<Portfolio> {
    let trades = decision.trades()?;
    let snapshot = decision.snapshot();
    let starting_cash = snapshot
        .as_ref()
        .map(|s| s.cash)
        .unwrap_or(Decimal::ZERO);

    let (portfolio, _) = apply_trades(Portfolio::default(), starting_cash, &trades)?;

    if let Some(snapshot) = snapshot {
        for name in &snapshot.holdings {
            if portfolio.position(name).is_none() {
                log::warn!("snapshot lists {} but no trade opened it", name);
            }
        }
    }

    Ok(mark_to_market(portfolio, prices).portfolio)
}

/// Per-unit price implied by the instruction's notional.
fn effective_price(index: usize, trade: &TradeInstruction) -> LedgerResult<Decimal> {
    if trade.shares.is_zero() {
        return Err(LedgerError::ZeroShares {
            index,
            symbol: trade.symbol.clone(),
        });
    }
    Ok((trade.amount.round_dp(2) / trade.shares).round_dp(2))
}

fn sell(
    holdings: &mut Portfolio,
    cash: &mut Decimal,
    index: usize,
    trade: &TradeInstruction,
) -> LedgerResult<()> {
    let price = effective_price(index, trade)?;
    let amount = trade.amount.round_dp(2);
    *cash += amount;

    // A sell against an unknown symbol has its cash effect and
    // nothing else.
    if let Some(idx) = holdings.position(&trade.symbol) {
        let holding = &mut holdings.holdings[idx];
        let new_units = holding.units - trade.shares;
        if new_units > Decimal::ZERO {
            // Selling never touches the cost basis.
            holding.units = new_units;
            holding.revalue(price);
        } else {
            // Full liquidation, oversell included: the row goes away
            // rather than surfacing zero or negative units.
            holdings.holdings.remove(idx);
        }
    }
    Ok(())
}

fn buy(
    holdings: &mut Portfolio,
    cash: &mut Decimal,
    index: usize,
    trade: &TradeInstruction,
) -> LedgerResult<()> {
    let price = effective_price(index, trade)?;
    let amount = trade.amount.round_dp(2);
    *cash -= amount;

    if let Some(idx) = holdings.position(&trade.symbol) {
        let holding = &mut holdings.holdings[idx];
        // Quantity-weighted cost basis across the old lot and this one.
        let old_cost = (holding.buying_price * holding.units).round_dp(2);
        let new_units = holding.units + trade.shares;
        holding.buying_price = ((old_cost + amount) / new_units).round_dp(2);
        holding.units = new_units;
        holding.revalue(price);
    } else {
        holdings
            .holdings
            .push(Holding::opened(&trade.symbol, price, trade.shares, amount));
    }
    Ok(())
}
