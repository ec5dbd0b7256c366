// src/application/usecase/valuation_usecase.rs
// Mark-to-market revaluation

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::domain::errors::MarketDataError;
use crate::domain::models::{Portfolio, StockQuote};

/// Closing prices for one date, keyed case-insensitively by symbol.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    closes: HashMap<String, Decimal>,
}

impl PriceBook {
    /// Build a book from a day's stock snapshot. The first quote wins
    /// when a symbol repeats.
    pub fn from_quotes(quotes: &[StockQuote]) -> Self {
        let mut book = Self::default();
        for quote in quotes {
            book.closes
                .entry(quote.symbol.to_uppercase())
                .or_insert(quote.close);
        }
        book
    }

    pub fn insert(&mut self, symbol: &str, close: Decimal) {
        self.closes.insert(symbol.to_uppercase(), close);
    }

    pub fn close(&self, symbol: &str) -> Option<Decimal> {
        self.closes.get(&symbol.to_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// The revalued table plus the per-symbol misses recorded on the way.
#[derive(Debug)]
pub struct ValuationOutcome {
    pub portfolio: Portfolio,
    pub stale: Vec<MarketDataError>,
}

/// Revalue every position at the book's closes.
///
/// Rows without a close are left byte-identical and recorded as stale;
/// the Cash row is never touched. Row order is preserved, and the
/// operation is idempotent for a fixed book.
pub fn mark_to_market(mut portfolio: Portfolio, prices: &PriceBook) -> ValuationOutcome {
    let mut stale = Vec::new();

    for holding in &mut portfolio.holdings {
        if holding.is_cash() {
            continue;
        }
        match prices.close(&holding.name) {
            Some(close) => holding.revalue(close),
            None => {
                log::warn!("no close for {}, leaving row stale", holding.name);
                stale.push(MarketDataError::PriceUnavailable(holding.name.clone()));
            }
        }
    }

    ValuationOutcome { portfolio, stale }
}
