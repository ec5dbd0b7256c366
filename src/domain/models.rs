// src/domain/models.rs
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved pseudo-holding for uninvested funds. Matched
/// case-insensitively wherever the ledger looks for it.
pub const CASH_NAME: &str = "Cash";

/// Ledger Components

/// One row of the portfolio ledger: a position in a symbol, or the
/// Cash pseudo-position.
///
/// Cash overloads the per-unit fields: the cash amount is stored in
/// `buying_price` / `current_price` / `total_amount` with `units = 1`.
/// The persisted CSV format depends on this convention.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub name: String,
    pub buying_price: Decimal,
    pub current_price: Decimal,
    pub units: Decimal,
    pub total_amount: Decimal,
    pub percent_change: Decimal,
}

impl Holding {
    /// Open a fresh position at `price` per unit.
    pub fn opened(name: &str, price: Decimal, units: Decimal, amount: Decimal) -> Self {
        Self {
            name: name.to_string(),
            buying_price: price,
            current_price: price,
            units,
            total_amount: amount,
            percent_change: Decimal::ZERO,
        }
    }

    /// The Cash row appended after every ledger update.
    pub fn cash(amount: Decimal) -> Self {
        let amount = amount.round_dp(2);
        Self {
            name: CASH_NAME.to_string(),
            buying_price: amount,
            current_price: amount,
            units: Decimal::ONE,
            total_amount: amount,
            percent_change: Decimal::ZERO,
        }
    }

    pub fn is_cash(&self) -> bool {
        self.name.eq_ignore_ascii_case(CASH_NAME)
    }

    /// Revalue the row at a new per-unit price. Cost basis and units
    /// stay untouched; value and percent change are rederived.
    pub fn revalue(&mut self, price: Decimal) {
        self.current_price = price.round_dp(2);
        self.total_amount = (self.current_price * self.units).round_dp(2);
        self.percent_change = percent_change(self.current_price, self.buying_price);
    }

    /// Round every monetary field to the persisted precision.
    pub fn round(&mut self) {
        self.buying_price = self.buying_price.round_dp(2);
        self.current_price = self.current_price.round_dp(2);
        self.total_amount = self.total_amount.round_dp(2);
        self.percent_change = self.percent_change.round_dp(2);
    }
}

/// `(current - buying) / buying * 100`, rounded to 2 decimals.
/// Defined as 0 when the cost basis is 0.
pub fn percent_change(current: Decimal, buying: Decimal) -> Decimal {
    if buying.is_zero() {
        Decimal::ZERO
    } else {
        ((current - buying) / buying * dec!(100)).round_dp(2)
    }
}

/// Ordered holdings table, keyed by name. Names are unique and at most
/// one Cash row exists; both are checked on load, not on every mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    pub holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn new(holdings: Vec<Holding>) -> Self {
        Self { holdings }
    }

    /// Exact-name position lookup, the match trades use.
    pub fn position(&self, symbol: &str) -> Option<usize> {
        self.holdings.iter().position(|h| h.name == symbol)
    }

    /// Split off the Cash row, returning its amount (0 when absent).
    pub fn detach_cash(&mut self) -> Decimal {
        match self.holdings.iter().position(|h| h.is_cash()) {
            Some(idx) => self.holdings.remove(idx).total_amount,
            None => Decimal::ZERO,
        }
    }

    /// Sum of every row's current value, the Cash row included.
    pub fn total_value(&self) -> Decimal {
        self.holdings.iter().map(|h| h.total_amount).sum()
    }

    /// Sum of `buying_price * units` across all rows.
    pub fn invested_capital(&self) -> Decimal {
        self.holdings.iter().map(|h| h.buying_price * h.units).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

/// Trade Instruction Components

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    Remove,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "buy"),
            TradeAction::Sell => write!(f, "sell"),
            TradeAction::Remove => write!(f, "remove"),
        }
    }
}

/// An externally supplied directive to buy, sell, or remove a
/// position. `amount` is the total cash moved; `amount / shares` is
/// the effective per-unit trade price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInstruction {
    pub symbol: String,
    pub action: TradeAction,
    pub shares: Decimal,
    pub amount: Decimal,
}

/// Optional portfolio snapshot carried inside a decision payload,
/// used only by the rebuild-from-scratch entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    #[serde(default)]
    pub holdings: Vec<String>,
    #[serde(default)]
    pub cash: Decimal,
}

/// Decision Components

/// Which prompt produced (or will produce) a decision review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    FirstTimer,
    Daily,
    Training,
}

impl PromptKind {
    /// Single-letter code used in stored review filenames.
    pub fn code(&self) -> &'static str {
        match self {
            PromptKind::FirstTimer => "f",
            PromptKind::Daily => "d",
            PromptKind::Training => "t",
        }
    }

    /// Sampling temperature for the advisor call.
    pub fn temperature(&self) -> f32 {
        match self {
            PromptKind::FirstTimer | PromptKind::Daily => 0.3,
            PromptKind::Training => 0.35,
        }
    }

    /// Training reviews are filed under the weekend directory, the
    /// rest under weekdays.
    pub fn is_weekend_review(&self) -> bool {
        matches!(self, PromptKind::Training)
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PromptKind::FirstTimer => write!(f, "first-timer"),
            PromptKind::Daily => write!(f, "daily"),
            PromptKind::Training => write!(f, "training"),
        }
    }
}

/// The decision content of one stored advisor review: the inner JSON
/// carried in the reply's message content. Typed accessors pull out
/// the pieces each operation needs; everything else (summaries,
/// signal commentary) stays available as raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub content: serde_json::Value,
}

impl Decision {
    pub fn new(content: serde_json::Value) -> Self {
        Self { content }
    }

    /// The trade instructions, in payload order. Each instruction is
    /// validated individually so a malformed one is reported with its
    /// position in the batch.
    pub fn trades(&self) -> Result<Vec<TradeInstruction>, crate::domain::errors::LedgerError> {
        use crate::domain::errors::LedgerError;

        let items = self
            .content
            .get("trades")
            .ok_or_else(|| LedgerError::Schema("missing `trades` array".to_string()))?
            .as_array()
            .ok_or_else(|| LedgerError::Schema("`trades` is not an array".to_string()))?;

        let mut trades = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let trade: TradeInstruction = serde_json::from_value(item.clone())
                .map_err(|e| LedgerError::Trade {
                    index,
                    reason: e.to_string(),
                })?;
            trades.push(trade);
        }
        Ok(trades)
    }

    /// The optional portfolio snapshot used by rebuild.
    pub fn snapshot(&self) -> Option<PortfolioSnapshot> {
        let value = self.content.get("portfolio")?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn daily_summary(&self) -> Option<&str> {
        self.content.get("daily_summary")?.as_str()
    }

    pub fn top_signals(&self) -> serde_json::Value {
        self.content
            .get("top_signals")
            .cloned()
            .unwrap_or_else(|| serde_json::Value::Array(Vec::new()))
    }

    /// Content with the review date stamped in, the shape prior-signal
    /// digests are serialized with.
    pub fn dated_content(&self, date: NaiveDate) -> serde_json::Value {
        let mut value = self.content.clone();
        if let serde_json::Value::Object(ref mut map) = value {
            map.insert(
                "date".to_string(),
                serde_json::Value::String(date.format("%Y-%m-%d").to_string()),
            );
        }
        value
    }
}

/// Market Data Components

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapCategory {
    MidCap,
    SmallCap,
}

impl CapCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapCategory::MidCap => "Mid Cap",
            CapCategory::SmallCap => "Small Cap",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Mid Cap" => Some(CapCategory::MidCap),
            "Small Cap" => Some(CapCategory::SmallCap),
            _ => None,
        }
    }
}

impl fmt::Display for CapCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day's raw bar as returned by a vendor, before the snapshot
/// attaches symbol, category, and date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

/// One row of the end-of-day stock snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StockQuote {
    pub symbol: String,
    pub category: CapCategory,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

impl StockQuote {
    pub fn from_bar(symbol: &str, category: CapCategory, date: NaiveDate, bar: DailyBar) -> Self {
        Self {
            symbol: symbol.to_string(),
            category,
            date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}
