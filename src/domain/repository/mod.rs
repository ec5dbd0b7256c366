// src/domain/repository/mod.rs
// Repository interfaces for the external collaborators

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::domain::errors::{AdvisorResult, MarketDataResult, StorageResult};
use crate::domain::models::{DailyBar, Decision, Portfolio, PromptKind, StockQuote};

/// A pluggable end-of-day price vendor. One implementation per data
/// vendor, selected by configuration; `Ok(None)` means the vendor has
/// no bar for that symbol/date (non-trading day, delisted, missing).
#[async_trait]
pub trait QuoteSource {
    fn vendor(&self) -> &'static str;

    async fn daily_bar(&self, symbol: &str, date: NaiveDate) -> MarketDataResult<Option<DailyBar>>;
}

/// The chat-completion decision source. Returns the raw response JSON
/// so callers can persist the reply exactly as received.
#[async_trait]
pub trait Advisor {
    async fn complete(&self, prompt: &str, temperature: f32) -> AdvisorResult<serde_json::Value>;
}

/// Persisted holdings tables, one per date. A save rewrites the whole
/// table; a date's file is the only handoff between update cycles.
pub trait PortfolioRepository {
    fn load(&self, date: NaiveDate) -> StorageResult<Portfolio>;

    fn save(&self, date: NaiveDate, portfolio: &Portfolio) -> StorageResult<PathBuf>;
}

/// Persisted end-of-day stock snapshots, one per date.
pub trait SnapshotRepository {
    fn load(&self, date: NaiveDate) -> StorageResult<Vec<StockQuote>>;

    fn save(&self, date: NaiveDate, quotes: &[StockQuote]) -> StorageResult<PathBuf>;
}

/// Stored advisor reviews, keyed by prompt kind and date.
pub trait DecisionRepository {
    /// Load the decision content of a stored review, `None` when no
    /// review exists for that kind/date.
    fn load(&self, kind: PromptKind, date: NaiveDate) -> StorageResult<Option<Decision>>;

    /// Persist a raw advisor response, returning the written path.
    fn save(
        &self,
        kind: PromptKind,
        date: NaiveDate,
        response: &serde_json::Value,
    ) -> StorageResult<PathBuf>;
}
