// src/application/usecase/mod.rs
pub mod briefing_usecase;
pub mod ledger_usecase;
pub mod quotes_usecase;
pub mod valuation_usecase;

// Re-export public API
pub use briefing_usecase::{portfolio_briefing, stock_briefing, weekly_digest, PromptBuilder};
pub use ledger_usecase::{apply_trades, rebuild};
pub use quotes_usecase::{SnapshotFetcher, TOP_BY_VOLUME};
pub use valuation_usecase::{mark_to_market, PriceBook, ValuationOutcome};
