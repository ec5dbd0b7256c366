// src/domain/mod.rs
pub mod errors;
pub mod models;
pub mod repository;
pub mod universe;

// Re-export common types for convenience
pub use errors::{AppError, AppResult, LedgerError, LedgerResult, MarketDataError, StorageError};
pub use models::{
    CapCategory, DailyBar, Decision, Holding, Portfolio, PortfolioSnapshot, PromptKind,
    StockQuote, TradeAction, TradeInstruction, CASH_NAME,
};
pub use universe::Universe;
