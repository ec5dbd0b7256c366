// src/domain/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Advisor error: {0}")]
    Advisor(#[from] AdvisorError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Implement From for common error types
impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Config(s)
    }
}

/// Errors raised while applying trade instructions to the ledger.
///
/// Both variants abort the whole batch: the output table is never
/// persisted after a failed trade, so cash and units cannot drift
/// apart across a partial write.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("decision payload is malformed: {0}")]
    Schema(String),

    #[error("trade {index} is malformed: {reason}")]
    Trade { index: usize, reason: String },

    #[error("trade {index} for {symbol} has zero shares")]
    ZeroShares { index: usize, symbol: String },
}

#[derive(Error, Debug)]
pub enum MarketDataError {
    /// Per-symbol miss, non-fatal: the holding's row is left stale.
    #[error("no close available for {0}")]
    PriceUnavailable(String),

    #[error("vendor {vendor} request failed: {message}")]
    Vendor { vendor: &'static str, message: String },

    #[error("vendor {vendor} returned malformed data: {message}")]
    InvalidFormat { vendor: &'static str, message: String },

    #[error("unsupported market data vendor: {0}")]
    UnknownVendor(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("no {kind} file found at {path}")]
    NotFound { kind: &'static str, path: String },

    #[error("{kind} file missing required column `{column}`")]
    MissingColumn { kind: &'static str, column: &'static str },

    #[error("{kind} file row {row}: {message}")]
    Row {
        kind: &'static str,
        row: usize,
        message: String,
    },

    #[error("duplicate holding `{0}`")]
    DuplicateHolding(String),

    #[error("review file {path} is malformed: {message}")]
    Review { path: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("advisor returned status {0}")]
    Status(u16),

    #[error("malformed advisor response: {0}")]
    MalformedResponse(String),
}

// Result type aliases for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type LedgerResult<T> = Result<T, LedgerError>;
pub type MarketDataResult<T> = Result<T, MarketDataError>;
pub type StorageResult<T> = Result<T, StorageError>;
pub type AdvisorResult<T> = Result<T, AdvisorError>;
