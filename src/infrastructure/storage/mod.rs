// src/infrastructure/storage/mod.rs
// Flat-file persistence: portfolio CSVs, stock snapshot CSVs, and
// stored advisor reviews

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::application::dto::parser;
use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::{CapCategory, Decision, Holding, Portfolio, PromptKind, StockQuote, CASH_NAME};
use crate::domain::repository::{DecisionRepository, PortfolioRepository, SnapshotRepository};

pub const PORTFOLIO_COLUMNS: [&str; 6] = [
    "Holding Name",
    "Buying Price",
    "Current Price",
    "Number of Units",
    "Total Amount",
    "Perct Change",
];

pub const STOCK_COLUMNS: [&str; 8] = [
    "Symbol", "Category", "Date", "Open", "High", "Low", "Close", "Volume",
];

/// One portfolio CSV per date under a single directory.
pub struct CsvPortfolioStore {
    dir: PathBuf,
}

impl CsvPortfolioStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.csv", date.format("%Y-%m-%d")))
    }
}

impl PortfolioRepository for CsvPortfolioStore {
    fn load(&self, date: NaiveDate) -> StorageResult<Portfolio> {
        let path = self.path_for(date);
        if !path.exists() {
            return Err(StorageError::NotFound {
                kind: "portfolio",
                path: path.display().to_string(),
            });
        }

        let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(&path)?;
        let headers = reader.headers()?.clone();
        let idx = column_indexes("portfolio", &headers, &PORTFOLIO_COLUMNS)?;

        let mut holdings = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let cell = |col: usize| record.get(idx[col]).unwrap_or("");
            holdings.push(Holding {
                name: cell(0).to_string(),
                buying_price: parse_decimal("portfolio", row, PORTFOLIO_COLUMNS[1], cell(1))?,
                current_price: parse_decimal("portfolio", row, PORTFOLIO_COLUMNS[2], cell(2))?,
                units: parse_decimal("portfolio", row, PORTFOLIO_COLUMNS[3], cell(3))?,
                total_amount: parse_decimal("portfolio", row, PORTFOLIO_COLUMNS[4], cell(4))?,
                percent_change: parse_decimal("portfolio", row, PORTFOLIO_COLUMNS[5], cell(5))?,
            });
        }

        let mut seen = HashSet::new();
        let mut cash_rows = 0;
        for holding in &holdings {
            if !seen.insert(holding.name.clone()) {
                return Err(StorageError::DuplicateHolding(holding.name.clone()));
            }
            if holding.is_cash() {
                cash_rows += 1;
            }
        }
        if cash_rows > 1 {
            return Err(StorageError::DuplicateHolding(CASH_NAME.to_string()));
        }

        Ok(Portfolio::new(holdings))
    }

    fn save(&self, date: NaiveDate, portfolio: &Portfolio) -> StorageResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(date);

        let mut buf = Vec::new();
        {
            let mut writer = WriterBuilder::new().from_writer(&mut buf);
            writer.write_record(PORTFOLIO_COLUMNS)?;
            for holding in &portfolio.holdings {
                writer.write_record(&[
                    holding.name.clone(),
                    two_places(holding.buying_price),
                    two_places(holding.current_price),
                    two_places(holding.units),
                    two_places(holding.total_amount),
                    two_places(holding.percent_change),
                ])?;
            }
            writer.flush()?;
        }

        persist_atomic(&path, &buf)?;
        Ok(path)
    }
}

/// One stock snapshot CSV per date under a single directory.
pub struct CsvSnapshotStore {
    dir: PathBuf,
}

impl CsvSnapshotStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.csv", date.format("%Y-%m-%d")))
    }
}

impl SnapshotRepository for CsvSnapshotStore {
    fn load(&self, date: NaiveDate) -> StorageResult<Vec<StockQuote>> {
        let path = self.path_for(date);
        if !path.exists() {
            return Err(StorageError::NotFound {
                kind: "stock",
                path: path.display().to_string(),
            });
        }

        let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(&path)?;
        let headers = reader.headers()?.clone();
        let idx = column_indexes("stock", &headers, &STOCK_COLUMNS)?;

        let mut quotes = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let cell = |col: usize| record.get(idx[col]).unwrap_or("");

            let category = CapCategory::parse(cell(1)).ok_or_else(|| StorageError::Row {
                kind: "stock",
                row,
                message: format!("unknown category `{}`", cell(1)),
            })?;
            let quote_date = NaiveDate::parse_from_str(cell(2), "%Y-%m-%d").map_err(|e| {
                StorageError::Row {
                    kind: "stock",
                    row,
                    message: format!("invalid date `{}`: {}", cell(2), e),
                }
            })?;

            quotes.push(StockQuote {
                symbol: cell(0).to_string(),
                category,
                date: quote_date,
                open: parse_decimal("stock", row, STOCK_COLUMNS[3], cell(3))?,
                high: parse_decimal("stock", row, STOCK_COLUMNS[4], cell(4))?,
                low: parse_decimal("stock", row, STOCK_COLUMNS[5], cell(5))?,
                close: parse_decimal("stock", row, STOCK_COLUMNS[6], cell(6))?,
                volume: parse_volume(row, cell(7))?,
            });
        }
        Ok(quotes)
    }

    fn save(&self, date: NaiveDate, quotes: &[StockQuote]) -> StorageResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(date);

        // Header goes out even on an empty (non-trading) day.
        let mut buf = Vec::new();
        {
            let mut writer = WriterBuilder::new().from_writer(&mut buf);
            writer.write_record(STOCK_COLUMNS)?;
            for quote in quotes {
                writer.write_record(&[
                    quote.symbol.clone(),
                    quote.category.to_string(),
                    quote.date.format("%Y-%m-%d").to_string(),
                    two_places(quote.open),
                    two_places(quote.high),
                    two_places(quote.low),
                    two_places(quote.close),
                    quote.volume.to_string(),
                ])?;
            }
            writer.flush()?;
        }

        persist_atomic(&path, &buf)?;
        Ok(path)
    }
}

/// Stored advisor reviews: weekday reviews and weekend (training)
/// reviews live in separate subdirectories.
pub struct ReviewStore {
    dir: PathBuf,
}

impl ReviewStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, kind: PromptKind, date: NaiveDate) -> PathBuf {
        let subdir = if kind.is_weekend_review() {
            "Weekends"
        } else {
            "Weekdays"
        };
        self.dir
            .join(subdir)
            .join(format!("{}_{}.json", kind.code(), date.format("%Y-%m-%d")))
    }
}

impl DecisionRepository for ReviewStore {
    fn load(&self, kind: PromptKind, date: NaiveDate) -> StorageResult<Option<Decision>> {
        let path = self.path_for(kind, date);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)?;
        parser::parse_stored(&raw)
            .map(Some)
            .map_err(|e| StorageError::Review {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    fn save(
        &self,
        kind: PromptKind,
        date: NaiveDate,
        response: &serde_json::Value,
    ) -> StorageResult<PathBuf> {
        let path = self.path_for(kind, date);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let pretty = serde_json::to_string_pretty(response).map_err(|e| StorageError::Review {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        persist_atomic(&path, pretty.as_bytes())?;
        Ok(path)
    }
}

fn column_indexes(
    kind: &'static str,
    headers: &csv::StringRecord,
    required: &'static [&'static str],
) -> StorageResult<Vec<usize>> {
    required
        .iter()
        .map(|column| {
            headers
                .iter()
                .position(|h| h == *column)
                .ok_or(StorageError::MissingColumn { kind, column })
        })
        .collect()
}

fn parse_decimal(
    kind: &'static str,
    row: usize,
    field: &str,
    value: &str,
) -> StorageResult<Decimal> {
    Decimal::from_str(value).map_err(|e| StorageError::Row {
        kind,
        row,
        message: format!("invalid {} `{}`: {}", field, value, e),
    })
}

fn parse_volume(row: usize, value: &str) -> StorageResult<u64> {
    value
        .parse::<u64>()
        .or_else(|_| value.parse::<f64>().map(|v| v as u64))
        .map_err(|e| StorageError::Row {
            kind: "stock",
            row,
            message: format!("invalid Volume `{}`: {}", value, e),
        })
}

/// Write through a temp file and rename so a failed write never
/// leaves a partial table behind.
fn persist_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn two_places(value: Decimal) -> String {
    format!("{:.2}", value)
}
