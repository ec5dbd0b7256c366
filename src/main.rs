// src/main.rs
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use nifty_desk::application::dto::parser;
use nifty_desk::application::usecase::{
    apply_trades, mark_to_market, rebuild, weekly_digest, PriceBook, PromptBuilder,
    SnapshotFetcher,
};
use nifty_desk::config::Config;
use nifty_desk::domain::errors::{AppError, AppResult, MarketDataError, StorageError};
use nifty_desk::domain::models::PromptKind;
use nifty_desk::domain::repository::{
    Advisor, DecisionRepository, PortfolioRepository, QuoteSource, SnapshotRepository,
};
use nifty_desk::domain::universe::Universe;
use nifty_desk::infrastructure::advisor::ChatAdvisor;
use nifty_desk::infrastructure::market::{NseQuoteSource, YahooQuoteSource};
use nifty_desk::infrastructure::storage::{CsvPortfolioStore, CsvSnapshotStore, ReviewStore};

#[derive(Parser)]
#[command(name = "nifty-desk", version, about = "Flat-file trading assistant for NSE mid/small caps")]
struct Cli {
    /// JSON config file; environment variables (and .env) otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the universe's end-of-day quotes into a stock snapshot
    Fetch {
        /// Trading date (YYYY-MM-DD)
        date: String,
        /// Quote vendor override (nse, yahoo)
        #[arg(long)]
        vendor: Option<String>,
    },
    /// Mark the date's portfolio to market from its stock snapshot
    Mark {
        /// Trading date (YYYY-MM-DD)
        date: String,
    },
    /// Apply a stored decision's trades to the portfolio
    Apply {
        /// Date of the decision review and input portfolio (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// Date the updated portfolio is written as (YYYY-MM-DD)
        #[arg(long)]
        to: String,
    },
    /// Rebuild the portfolio from scratch out of a decision payload
    Rebuild {
        /// Date of the decision review and stock snapshot (YYYY-MM-DD)
        date: String,
    },
    /// Assemble a prompt; optionally send it and store the reply
    Brief {
        /// Prompt kind: f (first timer), d (daily), or t (training)
        kind: String,
        /// Trading date (YYYY-MM-DD)
        date: String,
        /// Send the prompt to the advisor and store the raw reply
        #[arg(long)]
        send: bool,
    },
    /// Print the Monday-to-Friday digest for a Friday
    Weekly {
        /// Friday's date (YYYY-MM-DD)
        date: String,
    },
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting nifty-desk v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Fetch { date, vendor } => {
            run_fetch(&config, parse_date(&date)?, vendor.as_deref()).await
        }
        Command::Mark { date } => run_mark(&config, parse_date(&date)?),
        Command::Apply { from, to } => run_apply(&config, parse_date(&from)?, parse_date(&to)?),
        Command::Rebuild { date } => run_rebuild(&config, parse_date(&date)?),
        Command::Brief { kind, date, send } => {
            run_brief(&config, parse_kind(&kind)?, parse_date(&date)?, send).await
        }
        Command::Weekly { date } => run_weekly(&config, parse_date(&date)?),
    }
}

async fn run_fetch(config: &Config, date: NaiveDate, vendor: Option<&str>) -> AppResult<()> {
    let vendor_name = vendor.unwrap_or(&config.market.vendor);
    let source = make_quote_source(vendor_name)?;
    let universe = load_universe(config)?;

    log::info!(
        "Fetching data for {} via {} ({} symbols)",
        date,
        source.vendor(),
        universe.len()
    );

    let fetcher = SnapshotFetcher::new(source.as_ref(), config.market.fetch_concurrency);
    let quotes = fetcher.snapshot(&universe, date).await;

    let store = CsvSnapshotStore::new(&config.data.stock_dir);
    let path = store.save(date, &quotes)?;

    if quotes.is_empty() {
        log::info!(
            "No data for {} (non-trading day?). Created empty {}",
            date,
            path.display()
        );
    } else {
        log::info!("Saved {} rows to {}", quotes.len(), path.display());
    }
    Ok(())
}

fn run_mark(config: &Config, date: NaiveDate) -> AppResult<()> {
    let snapshots = CsvSnapshotStore::new(&config.data.stock_dir);
    let portfolios = CsvPortfolioStore::new(&config.data.portfolio_dir);

    let quotes = snapshots.load(date)?;
    let prices = PriceBook::from_quotes(&quotes);
    let portfolio = portfolios.load(date)?;

    let outcome = mark_to_market(portfolio, &prices);
    if !outcome.stale.is_empty() {
        log::info!("{} holdings left stale for {}", outcome.stale.len(), date);
    }

    let path = portfolios.save(date, &outcome.portfolio)?;
    log::info!("Updated portfolio file using stock data for {}: {}", date, path.display());
    Ok(())
}

fn run_apply(config: &Config, from: NaiveDate, to: NaiveDate) -> AppResult<()> {
    let reviews = ReviewStore::new(&config.data.reviews_dir);
    let portfolios = CsvPortfolioStore::new(&config.data.portfolio_dir);

    let decision = reviews
        .load(PromptKind::Training, from)?
        .ok_or_else(|| StorageError::NotFound {
            kind: "review",
            path: reviews
                .path_for(PromptKind::Training, from)
                .display()
                .to_string(),
        })?;
    let trades = decision.trades()?;

    let mut table = portfolios.load(from)?;
    let cash = table.detach_cash();
    let (table, cash) = apply_trades(table, cash, &trades)?;

    let path = portfolios.save(to, &table)?;
    log::info!(
        "Applied {} trades; cash balance {:.2}; saved {}",
        trades.len(),
        cash,
        path.display()
    );
    Ok(())
}

fn run_rebuild(config: &Config, date: NaiveDate) -> AppResult<()> {
    let reviews = ReviewStore::new(&config.data.reviews_dir);
    let snapshots = CsvSnapshotStore::new(&config.data.stock_dir);
    let portfolios = CsvPortfolioStore::new(&config.data.portfolio_dir);

    let decision = reviews
        .load(PromptKind::Training, date)?
        .ok_or_else(|| StorageError::NotFound {
            kind: "review",
            path: reviews
                .path_for(PromptKind::Training, date)
                .display()
                .to_string(),
        })?;

    let quotes = snapshots.load(date)?;
    let prices = PriceBook::from_quotes(&quotes);

    let table = rebuild(&decision, &prices)?;
    let path = portfolios.save(date, &table)?;
    log::info!("Rebuilt portfolio saved to {}", path.display());
    Ok(())
}

async fn run_brief(config: &Config, kind: PromptKind, date: NaiveDate, send: bool) -> AppResult<()> {
    if date.weekday().num_days_from_monday() >= 5 {
        log::warn!("{} is a weekend. Consider using the last trading day.", date);
    }

    let portfolios = CsvPortfolioStore::new(&config.data.portfolio_dir);
    let snapshots = CsvSnapshotStore::new(&config.data.stock_dir);
    let reviews = ReviewStore::new(&config.data.reviews_dir);

    let builder = PromptBuilder::new(&portfolios, &snapshots, &reviews, &config.data.prompt_dir);
    let prompt = builder.build(kind, date)?;

    if !send {
        println!("{}", prompt);
        return Ok(());
    }

    let api_key = config.advisor.api_key.as_deref().ok_or_else(|| {
        AppError::Config("Missing API_KEY environment variable".to_string())
    })?;
    let advisor = ChatAdvisor::new(&config.advisor.base_url, api_key, &config.advisor.model);

    log::info!("Sending {} prompt for {} to {}", kind, date, config.advisor.model);
    let response = advisor.complete(&prompt, kind.temperature()).await?;

    println!("{}", parser::content_of(&response)?);

    let path = reviews.save(kind, date, &response)?;
    log::info!("Response saved to {}", path.display());
    Ok(())
}

fn run_weekly(config: &Config, date: NaiveDate) -> AppResult<()> {
    let reviews = ReviewStore::new(&config.data.reviews_dir);
    println!("{}", weekly_digest(date, &reviews)?);
    Ok(())
}

fn parse_date(input: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::Config(
            "Invalid date format. Please use YYYY-MM-DD (e.g., 2025-09-29).".to_string(),
        )
    })
}

fn parse_kind(input: &str) -> AppResult<PromptKind> {
    match input.trim().to_lowercase().as_str() {
        "f" | "first-timer" => Ok(PromptKind::FirstTimer),
        "d" | "daily" => Ok(PromptKind::Daily),
        "t" | "training" => Ok(PromptKind::Training),
        other => Err(AppError::Config(format!(
            "Unknown prompt kind: {} (expected f, d, or t)",
            other
        ))),
    }
}

/// Create a quote source based on configuration
fn make_quote_source(name: &str) -> AppResult<Box<dyn QuoteSource + Send + Sync>> {
    match name.to_lowercase().as_str() {
        "nse" => Ok(Box::new(NseQuoteSource::new()?)),
        "yahoo" | "yfinance" => Ok(Box::new(YahooQuoteSource::new()?)),
        other => Err(MarketDataError::UnknownVendor(other.to_string()).into()),
    }
}

fn load_universe(config: &Config) -> AppResult<Universe> {
    match &config.market.universe_file {
        Some(path) => Universe::from_file(path),
        None => Ok(Universe::default()),
    }
}
