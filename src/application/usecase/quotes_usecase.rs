// src/application/usecase/quotes_usecase.rs
// End-of-day snapshot assembly

use chrono::NaiveDate;
use futures_util::{stream, StreamExt};
use std::collections::HashSet;

use crate::domain::models::StockQuote;
use crate::domain::repository::QuoteSource;
use crate::domain::universe::Universe;

/// How many symbols per category survive the volume cut.
pub const TOP_BY_VOLUME: usize = 75;

/// Assembles one date's stock snapshot from a quote vendor.
pub struct SnapshotFetcher<'a> {
    source: &'a (dyn QuoteSource + Send + Sync),
    concurrency: usize,
}

impl<'a> SnapshotFetcher<'a> {
    pub fn new(source: &'a (dyn QuoteSource + Send + Sync), concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch the universe's bars for one date.
    ///
    /// Symbols fetch with bounded concurrency but results are folded
    /// in input-symbol order, so the snapshot is reproducible whatever
    /// order the requests complete in. A vendor miss or error skips
    /// that symbol. Each category is sorted by volume and cut to the
    /// top entries, then the combined set is deduplicated on
    /// (symbol, date).
    pub async fn snapshot(&self, universe: &Universe, date: NaiveDate) -> Vec<StockQuote> {
        let mut combined: Vec<StockQuote> = Vec::new();

        for (category, symbols) in universe.categories() {
            log::info!("Processing {} ({} symbols)...", category, symbols.len());

            let mut quotes: Vec<StockQuote> = stream::iter(symbols.iter().map(|symbol| {
                let symbol = symbol.as_str();
                async move {
                    match self.source.daily_bar(symbol, date).await {
                        Ok(Some(bar)) => Some(StockQuote::from_bar(symbol, category, date, bar)),
                        Ok(None) => {
                            log::warn!("No data for {} on {}", symbol, date);
                            None
                        }
                        Err(e) => {
                            log::warn!("{} failed for {}: {}", self.source.vendor(), symbol, e);
                            None
                        }
                    }
                }
            }))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();

            quotes.sort_by(|a, b| b.volume.cmp(&a.volume));
            quotes.truncate(TOP_BY_VOLUME);
            log::info!("Fetched {} stocks for {}", quotes.len(), category);
            combined.extend(quotes);
        }

        let mut seen = HashSet::new();
        combined.retain(|q| seen.insert((q.symbol.clone(), q.date)));
        combined
    }
}
