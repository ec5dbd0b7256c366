// src/application/usecase/briefing_usecase.rs
// Text briefings and prompt assembly

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::{Path, PathBuf};

use crate::domain::errors::{AppError, AppResult, StorageError};
use crate::domain::models::{CapCategory, Portfolio, PromptKind, StockQuote};
use crate::domain::repository::{DecisionRepository, PortfolioRepository, SnapshotRepository};

/// Render a holdings table the way the advisor prompt expects it:
/// a totals header, then one line per holding.
pub fn portfolio_briefing(portfolio: &Portfolio) -> String {
    let invested = portfolio.invested_capital();
    let value = portfolio.total_value();
    let change = if invested > Decimal::ZERO {
        (value - invested) / invested * dec!(100)
    } else {
        Decimal::ZERO
    };

    let mut out = format!(
        "Total Portfolio Value: \u{20b9}{:.2} (Invested: \u{20b9}{:.2}, Change: {}%)\n\n",
        value,
        invested,
        signed(change)
    );
    out.push_str("Holdings:\n");
    for holding in &portfolio.holdings {
        out.push_str(&format!(
            "- {}: {} units @ Buy \u{20b9}{:.2}, Current \u{20b9}{:.2}, Value \u{20b9}{:.2}, Change {}%\n",
            holding.name,
            holding.units.trunc().normalize(),
            holding.buying_price,
            holding.current_price,
            holding.total_amount,
            signed(holding.percent_change),
        ));
    }
    out
}

/// Render a day's stock snapshot grouped by category, highest volume
/// first within each group.
pub fn stock_briefing(date: NaiveDate, quotes: &[StockQuote]) -> String {
    if quotes.is_empty() {
        return format!("No stock data available for {}.", date.format("%Y-%m-%d"));
    }

    let mut out = format!(
        "Stock Data for {} ({} stocks total):\n\n",
        date.format("%Y-%m-%d"),
        quotes.len()
    );

    let mut categories: Vec<CapCategory> = Vec::new();
    for quote in quotes {
        if !categories.contains(&quote.category) {
            categories.push(quote.category);
        }
    }
    categories.sort_by_key(|c| c.as_str());

    for category in categories {
        let mut rows: Vec<&StockQuote> =
            quotes.iter().filter(|q| q.category == category).collect();
        rows.sort_by(|a, b| b.volume.cmp(&a.volume));

        out.push_str(&format!("{} Stocks:\n", category));
        for quote in rows {
            out.push_str(&format!(
                "- {}: O \u{20b9}{:.2}, H \u{20b9}{:.2}, L \u{20b9}{:.2}, C \u{20b9}{:.2}, Vol {}\n",
                quote.symbol,
                quote.open,
                quote.high,
                quote.low,
                quote.close,
                group_thousands(quote.volume),
            ));
        }
        out.push('\n');
    }
    out
}

/// Assembles advisor prompts from a template and the stored tables.
pub struct PromptBuilder<'a> {
    portfolios: &'a dyn PortfolioRepository,
    snapshots: &'a dyn SnapshotRepository,
    reviews: &'a dyn DecisionRepository,
    template_dir: PathBuf,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(
        portfolios: &'a dyn PortfolioRepository,
        snapshots: &'a dyn SnapshotRepository,
        reviews: &'a dyn DecisionRepository,
        template_dir: &Path,
    ) -> Self {
        Self {
            portfolios,
            snapshots,
            reviews,
            template_dir: template_dir.to_path_buf(),
        }
    }

    /// Load the template for `kind` and substitute every placeholder.
    pub fn build(&self, kind: PromptKind, date: NaiveDate) -> AppResult<String> {
        let mut prompt = self.load_template(kind)?;
        let date_str = date.format("%Y-%m-%d").to_string();

        if matches!(kind, PromptKind::Daily | PromptKind::Training) {
            let portfolio = self.portfolios.load(date)?;
            prompt = prompt.replace("[Portfolio String]", &portfolio_briefing(&portfolio));
        }

        match kind {
            PromptKind::FirstTimer => {
                prompt = prompt.replace("[Stock Data]", &self.stock_section(date)?);
            }
            PromptKind::Daily => {
                prompt = prompt.replace("[Stock Data]", &self.stock_section(date)?);
                let signals = self.prior_signals(week_window(date))?;
                prompt = prompt.replace("[Prior Week's Signals]", &serde_json::to_string(&signals)?);
                prompt = prompt.replace("[Date]", &date_str);
            }
            PromptKind::Training => {
                // Five calendar days of stock data, newest first.
                let mut stock_data = String::new();
                for i in 0..5 {
                    stock_data.push_str(&self.stock_section(date - Duration::days(i))?);
                    stock_data.push('\n');
                }
                prompt = prompt.replace("[Stock Data]", &stock_data);
                let dates = (0..5).map(|i| date - Duration::days(i)).collect();
                let signals = self.prior_signals(dates)?;
                prompt = prompt.replace("[Prior Signals JSON]", &serde_json::to_string(&signals)?);
                prompt = prompt.replace("[Date]", &date_str);
            }
        }

        Ok(prompt)
    }

    fn load_template(&self, kind: PromptKind) -> AppResult<String> {
        let file = match kind {
            PromptKind::FirstTimer => "first_timer_prompt.txt",
            PromptKind::Daily => "daily_prompt.txt",
            PromptKind::Training => "training_prompt.txt",
        };
        let path = self.template_dir.join(file);
        let contents = std::fs::read_to_string(&path).map_err(|_| StorageError::NotFound {
            kind: "prompt template",
            path: path.display().to_string(),
        })?;
        Ok(contents.trim().to_string())
    }

    fn stock_section(&self, date: NaiveDate) -> AppResult<String> {
        let quotes = self.snapshots.load(date)?;
        Ok(stock_briefing(date, &quotes))
    }

    /// Stored daily decisions for the given dates, each stamped with
    /// its review date. Missing days are silently absent.
    fn prior_signals(&self, dates: Vec<NaiveDate>) -> AppResult<Vec<serde_json::Value>> {
        let mut signals = Vec::new();
        for date in dates {
            if let Some(decision) = self.reviews.load(PromptKind::Daily, date)? {
                signals.push(decision.dated_content(date));
            }
        }
        Ok(signals)
    }
}

/// The weekdays whose signals feed a daily prompt: Monday through the
/// target date. On a Monday the window reaches back into the previous
/// week instead, since nothing has been filed for the new week yet.
fn week_window(date: NaiveDate) -> Vec<NaiveDate> {
    let base = if date.weekday() == Weekday::Mon {
        date - Duration::days(3)
    } else {
        date
    };
    let offset = base.weekday().num_days_from_monday() as i64;
    let monday = base - Duration::days(offset);
    (0..=offset).map(|i| monday + Duration::days(i)).collect()
}

/// Monday-to-Friday digest of the stored daily reviews.
pub fn weekly_digest(friday: NaiveDate, reviews: &dyn DecisionRepository) -> AppResult<String> {
    if friday.weekday() != Weekday::Fri {
        return Err(AppError::Config("Input date must be a Friday.".to_string()));
    }

    let mut out = String::new();
    for i in (0..5).rev() {
        let past = friday - Duration::days(i);
        let day = past.format("%A");

        let mut decision = reviews.load(PromptKind::Daily, past)?;
        if decision.is_none() {
            decision = reviews.load(PromptKind::FirstTimer, past)?;
        }

        match decision {
            Some(decision) => {
                out.push_str(&format!(
                    "{} Summary: {}\n",
                    day,
                    decision.daily_summary().unwrap_or("No summary")
                ));
                out.push_str(&format!(
                    "{} Signals: {}\n\n",
                    day,
                    serde_json::to_string(&decision.top_signals())?
                ));
            }
            None => {
                out.push_str(&format!("{} Summary: No data\n", day));
                out.push_str(&format!("{} Signals: []\n\n", day));
            }
        }
    }
    Ok(out)
}

fn signed(value: Decimal) -> String {
    if value.is_sign_negative() {
        format!("{:.2}", value)
    } else {
        format!("+{:.2}", value)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Decision, Holding};
    use crate::domain::repository::DecisionRepository;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::collections::HashMap;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn holding(name: &str, buy: Decimal, cur: Decimal, units: Decimal) -> Holding {
        Holding {
            name: name.to_string(),
            buying_price: buy,
            current_price: cur,
            units,
            total_amount: (cur * units).round_dp(2),
            percent_change: crate::domain::models::percent_change(cur, buy),
        }
    }

    #[test]
    fn groups_volume_digits() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(25_103_880), "25,103,880");
    }

    #[test]
    fn portfolio_briefing_totals_and_lines() {
        let portfolio = Portfolio::new(vec![
            holding("RELIANCE", dec!(100.00), dec!(110.00), dec!(10)),
            Holding::cash(dec!(500.00)),
        ]);
        let text = portfolio_briefing(&portfolio);
        assert!(text.starts_with(
            "Total Portfolio Value: \u{20b9}1600.00 (Invested: \u{20b9}1500.00, Change: +6.67%)"
        ));
        assert!(text.contains(
            "- RELIANCE: 10 units @ Buy \u{20b9}100.00, Current \u{20b9}110.00, Value \u{20b9}1100.00, Change +10.00%"
        ));
        assert!(text.contains("- Cash: 1 units @ Buy \u{20b9}500.00"));
    }

    #[test]
    fn stock_briefing_empty_day() {
        assert_eq!(
            stock_briefing(date("2025-09-21"), &[]),
            "No stock data available for 2025-09-21."
        );
    }

    #[test]
    fn week_window_midweek_runs_from_monday() {
        // 2025-09-24 is a Wednesday.
        let window = week_window(date("2025-09-24"));
        assert_eq!(
            window,
            vec![date("2025-09-22"), date("2025-09-23"), date("2025-09-24")]
        );
    }

    #[test]
    fn week_window_monday_reaches_previous_week() {
        // 2025-09-22 is a Monday; the window covers the prior Mon-Fri.
        let window = week_window(date("2025-09-22"));
        assert_eq!(window.len(), 5);
        assert_eq!(window[0], date("2025-09-15"));
        assert_eq!(window[4], date("2025-09-19"));
    }

    struct MapReviews(HashMap<(&'static str, NaiveDate), Decision>);

    impl DecisionRepository for MapReviews {
        fn load(
            &self,
            kind: PromptKind,
            date: NaiveDate,
        ) -> crate::domain::errors::StorageResult<Option<Decision>> {
            Ok(self.0.get(&(kind.code(), date)).cloned())
        }

        fn save(
            &self,
            _kind: PromptKind,
            _date: NaiveDate,
            _response: &serde_json::Value,
        ) -> crate::domain::errors::StorageResult<std::path::PathBuf> {
            Ok(std::path::PathBuf::new())
        }
    }

    #[test]
    fn weekly_digest_requires_friday() {
        let reviews = MapReviews(HashMap::new());
        assert!(weekly_digest(date("2025-09-24"), &reviews).is_err());
    }

    #[test]
    fn weekly_digest_mixes_found_and_missing_days() {
        let mut map = HashMap::new();
        map.insert(
            ("d", date("2025-09-22")),
            Decision::new(json!({
                "daily_summary": "steady accumulation",
                "top_signals": [{"symbol": "BEL", "signal": "buy"}],
            })),
        );
        let reviews = MapReviews(map);

        let digest = weekly_digest(date("2025-09-26"), &reviews).unwrap();
        assert!(digest.starts_with("Monday Summary: steady accumulation\n"));
        assert!(digest.contains("Monday Signals: [{\"signal\":\"buy\",\"symbol\":\"BEL\"}]"));
        assert!(digest.contains("Tuesday Summary: No data\nTuesday Signals: []\n"));
        assert!(digest.contains("Friday Summary: No data\n"));
    }
}
