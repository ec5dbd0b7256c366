// src/infrastructure/market/mod.rs
// Quote vendor implementations

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use reqwest::{header, StatusCode};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::domain::errors::{MarketDataError, MarketDataResult};
use crate::domain::models::DailyBar;
use crate::domain::repository::QuoteSource;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

fn request_error(vendor: &'static str, e: reqwest::Error) -> MarketDataError {
    MarketDataError::Vendor {
        vendor,
        message: e.to_string(),
    }
}

/// NSE's historical equity endpoint. Requests only succeed with the
/// session cookies handed out by the homepage, so those are primed
/// once and re-primed whenever the session is rejected.
pub struct NseQuoteSource {
    client: reqwest::Client,
    cookies: Mutex<Option<String>>,
}

const NSE_HOME: &str = "https://www.nseindia.com";
const NSE_HISTORY: &str = "https://www.nseindia.com/api/historical/cm/equity";

impl NseQuoteSource {
    pub fn new() -> MarketDataResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .map_err(|e| request_error("nse", e))?;
        Ok(Self {
            client,
            cookies: Mutex::new(None),
        })
    }

    async fn ensure_cookies(&self) -> MarketDataResult<String> {
        let mut guard = self.cookies.lock().await;
        if let Some(cookies) = guard.as_ref() {
            return Ok(cookies.clone());
        }

        let response = self
            .client
            .get(NSE_HOME)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| request_error("nse", e))?;

        let cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .collect::<Vec<_>>()
            .join("; ");

        if cookies.is_empty() {
            return Err(MarketDataError::Vendor {
                vendor: "nse",
                message: "homepage returned no session cookies".to_string(),
            });
        }

        *guard = Some(cookies.clone());
        Ok(cookies)
    }
}

#[derive(Debug, Deserialize)]
struct NseHistoryResponse {
    #[serde(default)]
    data: Vec<NseHistoryRow>,
}

#[derive(Debug, Deserialize)]
struct NseHistoryRow {
    #[serde(rename = "CH_OPENING_PRICE")]
    open: Decimal,
    #[serde(rename = "CH_TRADE_HIGH_PRICE")]
    high: Decimal,
    #[serde(rename = "CH_TRADE_LOW_PRICE")]
    low: Decimal,
    #[serde(rename = "CH_CLOSING_PRICE")]
    close: Decimal,
    #[serde(rename = "CH_TOT_TRADED_QTY")]
    volume: u64,
}

#[async_trait]
impl QuoteSource for NseQuoteSource {
    fn vendor(&self) -> &'static str {
        "nse"
    }

    async fn daily_bar(&self, symbol: &str, date: NaiveDate) -> MarketDataResult<Option<DailyBar>> {
        let symbol = symbol.trim_end_matches(".NS");
        let day = date.format("%d-%m-%Y").to_string();
        let cookies = self.ensure_cookies().await?;

        let response = self
            .client
            .get(NSE_HISTORY)
            .query(&[
                ("symbol", symbol),
                ("series", r#"["EQ"]"#),
                ("from", day.as_str()),
                ("to", day.as_str()),
            ])
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/json")
            .header(header::COOKIE, cookies)
            .send()
            .await
            .map_err(|e| request_error("nse", e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            // Session expired; the next call primes a fresh one.
            self.cookies.lock().await.take();
        }
        if !status.is_success() {
            return Err(MarketDataError::Vendor {
                vendor: "nse",
                message: format!("status {} for {}", status, symbol),
            });
        }

        let payload: NseHistoryResponse =
            response
                .json()
                .await
                .map_err(|e| MarketDataError::InvalidFormat {
                    vendor: "nse",
                    message: e.to_string(),
                })?;

        Ok(payload.data.into_iter().next().map(|row| DailyBar {
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }))
    }
}

/// Yahoo Finance's chart endpoint, used as the fallback vendor. NSE
/// symbols get the `.NS` suffix appended.
pub struct YahooQuoteSource {
    client: reqwest::Client,
}

const YAHOO_CHART: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

impl YahooQuoteSource {
    pub fn new() -> MarketDataResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .map_err(|e| request_error("yahoo", e))?;
        Ok(Self { client })
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    #[serde(default)]
    result: Vec<YahooChartResult>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Vec<YahooQuoteBlock>,
}

#[derive(Debug, Deserialize, Default)]
struct YahooQuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

fn decimal_from(value: f64) -> MarketDataResult<Decimal> {
    Decimal::from_f64(value).ok_or_else(|| MarketDataError::InvalidFormat {
        vendor: "yahoo",
        message: format!("unrepresentable price {}", value),
    })
}

#[async_trait]
impl QuoteSource for YahooQuoteSource {
    fn vendor(&self) -> &'static str {
        "yahoo"
    }

    async fn daily_bar(&self, symbol: &str, date: NaiveDate) -> MarketDataResult<Option<DailyBar>> {
        let ticker = if symbol.contains('.') {
            symbol.to_string()
        } else {
            format!("{}.NS", symbol)
        };
        let period1 = date.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = (date + Duration::days(1))
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();

        let response = self
            .client
            .get(format!("{}/{}", YAHOO_CHART, ticker))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| request_error("yahoo", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(MarketDataError::Vendor {
                vendor: "yahoo",
                message: format!("status {} for {}", response.status(), ticker),
            });
        }

        let payload: YahooChartResponse =
            response
                .json()
                .await
                .map_err(|e| MarketDataError::InvalidFormat {
                    vendor: "yahoo",
                    message: e.to_string(),
                })?;

        let Some(result) = payload.chart.result.into_iter().next() else {
            return Ok(None);
        };
        let Some(quote) = result.indicators.quote.into_iter().next() else {
            return Ok(None);
        };

        // First fully populated bar in the window.
        for i in 0..quote.close.len() {
            let bar = (
                quote.open.get(i).copied().flatten(),
                quote.high.get(i).copied().flatten(),
                quote.low.get(i).copied().flatten(),
                quote.close.get(i).copied().flatten(),
                quote.volume.get(i).copied().flatten(),
            );
            if let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = bar {
                return Ok(Some(DailyBar {
                    open: decimal_from(open)?,
                    high: decimal_from(high)?,
                    low: decimal_from(low)?,
                    close: decimal_from(close)?,
                    volume,
                }));
            }
        }
        Ok(None)
    }
}
