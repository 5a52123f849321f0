use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::traits::PriceProvider;
use crate::errors::CoreError;
use crate::models::price::{PriceMap, PriceQuote};

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage price feed.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key (set via settings as "alphavantage").
/// - **Coverage**: 100k+ global equity symbols.
///
/// One `TIME_SERIES_DAILY` call per instrument; the two most recent
/// trading days become the current and previous price.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
        }
    }

    /// Turn a raw `TIME_SERIES_DAILY` response body into a quote.
    ///
    /// Returns `Ok(None)` when the series has fewer than two parseable days,
    /// and an `Api` error when the body carries no series at all (bad symbol
    /// or exhausted quota).
    pub fn parse_daily_series(symbol: &str, body: &str) -> Result<Option<PriceQuote>, CoreError> {
        let resp: TimeSeriesResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: "Alpha Vantage".into(),
            message: format!("Failed to parse time series for {symbol}: {e}"),
        })?;

        let series = resp.time_series.ok_or_else(|| CoreError::Api {
            provider: "Alpha Vantage".into(),
            message: format!("No time series data for {symbol}. API limit may be exceeded."),
        })?;

        let mut closes: Vec<(NaiveDate, f64)> = series
            .iter()
            .filter_map(|(date_str, data)| {
                let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
                let close: f64 = data.close.parse().ok()?;
                Some((date, close))
            })
            .collect();
        closes.sort_by_key(|(date, _)| *date);

        Ok(match closes.as_slice() {
            [.., (_, previous), (_, current)] => Some(PriceQuote::new(symbol, *current, *previous)),
            _ => None,
        })
    }

    /// Fetch the compact daily series body for one symbol (last 100 trading days).
    async fn fetch_daily_series(&self, symbol: &str) -> Result<String, CoreError> {
        let body = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", &symbol.to_uppercase()),
                ("outputsize", "compact"),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?
            .text()
            .await?;
        Ok(body)
    }
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyData>>,
}

#[derive(Deserialize)]
struct DailyData {
    #[serde(rename = "4. close")]
    close: String,
}

#[async_trait]
impl PriceProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "Alpha Vantage"
    }

    async fn get_quotes(&self, instruments: &[String]) -> Result<PriceMap, CoreError> {
        let mut map = PriceMap::new();
        let mut last_error = None;

        for symbol in instruments {
            let parsed = match self.fetch_daily_series(symbol).await {
                Ok(body) => Self::parse_daily_series(symbol, &body),
                Err(e) => Err(e),
            };
            match parsed {
                Ok(Some(quote)) => {
                    map.insert(quote.instrument.clone(), quote);
                }
                Ok(None) => debug!("Alpha Vantage: fewer than two closes for {symbol}"),
                Err(e) => {
                    debug!("Alpha Vantage: {e}");
                    last_error = Some(e);
                }
            }
        }

        if map.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        Ok(map)
    }
}
