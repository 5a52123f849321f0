use async_trait::async_trait;
use log::debug;
use time::OffsetDateTime;

use super::traits::PriceProvider;
use crate::errors::CoreError;
use crate::models::price::{PriceMap, PriceQuote};

/// Days of daily history requested per instrument. Wide enough to span a
/// long weekend plus a holiday and still yield two closes.
const HISTORY_WINDOW_DAYS: i64 = 10;

/// Yahoo Finance price feed.
///
/// - **Free**: No API key required.
/// - **No strict rate limits** (unofficial public API).
/// - **Coverage**: Global equities, ETFs, indices, mutual funds.
///
/// Uses the `yahoo_finance_api` crate. For each instrument the last two
/// daily closes become `current_price` and `previous_price`.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    /// Last two daily closes for one symbol, oldest first.
    async fn last_two_closes(
        &self,
        symbol: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Option<(f64, f64)>, CoreError> {
        let resp = self
            .connector
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch history for {symbol}: {e}"),
            })?;

        let mut quotes = resp.quotes().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to parse quotes for {symbol}: {e}"),
        })?;
        quotes.sort_by_key(|q| q.timestamp);

        Ok(match quotes.as_slice() {
            [.., previous, current] => Some((previous.close, current.close)),
            _ => None,
        })
    }
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn get_quotes(&self, instruments: &[String]) -> Result<PriceMap, CoreError> {
        let end = OffsetDateTime::now_utc();
        let start = end - time::Duration::days(HISTORY_WINDOW_DAYS);

        let mut map = PriceMap::new();
        let mut last_error = None;

        for symbol in instruments {
            match self.last_two_closes(symbol, start, end).await {
                Ok(Some((previous, current))) => {
                    let quote = PriceQuote::new(symbol.as_str(), current, previous);
                    map.insert(quote.instrument.clone(), quote);
                }
                Ok(None) => debug!("Yahoo Finance: fewer than two closes for {symbol}"),
                Err(e) => {
                    // An unknown ticker fails on its own; keep going with the rest.
                    debug!("Yahoo Finance: {e}");
                    last_error = Some(e);
                }
            }
        }

        // Every single request failed: the feed is down, not the tickers.
        if map.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        Ok(map)
    }
}
