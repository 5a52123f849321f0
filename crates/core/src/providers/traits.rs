use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::price::PriceMap;

/// Trait abstraction for all price feeds.
///
/// Each feed (Yahoo Finance, Alpha Vantage, a static table) implements this
/// trait. Callers only ever see a `PriceMap`, so swapping a feed touches one
/// implementation and nothing else.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the latest and previous close for every requested instrument.
    ///
    /// Instruments the feed knows nothing about are simply absent from the
    /// returned map; an `Err` means the feed itself failed.
    async fn get_quotes(&self, instruments: &[String]) -> Result<PriceMap, CoreError>;
}
