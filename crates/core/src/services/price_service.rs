use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::errors::CoreError;
use crate::models::price::{PriceMap, QuoteCache};
use crate::providers::registry::PriceProviderRegistry;

/// Fetches quotes from the registered feeds with a short-lived cache.
///
/// Cache strategy:
/// - Key is the normalized set of requested instruments, so the same
///   portfolio re-rendered in any order or case hits one entry.
/// - Entries expire after the configured TTL; there is no other
///   invalidation.
///
/// Providers are tried in registration order. A provider that errors or
/// returns nothing is skipped in favor of the next one.
pub struct PriceService {
    registry: PriceProviderRegistry,
    cache: QuoteCache,
}

impl PriceService {
    pub fn new(registry: PriceProviderRegistry, cache: QuoteCache) -> Self {
        Self { registry, cache }
    }

    /// Names of the configured feeds, in fallback order.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry.provider_names()
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    /// Fetch quotes for `instruments` as of now.
    pub async fn get_quotes(&mut self, instruments: &[String]) -> Result<PriceMap, CoreError> {
        self.get_quotes_at(instruments, Utc::now()).await
    }

    /// Fetch quotes for `instruments`, treating `now` as the current time.
    ///
    /// 1. Check cache → return if an entry for this set is younger than the TTL.
    /// 2. Otherwise ask each provider in turn, drop invalid quotes, cache and return.
    /// 3. If no provider yields a single usable quote → `EmptyFeedResult`.
    pub async fn get_quotes_at(
        &mut self,
        instruments: &[String],
        now: DateTime<Utc>,
    ) -> Result<PriceMap, CoreError> {
        let key = QuoteCache::key_for(instruments);
        if key.is_empty() {
            return Ok(PriceMap::new());
        }

        if let Some(cached) = self.cache.get(&key, now) {
            debug!("Quote cache hit for {}", key.join(","));
            return Ok(cached.clone());
        }
        debug!("Quote cache miss for {}", key.join(","));

        let quotes = self.fetch_quotes(&key).await?;
        self.cache.prune_expired(now);
        self.cache.insert(key, quotes.clone(), now);
        Ok(quotes)
    }

    /// Internal: ask providers in order until one returns usable quotes.
    async fn fetch_quotes(&self, instruments: &[String]) -> Result<PriceMap, CoreError> {
        let providers = self.registry.providers();
        if providers.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let mut last_error = None;

        for provider in &providers {
            match provider.get_quotes(instruments).await {
                Ok(mut quotes) => {
                    // Keep only finite, non-negative quotes for instruments we asked for.
                    quotes.retain(|symbol, quote| {
                        let keep = quote.is_valid() && instruments.contains(symbol);
                        if !keep {
                            warn!(
                                "{}: discarding quote for {symbol} ({} / {})",
                                provider.name(),
                                quote.current_price,
                                quote.previous_price
                            );
                        }
                        keep
                    });

                    if quotes.is_empty() {
                        last_error = Some(CoreError::EmptyFeedResult(instruments.join(", ")));
                        continue;
                    }
                    return Ok(quotes);
                }
                Err(e) => {
                    warn!("{} failed, trying next provider: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::EmptyFeedResult(instruments.join(", "))))
    }
}
