use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Latest and previous close for one instrument, as returned by a price feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub instrument: String,
    pub current_price: f64,
    pub previous_price: f64,
}

impl PriceQuote {
    pub fn new(instrument: impl Into<String>, current_price: f64, previous_price: f64) -> Self {
        Self {
            instrument: instrument.into().trim().to_uppercase(),
            current_price,
            previous_price,
        }
    }

    /// Both prices are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.current_price.is_finite()
            && self.previous_price.is_finite()
            && self.current_price >= 0.0
            && self.previous_price >= 0.0
    }
}

/// Quotes keyed by uppercased instrument identifier.
pub type PriceMap = HashMap<String, PriceQuote>;

/// Build a `PriceMap` from a list of quotes. Later duplicates win.
pub fn price_map(quotes: impl IntoIterator<Item = PriceQuote>) -> PriceMap {
    quotes
        .into_iter()
        .map(|q| (q.instrument.clone(), q))
        .collect()
}

/// Cache key: the sorted, de-duplicated, uppercased set of requested instruments.
pub type QuoteCacheKey = Vec<String>;

#[derive(Debug, Clone)]
struct QuoteCacheEntry {
    fetched_at: DateTime<Utc>,
    quotes: PriceMap,
}

/// Expiring memo of bulk price fetches.
///
/// One entry per requested instrument set. An entry older than `ttl` is
/// treated as absent, so the next lookup goes back to the feed.
#[derive(Debug, Clone)]
pub struct QuoteCache {
    ttl: Duration,
    entries: HashMap<QuoteCacheKey, QuoteCacheEntry>,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Normalize a request into its cache key. `["msft", "AAPL", "MSFT"]` and
    /// `["aapl", "msft"]` share the key `["AAPL", "MSFT"]`.
    pub fn key_for(instruments: &[String]) -> QuoteCacheKey {
        instruments
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh quotes for this key at `now`, if any.
    pub fn get(&self, key: &QuoteCacheKey, now: DateTime<Utc>) -> Option<&PriceMap> {
        self.entries
            .get(key)
            .filter(|entry| now - entry.fetched_at < self.ttl)
            .map(|entry| &entry.quotes)
    }

    pub fn insert(&mut self, key: QuoteCacheKey, quotes: PriceMap, now: DateTime<Utc>) {
        self.entries.insert(
            key,
            QuoteCacheEntry {
                fetched_at: now,
                quotes,
            },
        );
    }

    /// Drop every expired entry. Returns the number removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| now - entry.fetched_at < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new(Duration::seconds(crate::models::settings::DEFAULT_CACHE_TTL_SECS as i64))
    }
}
