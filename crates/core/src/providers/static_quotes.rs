use async_trait::async_trait;

use super::traits::PriceProvider;
use crate::errors::CoreError;
use crate::models::price::{PriceMap, PriceQuote};

/// In-memory price feed backed by a fixed table of quotes.
///
/// Used for offline runs and seed data.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceProvider {
    quotes: PriceMap,
}

impl StaticPriceProvider {
    pub fn new(quotes: impl IntoIterator<Item = PriceQuote>) -> Self {
        Self {
            quotes: crate::models::price::price_map(quotes),
        }
    }

    /// Quotes matching the static seed portfolio.
    pub fn seed() -> Self {
        Self::new([
            PriceQuote::new("AAPL", 189.84, 187.15),
            PriceQuote::new("MSFT", 415.10, 417.32),
            PriceQuote::new("NVDA", 131.26, 131.26),
            PriceQuote::new("VOLV-B.ST", 268.40, 262.90),
        ])
    }

    pub fn insert(&mut self, quote: PriceQuote) {
        self.quotes.insert(quote.instrument.clone(), quote);
    }
}

#[async_trait]
impl PriceProvider for StaticPriceProvider {
    fn name(&self) -> &str {
        "Static"
    }

    async fn get_quotes(&self, instruments: &[String]) -> Result<PriceMap, CoreError> {
        Ok(instruments
            .iter()
            .filter_map(|symbol| {
                let key = symbol.trim().to_uppercase();
                self.quotes.get(&key).map(|q| (key, q.clone()))
            })
            .collect())
    }
}
