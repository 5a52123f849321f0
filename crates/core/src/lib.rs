pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::{DateTime, Utc};
use log::info;
use models::{
    analytics::{AggregateSummary, Diagnostic, PortfolioReport},
    holding::Holding,
    price::{PriceMap, QuoteCache},
    settings::Settings,
    upload::{ColumnSummary, UploadedTable},
};
use providers::registry::PriceProviderRegistry;
use services::{
    aggregation_service::AggregationService, holdings_service::HoldingsService,
    metrics_service::MetricsService, price_service::PriceService,
    upload_service::UploadService,
};

use errors::CoreError;

/// Main entry point for the Portfolio Dashboard core library.
///
/// One `Dashboard` serves one user. Each render takes its inputs as
/// arguments and returns everything it computed; nothing accumulates
/// between renders except the short-lived quote cache.
#[must_use]
pub struct Dashboard {
    settings: Settings,
    price_service: PriceService,
    metrics_service: MetricsService,
    aggregation_service: AggregationService,
    holdings_service: HoldingsService,
    upload_service: UploadService,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("settings", &self.settings)
            .field("providers", &self.price_service.provider_names())
            .field("cached_quote_sets", &self.price_service.cache().len())
            .finish()
    }
}

impl Dashboard {
    /// Create a dashboard with the default price feeds for these settings.
    pub fn new(settings: Settings) -> Self {
        let registry = PriceProviderRegistry::new_with_defaults(&settings.api_keys);
        Self::with_registry(settings, registry)
    }

    /// Create a dashboard with an explicit set of price feeds.
    pub fn with_registry(settings: Settings, registry: PriceProviderRegistry) -> Self {
        let cache = QuoteCache::new(settings.cache_ttl());
        Self {
            price_service: PriceService::new(registry, cache),
            metrics_service: MetricsService::new(),
            aggregation_service: AggregationService::new(),
            holdings_service: HoldingsService::new(),
            upload_service: UploadService::new(),
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Names of the configured price feeds, in fallback order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.price_service.provider_names()
    }

    // ── Portfolio ───────────────────────────────────────────────────

    /// Fetch quotes for the holdings and compute every derived column.
    pub async fn render_portfolio(&mut self, holdings: &[Holding]) -> PortfolioReport {
        self.render_portfolio_at(holdings, Utc::now()).await
    }

    /// Same as `render_portfolio`, with an explicit clock for the quote cache.
    ///
    /// A feed failure for the batch yields a report with no rows and a
    /// single diagnostic; the calculator never runs on partial data.
    pub async fn render_portfolio_at(
        &mut self,
        holdings: &[Holding],
        now: DateTime<Utc>,
    ) -> PortfolioReport {
        if holdings.is_empty() {
            return PortfolioReport::failed(CoreError::EmptyPortfolio);
        }

        let instruments: Vec<String> = holdings
            .iter()
            .filter(|h| h.validate().is_ok())
            .map(|h| h.instrument.clone())
            .collect();

        let prices = if instruments.is_empty() {
            PriceMap::new()
        } else {
            match self.price_service.get_quotes_at(&instruments, now).await {
                Ok(prices) => prices,
                Err(e) => return PortfolioReport::failed(e),
            }
        };

        let report = self.metrics_service.calculate(holdings, &prices);
        info!(
            "Rendered {} of {} holdings ({} diagnostics)",
            report.rows.len(),
            holdings.len(),
            report.diagnostics.len()
        );
        report
    }

    /// Totals across one or more computed portfolios.
    #[must_use]
    pub fn summarize(&self, reports: &[&PortfolioReport]) -> AggregateSummary {
        let sets: Vec<&[_]> = reports.iter().map(|r| r.rows.as_slice()).collect();
        self.aggregation_service.aggregate(&sets)
    }

    // ── Input ───────────────────────────────────────────────────────

    /// Parse a manual `SYMBOL:QUANTITY:AVERAGE_COST` entry.
    pub fn parse_holding(&self, entry: &str) -> Result<Holding, CoreError> {
        self.holdings_service.parse_entry(entry)
    }

    /// Read holdings from an uploaded CSV file.
    pub fn holdings_from_csv(
        &self,
        bytes: &[u8],
    ) -> Result<(Vec<Holding>, Vec<Diagnostic>), CoreError> {
        let table = self.upload_service.parse_csv(bytes)?;
        self.holdings_service.from_table(&table)
    }

    // ── CSV viewer ──────────────────────────────────────────────────

    /// Parse an uploaded CSV file for display.
    pub fn load_csv(&self, bytes: &[u8]) -> Result<UploadedTable, CoreError> {
        self.upload_service.parse_csv(bytes)
    }

    /// Summary statistics for the numeric columns of a parsed upload.
    #[must_use]
    pub fn describe(&self, table: &UploadedTable) -> Vec<ColumnSummary> {
        self.upload_service.describe(table)
    }
}

/// Greeting shown once the user has entered a name. Blank names get none.
pub fn greeting(name: &str) -> Option<String> {
    let name = name.trim();
    (!name.is_empty())
        .then(|| format!("Hello, {name}! 👋 Please upload a CSV file to continue."))
}
