// ═══════════════════════════════════════════════════════════════════
// Service & Integration Tests — MetricsService, AggregationService,
// UploadService, HoldingsService, PriceService, Dashboard facade
// ═══════════════════════════════════════════════════════════════════

use approx::assert_relative_eq;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use portfolio_dashboard_core::errors::CoreError;
use portfolio_dashboard_core::models::analytics::{AggregateSummary, Severity};
use portfolio_dashboard_core::models::holding::Holding;
use portfolio_dashboard_core::models::metrics::{EnrichedHolding, Trend};
use portfolio_dashboard_core::models::price::{price_map, PriceMap, PriceQuote, QuoteCache};
use portfolio_dashboard_core::models::settings::Settings;
use portfolio_dashboard_core::providers::registry::PriceProviderRegistry;
use portfolio_dashboard_core::providers::static_quotes::StaticPriceProvider;
use portfolio_dashboard_core::providers::traits::PriceProvider;
use portfolio_dashboard_core::services::aggregation_service::AggregationService;
use portfolio_dashboard_core::services::holdings_service::HoldingsService;
use portfolio_dashboard_core::services::metrics_service::MetricsService;
use portfolio_dashboard_core::services::price_service::PriceService;
use portfolio_dashboard_core::services::upload_service::{quantile, UploadService};
use portfolio_dashboard_core::{greeting, Dashboard};

// ═══════════════════════════════════════════════════════════════════
// Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// Serves fixed quotes and counts how often it was asked.
struct CountingProvider {
    quotes: PriceMap,
    calls: Arc<AtomicUsize>,
}

impl CountingProvider {
    fn new(quotes: Vec<PriceQuote>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                quotes: price_map(quotes),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl PriceProvider for CountingProvider {
    fn name(&self) -> &str {
        "Counting"
    }

    async fn get_quotes(&self, instruments: &[String]) -> Result<PriceMap, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(instruments
            .iter()
            .filter_map(|s| self.quotes.get(s).map(|q| (s.clone(), q.clone())))
            .collect())
    }
}

/// Always fails, like a feed that is down.
struct FailingProvider;

#[async_trait]
impl PriceProvider for FailingProvider {
    fn name(&self) -> &str {
        "Failing"
    }

    async fn get_quotes(&self, _instruments: &[String]) -> Result<PriceMap, CoreError> {
        Err(CoreError::Network("connection refused".into()))
    }
}

/// Returns whatever it was built with, regardless of the request.
struct RawProvider(PriceMap);

#[async_trait]
impl PriceProvider for RawProvider {
    fn name(&self) -> &str {
        "Raw"
    }

    async fn get_quotes(&self, _instruments: &[String]) -> Result<PriceMap, CoreError> {
        Ok(self.0.clone())
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn registry_with(provider: impl PriceProvider + 'static) -> PriceProviderRegistry {
    let mut registry = PriceProviderRegistry::new();
    registry.register(Box::new(provider));
    registry
}

fn enriched(instrument: &str, quantity: f64, average_cost: f64, price: f64) -> EnrichedHolding {
    MetricsService::new().enrich(
        &Holding::new(instrument, quantity, average_cost),
        &PriceQuote::new(instrument, price, price),
    )
}

// ═══════════════════════════════════════════════════════════════════
// MetricsService
// ═══════════════════════════════════════════════════════════════════

mod metrics_service {
    use super::*;

    #[test]
    fn worked_example() {
        let holdings = vec![Holding::new("CCC", 100.0, 200.0)];
        let prices = price_map([PriceQuote::new("CCC", 250.0, 220.0)]);

        let report = MetricsService::new().calculate(&holdings, &prices);
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.rows.len(), 1);

        let row = &report.rows[0];
        assert_eq!(row.instrument, "CCC");
        assert_eq!(row.trend, Trend::Up);
        assert_eq!(row.invested_value, 20000.0);
        assert_eq!(row.current_value, 25000.0);
        assert_eq!(row.profit_and_loss, 5000.0);
        assert_relative_eq!(row.return_percent.unwrap(), 25.0, epsilon = 1e-9);
        assert_relative_eq!(row.target_price, 230.0, epsilon = 1e-9);
        assert_relative_eq!(row.stop_loss_price, 180.0, epsilon = 1e-9);
        assert_relative_eq!(row.target_pnl, 3000.0, epsilon = 1e-6);
        assert_relative_eq!(row.stop_loss_risk, 2000.0, epsilon = 1e-6);
    }

    #[test]
    fn missing_price_is_reported_not_defaulted() {
        let holdings = vec![Holding::new("AAA", 10.0, 100.0)];
        let prices = price_map([PriceQuote::new("ZZZ", 1.0, 1.0)]);

        let report = MetricsService::new().calculate(&holdings, &prices);
        assert!(report.rows.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(
            report.diagnostics[0].error,
            CoreError::MissingPriceData("AAA".into())
        );
        assert_eq!(report.diagnostics[0].severity, Severity::Warning);
        assert_eq!(report.missing_instruments(), vec!["AAA"]);
    }

    #[test]
    fn unusable_quotes_are_reported_as_missing() {
        let holdings = vec![
            Holding::new("AAA", 10.0, 100.0),
            Holding::new("BBB", 10.0, 100.0),
            Holding::new("CCC", 10.0, 100.0),
            Holding::new("DDD", 10.0, 100.0),
        ];
        let prices = price_map([
            PriceQuote::new("AAA", f64::NAN, 100.0),
            PriceQuote::new("BBB", f64::INFINITY, 100.0),
            PriceQuote::new("CCC", -5.0, 100.0),
            PriceQuote::new("DDD", 110.0, 100.0),
        ]);

        let report = MetricsService::new().calculate(&holdings, &prices);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].instrument, "DDD");
        assert!(report.rows[0].current_value.is_finite());
        assert_eq!(report.missing_instruments(), vec!["AAA", "BBB", "CCC"]);
        assert!(report
            .diagnostics
            .iter()
            .all(|d| matches!(d.error, CoreError::MissingPriceData(_))));
    }

    #[test]
    fn zero_invested_gives_undefined_return() {
        let holdings = vec![Holding::new("BBB", 0.0, 0.0)];
        let prices = price_map([PriceQuote::new("BBB", 50.0, 45.0)]);

        let report = MetricsService::new().calculate(&holdings, &prices);
        assert_eq!(report.rows.len(), 1);
        let row = &report.rows[0];
        assert_eq!(row.invested_value, 0.0);
        assert_eq!(row.return_percent, None);
        assert_eq!(row.trend, Trend::Up);
        assert_eq!(
            report.diagnostics[0].error,
            CoreError::UndefinedReturn("BBB".into())
        );
        assert_eq!(report.diagnostics[0].severity, Severity::Info);
    }

    #[test]
    fn bands_bracket_average_cost() {
        let service = MetricsService::new();
        for cost in [0.01, 1.0, 99.99, 200.0, 12_345.678] {
            let row = service.enrich(
                &Holding::new("X", 3.0, cost),
                &PriceQuote::new("X", cost, cost),
            );
            assert!(row.target_price > row.average_cost, "cost {cost}");
            assert!(row.average_cost > row.stop_loss_price, "cost {cost}");
        }
    }

    #[test]
    fn pnl_is_exactly_value_minus_invested() {
        let service = MetricsService::new();
        for (qty, cost, price) in [(7.0, 13.37, 9.99), (0.5, 1e6, 1.1e6), (123.0, 0.1, 0.3)] {
            let row = service.enrich(
                &Holding::new("X", qty, cost),
                &PriceQuote::new("X", price, price),
            );
            assert_eq!(row.profit_and_loss, row.current_value - row.invested_value);
        }
    }

    #[test]
    fn calculation_is_idempotent() {
        let holdings = vec![
            Holding::new("AAPL", 10.0, 150.0),
            Holding::new("MSFT", 5.0, 300.0),
            Holding::new("GONE", 1.0, 1.0),
        ];
        let prices = price_map([
            PriceQuote::new("AAPL", 190.0, 191.0),
            PriceQuote::new("MSFT", 300.0, 300.0),
        ]);
        let service = MetricsService::new();
        assert_eq!(
            service.calculate(&holdings, &prices),
            service.calculate(&holdings, &prices)
        );
    }

    #[test]
    fn trends_down_and_flat() {
        let holdings = vec![Holding::new("DN", 1.0, 10.0), Holding::new("FL", 1.0, 10.0)];
        let prices = price_map([
            PriceQuote::new("DN", 9.0, 11.0),
            PriceQuote::new("FL", 10.0, 10.0),
        ]);
        let report = MetricsService::new().calculate(&holdings, &prices);
        assert_eq!(report.rows[0].trend, Trend::Down);
        assert_eq!(report.rows[1].trend, Trend::Flat);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut holding = Holding::new("aapl", 1.0, 100.0);
        // Bypass the constructor to mimic a hand-built lowercase holding.
        holding.instrument = "aapl".into();
        let prices = price_map([PriceQuote::new("AAPL", 110.0, 100.0)]);
        let report = MetricsService::new().calculate(&[holding], &prices);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].instrument, "AAPL");
    }

    #[test]
    fn rows_keep_input_order() {
        let holdings = vec![
            Holding::new("C", 1.0, 1.0),
            Holding::new("A", 1.0, 1.0),
            Holding::new("B", 1.0, 1.0),
        ];
        let prices = price_map(["A", "B", "C"].map(|s| PriceQuote::new(s, 2.0, 1.0)));
        let report = MetricsService::new().calculate(&holdings, &prices);
        let order: Vec<&str> = report.rows.iter().map(|r| r.instrument.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn invalid_holding_skipped_with_warning() {
        let holdings = vec![Holding::new("NEG", -5.0, 10.0), Holding::new("OK", 1.0, 10.0)];
        let prices = price_map([
            PriceQuote::new("NEG", 10.0, 10.0),
            PriceQuote::new("OK", 10.0, 10.0),
        ]);
        let report = MetricsService::new().calculate(&holdings, &prices);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].instrument, "OK");
        assert!(matches!(
            report.diagnostics[0].error,
            CoreError::ValidationError(_)
        ));
        assert!(report.has_warnings());
    }

    #[test]
    fn empty_holdings_reported() {
        let report = MetricsService::new().calculate(&[], &PriceMap::new());
        assert!(report.rows.is_empty());
        assert_eq!(report.diagnostics[0].error, CoreError::EmptyPortfolio);
        assert!(!report.has_warnings());
    }

    #[test]
    fn losing_position() {
        let row = enriched("LOSS", 10.0, 50.0, 40.0);
        assert_eq!(row.profit_and_loss, -100.0);
        assert_relative_eq!(row.return_percent.unwrap(), -20.0, epsilon = 1e-9);
    }
}

// ═══════════════════════════════════════════════════════════════════
// AggregationService
// ═══════════════════════════════════════════════════════════════════

mod aggregation_service {
    use super::*;

    #[test]
    fn sums_all_rows() {
        let a = vec![enriched("A", 10.0, 100.0, 120.0), enriched("B", 5.0, 20.0, 10.0)];
        let summary = AggregationService::new().summarize(&a);
        assert_eq!(summary.row_count, 2);
        assert_eq!(summary.invested_value, 1100.0);
        assert_eq!(summary.current_value, 1250.0);
        assert_eq!(summary.profit_and_loss, 150.0);
        assert_relative_eq!(
            summary.return_percent.unwrap(),
            150.0 / 1100.0 * 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn multiple_portfolios() {
        let a = vec![enriched("A", 10.0, 100.0, 120.0)];
        let b = vec![enriched("B", 2.0, 50.0, 25.0)];
        let summary = AggregationService::new().aggregate(&[&a[..], &b[..]]);
        assert_eq!(summary.row_count, 2);
        assert_eq!(summary.invested_value, 1100.0);
        assert_eq!(summary.current_value, 1250.0);
        assert_eq!(summary.profit_and_loss, 150.0);
    }

    #[test]
    fn aggregation_is_associative() {
        let service = AggregationService::new();
        let a = vec![enriched("A", 10.0, 100.0, 120.0), enriched("A2", 3.0, 7.0, 8.0)];
        let b = vec![enriched("B", 2.0, 50.0, 25.0)];
        let c = vec![enriched("C", 40.0, 12.0, 15.0), enriched("C2", 1.0, 1.0, 0.0)];

        let ab = service.aggregate(&[&a[..], &b[..]]);
        let bc = service.aggregate(&[&b[..], &c[..]]);
        let abc = service.aggregate(&[&a[..], &b[..], &c[..]]);

        let ab_then_c = service.combine(&ab, &service.summarize(&c));
        let a_then_bc = service.combine(&service.summarize(&a), &bc);

        for other in [&ab_then_c, &a_then_bc] {
            assert_eq!(other.row_count, abc.row_count);
            assert_eq!(other.invested_value, abc.invested_value);
            assert_eq!(other.current_value, abc.current_value);
            assert_eq!(other.profit_and_loss, abc.profit_and_loss);
        }
    }

    #[test]
    fn empty_summary_is_identity() {
        let service = AggregationService::new();
        let a = service.summarize(&[enriched("A", 10.0, 100.0, 120.0)]);
        assert_eq!(service.combine(&a, &AggregateSummary::default()), a);
        assert_eq!(service.combine(&AggregateSummary::default(), &a), a);
    }

    #[test]
    fn zero_invested_total_has_undefined_return() {
        let service = AggregationService::new();
        let summary = service.summarize(&[enriched("Z", 0.0, 0.0, 50.0)]);
        assert_eq!(summary.invested_value, 0.0);
        assert_eq!(summary.return_percent, None);

        let nothing = service.aggregate(&[]);
        assert_eq!(nothing.row_count, 0);
        assert_eq!(nothing.return_percent, None);
    }
}

// ═══════════════════════════════════════════════════════════════════
// UploadService
// ═══════════════════════════════════════════════════════════════════

mod upload_service {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let csv = b"name,age,city\nAsha,31,Pune\nLars,45,Gothenburg\n";
        let table = UploadService::new().parse_csv(csv).unwrap();
        assert_eq!(table.headers, vec!["name", "age", "city"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1], vec!["Lars", "45", "Gothenburg"]);
    }

    #[test]
    fn quoted_fields() {
        let csv = b"name,note\n\"Doe, Jane\",\"said \"\"hi\"\"\"\n";
        let table = UploadService::new().parse_csv(csv).unwrap();
        assert_eq!(table.rows[0], vec!["Doe, Jane", "said \"hi\""]);
    }

    #[test]
    fn header_only_is_empty_table() {
        let table = UploadService::new().parse_csv(b"a,b\n").unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let err = UploadService::new()
            .parse_csv(b"a,b\n1,2\n3\n")
            .unwrap_err();
        assert!(matches!(err, CoreError::MalformedUpload(_)));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let err = UploadService::new()
            .parse_csv(b"a,b\n\xff\xfe,1\n")
            .unwrap_err();
        assert!(matches!(err, CoreError::MalformedUpload(_)));
    }

    #[test]
    fn empty_input_is_malformed() {
        let err = UploadService::new().parse_csv(b"").unwrap_err();
        assert!(matches!(err, CoreError::MalformedUpload(_)));
    }

    #[test]
    fn describe_numeric_column() {
        let csv = b"x,label\n1,a\n2,b\n3,c\n4,d\n";
        let service = UploadService::new();
        let table = service.parse_csv(csv).unwrap();
        let stats = service.describe(&table);

        assert_eq!(stats.len(), 1);
        let x = &stats[0];
        assert_eq!(x.column, "x");
        assert_eq!(x.count, 4);
        assert_relative_eq!(x.mean, 2.5);
        assert_relative_eq!(x.std.unwrap(), 1.290_994_448_735_805_6, epsilon = 1e-12);
        assert_relative_eq!(x.min, 1.0);
        assert_relative_eq!(x.p25, 1.75);
        assert_relative_eq!(x.p50, 2.5);
        assert_relative_eq!(x.p75, 3.25);
        assert_relative_eq!(x.max, 4.0);
    }

    #[test]
    fn describe_skips_blank_cells() {
        let csv = b"v,w\n10,a\n,b\n30,c\n";
        let service = UploadService::new();
        let table = service.parse_csv(csv).unwrap();
        let stats = service.describe(&table);
        assert_eq!(stats[0].count, 2);
        assert_relative_eq!(stats[0].mean, 20.0);
    }

    #[test]
    fn describe_single_value_has_no_std() {
        let service = UploadService::new();
        let table = service.parse_csv(b"v\n42\n").unwrap();
        let stats = service.describe(&table);
        assert_eq!(stats[0].count, 1);
        assert_eq!(stats[0].std, None);
        assert_relative_eq!(stats[0].p25, 42.0);
    }

    #[test]
    fn describe_ignores_text_columns() {
        let service = UploadService::new();
        let table = service.parse_csv(b"a,b\n1,x\n2,3\n").unwrap();
        let stats = service.describe(&table);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].column, "a");
    }

    #[test]
    fn quantile_interpolates() {
        let sorted = [10.0, 20.0, 30.0];
        assert_relative_eq!(quantile(&sorted, 0.0).unwrap(), 10.0);
        assert_relative_eq!(quantile(&sorted, 0.5).unwrap(), 20.0);
        assert_relative_eq!(quantile(&sorted, 0.75).unwrap(), 25.0);
        assert_relative_eq!(quantile(&sorted, 1.0).unwrap(), 30.0);
    }

    #[test]
    fn quantile_of_empty_data_is_none() {
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn quantile_of_single_value() {
        assert_eq!(quantile(&[7.0], 0.25), Some(7.0));
    }
}

// ═══════════════════════════════════════════════════════════════════
// HoldingsService
// ═══════════════════════════════════════════════════════════════════

mod holdings_service {
    use super::*;

    #[test]
    fn parse_entry() {
        let h = HoldingsService::new().parse_entry("tcs.ns:12:3450.5").unwrap();
        assert_eq!(h, Holding::new("TCS.NS", 12.0, 3450.5));
    }

    #[test]
    fn parse_entry_wrong_shape() {
        let err = HoldingsService::new().parse_entry("AAPL:10").unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn parse_entry_not_a_number() {
        let err = HoldingsService::new().parse_entry("AAPL:ten:150").unwrap_err();
        assert!(err.to_string().contains("quantity for AAPL"));
    }

    #[test]
    fn parse_entry_negative() {
        assert!(HoldingsService::new().parse_entry("AAPL:-1:150").is_err());
    }

    #[test]
    fn from_table_with_aliases() {
        let table = UploadService::new()
            .parse_csv(b"Symbol,Shares,Avg_Cost\naapl,10,150\nmsft,\"1,000\",300.5\n")
            .unwrap();
        let (holdings, diagnostics) = HoldingsService::new().from_table(&table).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(
            holdings,
            vec![
                Holding::new("AAPL", 10.0, 150.0),
                Holding::new("MSFT", 1000.0, 300.5),
            ]
        );
    }

    #[test]
    fn from_table_reports_bad_rows() {
        let table = UploadService::new()
            .parse_csv(b"instrument,quantity,average_cost\n,5,5\nBAD,x,5\nZERO,,\nOK,1,2\n")
            .unwrap();
        let (holdings, diagnostics) = HoldingsService::new().from_table(&table).unwrap();

        // Blank numeric cells count as zero: a no-op row, still computed.
        assert_eq!(
            holdings,
            vec![Holding::new("ZERO", 0.0, 0.0), Holding::new("OK", 1.0, 2.0)]
        );
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics[0].instrument.is_none());
        assert_eq!(diagnostics[1].instrument.as_deref(), Some("BAD"));
    }

    #[test]
    fn from_table_missing_column() {
        let table = UploadService::new()
            .parse_csv(b"symbol,quantity\nAAPL,1\n")
            .unwrap();
        let err = HoldingsService::new().from_table(&table).unwrap_err();
        assert!(matches!(err, CoreError::MalformedUpload(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// PriceService
// ═══════════════════════════════════════════════════════════════════

mod price_service {
    use super::*;

    fn service(registry: PriceProviderRegistry) -> PriceService {
        PriceService::new(registry, QuoteCache::new(Duration::minutes(5)))
    }

    #[tokio::test]
    async fn second_fetch_within_ttl_uses_cache() {
        let (provider, calls) = CountingProvider::new(vec![PriceQuote::new("AAPL", 190.0, 188.0)]);
        let mut svc = service(registry_with(provider));

        let first = svc.get_quotes_at(&symbols(&["AAPL"]), t0()).await.unwrap();
        let second = svc
            .get_quotes_at(&symbols(&["aapl"]), t0() + Duration::minutes(2))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_after_ttl_hits_provider_again() {
        let (provider, calls) = CountingProvider::new(vec![PriceQuote::new("AAPL", 190.0, 188.0)]);
        let mut svc = service(registry_with(provider));

        svc.get_quotes_at(&symbols(&["AAPL"]), t0()).await.unwrap();
        svc.get_quotes_at(&symbols(&["AAPL"]), t0() + Duration::minutes(6))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reordered_request_shares_cache_entry() {
        let (provider, calls) = CountingProvider::new(vec![
            PriceQuote::new("AAPL", 190.0, 188.0),
            PriceQuote::new("MSFT", 410.0, 415.0),
        ]);
        let mut svc = service(registry_with(provider));

        svc.get_quotes_at(&symbols(&["MSFT", "AAPL"]), t0()).await.unwrap();
        svc.get_quotes_at(&symbols(&["aapl", "msft", "AAPL"]), t0())
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(svc.cache().len(), 1);
    }

    #[tokio::test]
    async fn empty_feed_result_is_error() {
        let (provider, _) = CountingProvider::new(vec![]);
        let mut svc = service(registry_with(provider));

        let err = svc
            .get_quotes_at(&symbols(&["AAA", "BBB"]), t0())
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::EmptyFeedResult("AAA, BBB".into()));
        assert!(svc.cache().is_empty());
    }

    #[tokio::test]
    async fn falls_back_to_next_provider() {
        let mut registry = PriceProviderRegistry::new();
        registry.register(Box::new(FailingProvider));
        registry.register(Box::new(StaticPriceProvider::new([PriceQuote::new(
            "AAPL", 190.0, 188.0,
        )])));
        let mut svc = service(registry);

        let quotes = svc.get_quotes_at(&symbols(&["AAPL"]), t0()).await.unwrap();
        assert_eq!(quotes["AAPL"].current_price, 190.0);
    }

    #[tokio::test]
    async fn all_providers_failing_returns_last_error() {
        let mut svc = service(registry_with(FailingProvider));
        let err = svc.get_quotes_at(&symbols(&["AAPL"]), t0()).await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
    }

    #[tokio::test]
    async fn no_provider() {
        let mut svc = service(PriceProviderRegistry::new());
        let err = svc.get_quotes_at(&symbols(&["AAPL"]), t0()).await.unwrap_err();
        assert_eq!(err, CoreError::NoProvider);
    }

    #[tokio::test]
    async fn invalid_and_unrequested_quotes_dropped() {
        let raw = price_map([
            PriceQuote::new("AAPL", 190.0, 188.0),
            PriceQuote::new("BAD", f64::NAN, 1.0),
            PriceQuote::new("EXTRA", 5.0, 5.0),
        ]);
        let mut svc = service(registry_with(RawProvider(raw)));

        let quotes = svc
            .get_quotes_at(&symbols(&["AAPL", "BAD"]), t0())
            .await
            .unwrap();
        assert_eq!(quotes.len(), 1);
        assert!(quotes.contains_key("AAPL"));
    }

    #[tokio::test]
    async fn empty_request_skips_providers() {
        let (provider, calls) = CountingProvider::new(vec![]);
        let mut svc = service(registry_with(provider));
        let quotes = svc.get_quotes_at(&[], t0()).await.unwrap();
        assert!(quotes.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Dashboard facade
// ═══════════════════════════════════════════════════════════════════

mod dashboard {
    use super::*;

    fn dashboard(quotes: Vec<PriceQuote>) -> Dashboard {
        Dashboard::with_registry(
            Settings::default(),
            registry_with(StaticPriceProvider::new(quotes)),
        )
    }

    #[tokio::test]
    async fn render_with_partial_prices() {
        let mut dash = dashboard(vec![PriceQuote::new("CCC", 250.0, 220.0)]);
        let holdings = vec![Holding::new("CCC", 100.0, 200.0), Holding::new("AAA", 10.0, 100.0)];

        let report = dash.render_portfolio_at(&holdings, t0()).await;
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].instrument, "CCC");
        assert_eq!(report.missing_instruments(), vec!["AAA"]);
    }

    #[tokio::test]
    async fn huge_cache_ttl_still_renders() {
        let settings = Settings {
            cache_ttl_secs: u64::MAX,
            ..Settings::default()
        };
        let mut dash = Dashboard::with_registry(
            settings,
            registry_with(StaticPriceProvider::new(vec![PriceQuote::new("AAA", 110.0, 100.0)])),
        );

        let report = dash.render_portfolio_at(&[Holding::new("AAA", 10.0, 100.0)], t0()).await;
        assert_eq!(report.rows.len(), 1);
    }

    #[tokio::test]
    async fn empty_feed_fails_whole_batch() {
        let mut dash = dashboard(vec![]);
        let holdings = vec![Holding::new("AAA", 10.0, 100.0), Holding::new("BBB", 1.0, 1.0)];

        let report = dash.render_portfolio_at(&holdings, t0()).await;
        assert!(report.rows.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert!(matches!(
            report.diagnostics[0].error,
            CoreError::EmptyFeedResult(_)
        ));
    }

    #[tokio::test]
    async fn empty_holdings() {
        let mut dash = dashboard(vec![]);
        let report = dash.render_portfolio_at(&[], t0()).await;
        assert_eq!(report.diagnostics[0].error, CoreError::EmptyPortfolio);
    }

    #[tokio::test]
    async fn invalid_holdings_do_not_reach_feed() {
        let mut dash = dashboard(vec![PriceQuote::new("OK", 2.0, 1.0)]);
        let holdings = vec![Holding::new("", 1.0, 1.0), Holding::new("OK", 1.0, 1.0)];
        let report = dash.render_portfolio_at(&holdings, t0()).await;
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn summarize_across_renders() {
        let mut dash = dashboard(vec![
            PriceQuote::new("A", 120.0, 110.0),
            PriceQuote::new("B", 25.0, 30.0),
        ]);
        let first = dash
            .render_portfolio_at(&[Holding::new("A", 10.0, 100.0)], t0())
            .await;
        let second = dash
            .render_portfolio_at(&[Holding::new("B", 2.0, 50.0)], t0())
            .await;

        let total = dash.summarize(&[&first, &second]);
        assert_eq!(total.row_count, 2);
        assert_eq!(total.invested_value, 1100.0);
        assert_eq!(total.current_value, 1250.0);
        assert_eq!(total.profit_and_loss, 150.0);
    }

    #[test]
    fn holdings_from_csv() {
        let dash = dashboard(vec![]);
        let (holdings, diagnostics) = dash
            .holdings_from_csv(b"ticker,qty,cost\nnvda,3,120\n")
            .unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(holdings, vec![Holding::new("NVDA", 3.0, 120.0)]);
    }

    #[test]
    fn csv_viewer_flow() {
        let dash = dashboard(vec![]);
        let table = dash.load_csv(b"score\n1\n2\n3\n").unwrap();
        let stats = dash.describe(&table);
        assert_eq!(stats[0].count, 3);
        assert_relative_eq!(stats[0].mean, 2.0);
    }

    #[test]
    fn greeting_requires_name() {
        assert_eq!(
            greeting(" Asha ").as_deref(),
            Some("Hello, Asha! 👋 Please upload a CSV file to continue.")
        );
        assert!(greeting("   ").is_none());
    }

    #[test]
    fn debug_lists_providers() {
        let dash = dashboard(vec![]);
        let debug = format!("{dash:?}");
        assert!(debug.contains("Static"));
    }
}
