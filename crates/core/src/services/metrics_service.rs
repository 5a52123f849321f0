use crate::errors::CoreError;
use crate::models::analytics::{Diagnostic, PortfolioReport};
use crate::models::holding::Holding;
use crate::models::metrics::{EnrichedHolding, Trend, STOP_LOSS_MULTIPLIER, TARGET_MULTIPLIER};
use crate::models::price::{PriceMap, PriceQuote};

/// Derives per-row portfolio metrics from holdings and quotes.
///
/// Pure business logic — no I/O, no API calls. The same input always gives
/// the same report.
pub struct MetricsService;

impl MetricsService {
    pub fn new() -> Self {
        Self
    }

    /// Enrich every holding that has a quote, in input order.
    ///
    /// - Invalid holdings are skipped with a `ValidationError` warning.
    /// - Holdings without a quote are skipped with a `MissingPriceData` warning.
    /// - Holdings with zero invested value are kept, with an undefined return
    ///   and an `UndefinedReturn` note.
    pub fn calculate(&self, holdings: &[Holding], prices: &PriceMap) -> PortfolioReport {
        if holdings.is_empty() {
            return PortfolioReport::failed(CoreError::EmptyPortfolio);
        }

        let mut report = PortfolioReport::default();

        for holding in holdings {
            // Lookups are case-insensitive even for holdings built by hand.
            let instrument = holding.instrument.trim().to_uppercase();

            if let Err(e) = holding.validate() {
                report.diagnostics.push(Diagnostic::new(
                    Some(instrument).filter(|s| !s.is_empty()),
                    e,
                ));
                continue;
            }

            // A non-finite or negative quote counts as no quote at all.
            let Some(quote) = prices.get(&instrument).filter(|q| q.is_valid()) else {
                report.diagnostics.push(Diagnostic::for_instrument(
                    instrument.clone(),
                    CoreError::MissingPriceData(instrument),
                ));
                continue;
            };

            let row = self.enrich(holding, quote);
            if row.return_percent.is_none() {
                report.diagnostics.push(Diagnostic::for_instrument(
                    instrument.clone(),
                    CoreError::UndefinedReturn(instrument),
                ));
            }
            report.rows.push(row);
        }

        report
    }

    /// Derive every column for a single holding/quote pair.
    pub fn enrich(&self, holding: &Holding, quote: &PriceQuote) -> EnrichedHolding {
        let quantity = holding.quantity;
        let average_cost = holding.average_cost;

        let invested_value = quantity * average_cost;
        let current_value = quantity * quote.current_price;
        let profit_and_loss = current_value - invested_value;
        let target_price = average_cost * TARGET_MULTIPLIER;
        let stop_loss_price = average_cost * STOP_LOSS_MULTIPLIER;

        EnrichedHolding {
            instrument: holding.instrument.trim().to_uppercase(),
            quantity,
            average_cost,
            current_price: quote.current_price,
            previous_price: quote.previous_price,
            trend: Trend::classify(quote.current_price, quote.previous_price),
            invested_value,
            current_value,
            profit_and_loss,
            return_percent: return_percent(profit_and_loss, invested_value),
            target_price,
            stop_loss_price,
            target_pnl: (target_price - average_cost) * quantity,
            stop_loss_risk: (average_cost - stop_loss_price) * quantity,
        }
    }
}

impl Default for MetricsService {
    fn default() -> Self {
        Self::new()
    }
}

/// P&L as a percentage of invested capital; `None` when nothing was invested.
pub fn return_percent(profit_and_loss: f64, invested_value: f64) -> Option<f64> {
    if invested_value == 0.0 {
        None
    } else {
        Some(profit_and_loss / invested_value * 100.0)
    }
}
