use serde::{Deserialize, Serialize};

use super::metrics::EnrichedHolding;
use crate::errors::CoreError;

/// How loudly a diagnostic should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

/// An inline message produced alongside computed rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Instrument the message is about, if it concerns a single row
    pub instrument: Option<String>,
    pub severity: Severity,
    pub error: CoreError,
}

impl Diagnostic {
    pub fn new(instrument: Option<String>, error: CoreError) -> Self {
        let severity = if error.is_warning() {
            Severity::Warning
        } else {
            Severity::Info
        };
        Self {
            instrument,
            severity,
            error,
        }
    }

    pub fn for_instrument(instrument: impl Into<String>, error: CoreError) -> Self {
        Self::new(Some(instrument.into()), error)
    }

    pub fn global(error: CoreError) -> Self {
        Self::new(None, error)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Output of one calculator pass: the rows that could be computed and
/// everything that went wrong with the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioReport {
    pub rows: Vec<EnrichedHolding>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PortfolioReport {
    /// A report with no rows and a single diagnostic.
    pub fn failed(error: CoreError) -> Self {
        Self {
            rows: Vec::new(),
            diagnostics: vec![Diagnostic::global(error)],
        }
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning)
    }

    /// Instruments dropped for lack of a quote.
    pub fn missing_instruments(&self) -> Vec<&str> {
        self.diagnostics
            .iter()
            .filter_map(|d| match &d.error {
                CoreError::MissingPriceData(symbol) => Some(symbol.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Totals over any number of enriched rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    /// Number of rows folded into this summary
    pub row_count: usize,

    /// Sum of invested values
    pub invested_value: f64,

    /// Sum of current values
    pub current_value: f64,

    /// Sum of profit and loss
    pub profit_and_loss: f64,

    /// Aggregate P&L / aggregate invested × 100. `None` when nothing was invested.
    pub return_percent: Option<f64>,
}
