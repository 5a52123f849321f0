use crate::models::analytics::AggregateSummary;
use crate::models::metrics::EnrichedHolding;
use crate::services::metrics_service::return_percent;

/// Rolls enriched rows up into portfolio totals.
///
/// Stateless. Sums are plain additions, so folding portfolios one at a time
/// with `combine` gives the same totals as aggregating them all at once.
pub struct AggregationService;

impl AggregationService {
    pub fn new() -> Self {
        Self
    }

    /// Totals over every row of every set.
    pub fn aggregate(&self, sets: &[&[EnrichedHolding]]) -> AggregateSummary {
        sets.iter()
            .flat_map(|set| set.iter())
            .fold(AggregateSummary::default(), |acc, row| {
                self.combine(&acc, &self.summarize_row(row))
            })
    }

    /// Totals for a single set of rows.
    pub fn summarize(&self, rows: &[EnrichedHolding]) -> AggregateSummary {
        self.aggregate(&[rows])
    }

    /// Merge two summaries. `AggregateSummary::default()` is the identity.
    pub fn combine(&self, a: &AggregateSummary, b: &AggregateSummary) -> AggregateSummary {
        let invested_value = a.invested_value + b.invested_value;
        let profit_and_loss = a.profit_and_loss + b.profit_and_loss;
        AggregateSummary {
            row_count: a.row_count + b.row_count,
            invested_value,
            current_value: a.current_value + b.current_value,
            profit_and_loss,
            return_percent: return_percent(profit_and_loss, invested_value),
        }
    }

    fn summarize_row(&self, row: &EnrichedHolding) -> AggregateSummary {
        AggregateSummary {
            row_count: 1,
            invested_value: row.invested_value,
            current_value: row.current_value,
            profit_and_loss: row.profit_and_loss,
            return_percent: row.return_percent,
        }
    }
}

impl Default for AggregationService {
    fn default() -> Self {
        Self::new()
    }
}
