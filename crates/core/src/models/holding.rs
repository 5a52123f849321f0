use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A single portfolio position as entered by the user.
///
/// The instrument identifier is trimmed and uppercased on construction so
/// that lookups against the price feed are case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol, uppercased (e.g., "AAPL", "TATAMOTORS.NS")
    pub instrument: String,

    /// Number of units held
    pub quantity: f64,

    /// Average acquisition cost per unit
    pub average_cost: f64,
}

impl Holding {
    pub fn new(instrument: impl Into<String>, quantity: f64, average_cost: f64) -> Self {
        Self {
            instrument: instrument.into().trim().to_uppercase(),
            quantity,
            average_cost,
        }
    }

    /// Check the holding can enter a computation pass.
    ///
    /// Rules:
    /// - Instrument must not be blank
    /// - Quantity and average cost must be finite and non-negative
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.instrument.is_empty() {
            return Err(CoreError::ValidationError(
                "Instrument identifier must not be empty".into(),
            ));
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Quantity for {} must be a non-negative number, got {}",
                self.instrument, self.quantity
            )));
        }
        if !self.average_cost.is_finite() || self.average_cost < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Average cost for {} must be a non-negative number, got {}",
                self.instrument, self.average_cost
            )));
        }
        Ok(())
    }

    /// Capital put into the position: quantity × average cost.
    pub fn invested_value(&self) -> f64 {
        self.quantity * self.average_cost
    }
}

/// Static seed portfolio used when the user has not entered anything yet.
pub fn seed_holdings() -> Vec<Holding> {
    vec![
        Holding::new("AAPL", 15.0, 172.50),
        Holding::new("MSFT", 8.0, 331.20),
        Holding::new("NVDA", 12.0, 118.40),
        Holding::new("VOLV-B.ST", 40.0, 245.00),
    ]
}
