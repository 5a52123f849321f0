use serde::{Deserialize, Serialize};

/// Take-profit band above average cost (+15%).
pub const TARGET_MULTIPLIER: f64 = 1.15;

/// Stop-loss band below average cost (−10%).
pub const STOP_LOSS_MULTIPLIER: f64 = 0.90;

/// Direction of the move between the previous and the current close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    /// Classify a price move. Equal prices are `Flat`.
    pub fn classify(current_price: f64, previous_price: f64) -> Self {
        if current_price > previous_price {
            Trend::Up
        } else if current_price < previous_price {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Up => write!(f, "Up"),
            Trend::Down => write!(f, "Down"),
            Trend::Flat => write!(f, "Flat"),
        }
    }
}

/// A holding joined with its quote and every derived column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedHolding {
    pub instrument: String,
    pub quantity: f64,
    pub average_cost: f64,

    pub current_price: f64,
    pub previous_price: f64,
    pub trend: Trend,

    /// quantity × average_cost
    pub invested_value: f64,

    /// quantity × current_price
    pub current_value: f64,

    /// current_value − invested_value
    pub profit_and_loss: f64,

    /// P&L / invested × 100. `None` when nothing was invested.
    pub return_percent: Option<f64>,

    pub target_price: f64,
    pub stop_loss_price: f64,

    /// Gain if the target price is reached
    pub target_pnl: f64,

    /// Loss if the stop-loss price is hit
    pub stop_loss_risk: f64,
}
