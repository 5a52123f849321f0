use serde::Serialize;

use super::metrics::Trend;

/// How a front end should paint a value: a color name and a short label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayHint {
    pub color: &'static str,
    pub label: &'static str,
}

impl Trend {
    pub fn display_hint(self) -> DisplayHint {
        match self {
            Trend::Up => DisplayHint {
                color: "green",
                label: "▲ Up",
            },
            Trend::Down => DisplayHint {
                color: "red",
                label: "▼ Down",
            },
            Trend::Flat => DisplayHint {
                color: "gray",
                label: "● Flat",
            },
        }
    }
}

/// Hint for a signed money amount (P&L columns).
pub fn pnl_hint(value: f64) -> DisplayHint {
    if value > 0.0 {
        DisplayHint {
            color: "green",
            label: "profit",
        }
    } else if value < 0.0 {
        DisplayHint {
            color: "red",
            label: "loss",
        }
    } else {
        DisplayHint {
            color: "gray",
            label: "even",
        }
    }
}
