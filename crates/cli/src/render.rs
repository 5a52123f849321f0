//! Plain-text rendering of reports, tables and diagnostics.

use portfolio_dashboard_core::models::analytics::{AggregateSummary, Diagnostic, Severity};
use portfolio_dashboard_core::models::display::{pnl_hint, DisplayHint};
use portfolio_dashboard_core::models::metrics::EnrichedHolding;
use portfolio_dashboard_core::models::settings::Settings;
use portfolio_dashboard_core::models::upload::{ColumnSummary, UploadedTable};

/// Terminal output options derived from settings and flags.
pub struct Style {
    pub color: bool,
    pub column_width: usize,
    pub currency: String,
}

impl Style {
    pub fn from_settings(settings: &Settings, color: bool) -> Self {
        Self {
            color,
            column_width: if settings.wide_layout { 14 } else { 10 },
            currency: settings.currency.clone(),
        }
    }

    fn paint(&self, text: &str, hint: DisplayHint) -> String {
        if !self.color {
            return text.to_string();
        }
        let code = match hint.color {
            "green" => "32",
            "red" => "31",
            "gray" => "90",
            _ => return text.to_string(),
        };
        format!("\x1b[{code}m{text}\x1b[0m")
    }

    fn cell(&self, text: &str) -> String {
        format!("{text:>width$}", width = self.column_width)
    }
}

pub fn title(settings: &Settings) -> String {
    let underline = "=".repeat(settings.page_title.chars().count());
    let mut out = format!("{}\n{underline}\n", settings.page_title);
    if let Some(sheet) = &settings.stylesheet {
        out.push_str(&format!("(stylesheet: {sheet})\n"));
    }
    out
}

pub fn subheader(text: &str) -> String {
    format!("\n{text}\n{}\n", "-".repeat(text.chars().count()))
}

fn money(value: f64) -> String {
    format!("{value:.2}")
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}%"))
}

pub fn portfolio_table(rows: &[EnrichedHolding], style: &Style) -> String {
    const HEADERS: [&str; 13] = [
        "Instrument", "Qty", "Avg Cost", "Price", "Prev", "Trend", "Invested", "Value", "P&L",
        "Return", "Target", "Stop Loss", "Target P&L",
    ];

    let mut out = String::new();
    let header: Vec<String> = HEADERS.iter().map(|h| style.cell(h)).collect();
    out.push_str(&header.join(" "));
    out.push('\n');

    for row in rows {
        let trend = row.trend.display_hint();
        let pnl = pnl_hint(row.profit_and_loss);
        let cells = [
            style.cell(&row.instrument),
            style.cell(&format!("{}", row.quantity)),
            style.cell(&money(row.average_cost)),
            style.cell(&money(row.current_price)),
            style.cell(&money(row.previous_price)),
            style.paint(&style.cell(trend.label), trend),
            style.cell(&money(row.invested_value)),
            style.cell(&money(row.current_value)),
            style.paint(&style.cell(&money(row.profit_and_loss)), pnl),
            style.paint(&style.cell(&percent(row.return_percent)), pnl),
            style.cell(&money(row.target_price)),
            style.cell(&money(row.stop_loss_price)),
            style.cell(&money(row.target_pnl)),
        ];
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

pub fn summary(summary: &AggregateSummary, style: &Style) -> String {
    let pnl = pnl_hint(summary.profit_and_loss);
    format!(
        "Holdings:       {}\nInvested:       {} {}\nCurrent value:  {} {}\nP&L:            {}\nReturn:         {}\n",
        summary.row_count,
        money(summary.invested_value),
        style.currency,
        money(summary.current_value),
        style.currency,
        style.paint(&format!("{} {}", money(summary.profit_and_loss), style.currency), pnl),
        style.paint(&percent(summary.return_percent), pnl),
    )
}

pub fn risk_table(rows: &[EnrichedHolding], style: &Style) -> String {
    let mut out = format!(
        "{} {} {}\n",
        style.cell("Instrument"),
        style.cell("Target P&L"),
        style.cell("SL Risk")
    );
    for row in rows {
        out.push_str(&format!(
            "{} {} {}\n",
            style.cell(&row.instrument),
            style.cell(&money(row.target_pnl)),
            style.cell(&money(row.stop_loss_risk)),
        ));
    }
    out
}

pub fn diagnostics(diagnostics: &[Diagnostic], style: &Style) -> String {
    diagnostics
        .iter()
        .map(|d| {
            let (tag, hint) = match d.severity {
                Severity::Warning => ("warning", DisplayHint { color: "red", label: "" }),
                Severity::Info => ("info", DisplayHint { color: "gray", label: "" }),
            };
            format!("{} {d}\n", style.paint(&format!("[{tag}]"), hint))
        })
        .collect()
}

pub fn table(table: &UploadedTable, rows: &[Vec<String>], style: &Style) -> String {
    let mut out = table
        .headers
        .iter()
        .map(|h| style.cell(h))
        .collect::<Vec<_>>()
        .join(" ");
    out.push('\n');
    for row in rows {
        out.push_str(&row.iter().map(|c| style.cell(c)).collect::<Vec<_>>().join(" "));
        out.push('\n');
    }
    out
}

pub fn describe(summaries: &[ColumnSummary], style: &Style) -> String {
    if summaries.is_empty() {
        return "No numeric columns.\n".to_string();
    }

    let mut out = style.cell("");
    for s in summaries {
        out.push(' ');
        out.push_str(&style.cell(&s.column));
    }
    out.push('\n');

    for name in ["count", "mean", "std", "min", "25%", "50%", "75%", "max"] {
        out.push_str(&style.cell(name));
        for s in summaries {
            out.push(' ');
            out.push_str(&style.cell(&statistic(s, name)));
        }
        out.push('\n');
    }
    out
}

fn statistic(s: &ColumnSummary, name: &str) -> String {
    let value = match name {
        "count" => return s.count.to_string(),
        "std" => match s.std {
            Some(std) => std,
            None => return "NaN".to_string(),
        },
        "mean" => s.mean,
        "min" => s.min,
        "25%" => s.p25,
        "50%" => s.p50,
        "75%" => s.p75,
        _ => s.max,
    };
    format!("{value:.4}")
}
