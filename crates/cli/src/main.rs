//! Portfolio Dashboard CLI.
//!
//! Renders the portfolio page (holdings, live prices, P&L, risk bands) and the
//! CSV viewer page in the terminal. Every run is one independent render.

mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use portfolio_dashboard_core::models::analytics::Diagnostic;
use portfolio_dashboard_core::models::holding::{seed_holdings, Holding};
use portfolio_dashboard_core::models::settings::Settings;
use portfolio_dashboard_core::providers::registry::PriceProviderRegistry;
use portfolio_dashboard_core::providers::static_quotes::StaticPriceProvider;
use portfolio_dashboard_core::{greeting, Dashboard};
use serde_json::json;

use render::Style;

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Portfolio dashboard - holdings metrics and CSV viewer")]
#[command(version)]
struct Cli {
    /// Settings file (JSON); defaults apply for anything it leaves out
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute P&L, returns and risk bands for a portfolio
    Portfolio {
        /// Holding as SYMBOL:QUANTITY:AVERAGE_COST (repeatable)
        #[arg(short = 'H', long = "holding")]
        holdings: Vec<String>,
        /// CSV file with instrument, quantity and average_cost columns
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Include the built-in seed portfolio
        #[arg(long)]
        seed: bool,
        /// Use built-in static quotes instead of live price feeds
        #[arg(long)]
        offline: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Preview a CSV file and show summary statistics
    Csv {
        /// CSV file to load
        file: PathBuf,
        /// Your name, for the greeting
        #[arg(short, long)]
        name: Option<String>,
        /// Number of rows to preview
        #[arg(short, long, default_value = "20")]
        preview: usize,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    let color = !cli.no_color && std::io::stdout().is_terminal();

    match cli.command {
        Commands::Portfolio {
            holdings,
            csv,
            seed,
            offline,
            json,
        } => handle_portfolio(settings, holdings, csv, seed, offline, json, color).await,
        Commands::Csv {
            file,
            name,
            preview,
        } => handle_csv(settings, &file, name.as_deref(), preview, color),
    }
}

fn load_settings(path: Option<&std::path::Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load_from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    Ok(settings.with_env_overrides())
}

async fn handle_portfolio(
    settings: Settings,
    entries: Vec<String>,
    csv: Option<PathBuf>,
    seed: bool,
    offline: bool,
    as_json: bool,
    color: bool,
) -> Result<()> {
    let mut dashboard = if offline {
        let mut registry = PriceProviderRegistry::new();
        registry.register(Box::new(StaticPriceProvider::seed()));
        Dashboard::with_registry(settings, registry)
    } else {
        Dashboard::new(settings)
    };
    debug!("Price feeds: {:?}", dashboard.provider_names());

    let style = Style::from_settings(dashboard.settings(), color);
    let mut holdings: Vec<Holding> = Vec::new();
    let mut input_diagnostics = Vec::new();

    for entry in &entries {
        match dashboard.parse_holding(entry) {
            Ok(holding) => holdings.push(holding),
            Err(e) => input_diagnostics.push(Diagnostic::global(e)),
        }
    }

    if let Some(path) = &csv {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        match dashboard.holdings_from_csv(&bytes) {
            Ok((from_csv, diagnostics)) => {
                info!("Loaded {} holdings from {}", from_csv.len(), path.display());
                holdings.extend(from_csv);
                input_diagnostics.extend(diagnostics);
            }
            Err(e) => input_diagnostics.push(Diagnostic::global(e)),
        }
    }

    // Nothing entered: fall back to the seed list, like a fresh page.
    if seed || (entries.is_empty() && csv.is_none()) {
        holdings.extend(seed_holdings());
    }

    let mut report = dashboard.render_portfolio(&holdings).await;
    input_diagnostics.append(&mut report.diagnostics);
    report.diagnostics = input_diagnostics;
    let summary = dashboard.summarize(&[&report]);

    if as_json {
        let diagnostics: Vec<_> = report
            .diagnostics
            .iter()
            .map(|d| {
                json!({
                    "instrument": d.instrument,
                    "severity": d.severity,
                    "message": d.to_string(),
                })
            })
            .collect();
        let output = json!({
            "rows": report.rows,
            "summary": summary,
            "diagnostics": diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print!("{}", render::title(dashboard.settings()));
    print!("{}", render::diagnostics(&report.diagnostics, &style));
    if report.rows.is_empty() {
        println!("\nNo holdings could be priced.");
        return Ok(());
    }
    print!("{}", render::subheader("Holdings"));
    print!("{}", render::portfolio_table(&report.rows, &style));
    print!("{}", render::subheader("Risk"));
    print!("{}", render::risk_table(&report.rows, &style));
    print!("{}", render::subheader("Summary"));
    print!("{}", render::summary(&summary, &style));
    Ok(())
}

fn handle_csv(
    settings: Settings,
    file: &std::path::Path,
    name: Option<&str>,
    preview: usize,
    color: bool,
) -> Result<()> {
    let dashboard = Dashboard::with_registry(settings, PriceProviderRegistry::new());
    let style = Style::from_settings(dashboard.settings(), color);

    println!("Welcome to the CSV Viewer App");
    if let Some(message) = name.and_then(greeting) {
        println!("{message}");
    }

    let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let table = match dashboard.load_csv(&bytes) {
        Ok(table) => table,
        Err(e) => {
            let diagnostic = Diagnostic::global(e);
            print!("{}", render::diagnostics(&[diagnostic], &style));
            return Ok(());
        }
    };

    print!("{}", render::subheader("Preview of Uploaded CSV"));
    print!("{}", render::table(&table, table.head(preview), &style));
    if table.row_count() > preview {
        println!("... {} more rows", table.row_count() - preview);
    }

    print!("{}", render::subheader("Summary Statistics"));
    print!("{}", render::describe(&dashboard.describe(&table), &style));
    Ok(())
}
