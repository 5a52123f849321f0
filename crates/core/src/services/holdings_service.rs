use crate::errors::CoreError;
use crate::models::analytics::Diagnostic;
use crate::models::holding::Holding;
use crate::models::upload::UploadedTable;

const INSTRUMENT_COLUMNS: &[&str] = &["instrument", "symbol", "ticker", "stock"];
const QUANTITY_COLUMNS: &[&str] = &["quantity", "qty", "shares", "units"];
const COST_COLUMNS: &[&str] = &["average_cost", "avg_cost", "avg price", "cost", "buy_price"];

/// Turns user input (manual entries, uploaded tables) into holdings.
pub struct HoldingsService;

impl HoldingsService {
    pub fn new() -> Self {
        Self
    }

    /// Parse a manual entry of the form `SYMBOL:QUANTITY:AVERAGE_COST`.
    pub fn parse_entry(&self, entry: &str) -> Result<Holding, CoreError> {
        let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
        let [symbol, quantity, cost] = parts.as_slice() else {
            return Err(CoreError::ValidationError(format!(
                "Expected SYMBOL:QUANTITY:AVERAGE_COST, got '{entry}'"
            )));
        };

        let holding = Holding::new(
            *symbol,
            parse_number(quantity, "quantity", symbol)?,
            parse_number(cost, "average cost", symbol)?,
        );
        holding.validate()?;
        Ok(holding)
    }

    /// Read holdings out of an uploaded table.
    ///
    /// Columns are matched by common header names, case-insensitively.
    /// Rows with a blank instrument are dropped; rows whose numbers do not
    /// parse are dropped with a warning. Blank numeric cells count as zero.
    pub fn from_table(
        &self,
        table: &UploadedTable,
    ) -> Result<(Vec<Holding>, Vec<Diagnostic>), CoreError> {
        let instrument_idx = find_column(table, INSTRUMENT_COLUMNS)?;
        let quantity_idx = find_column(table, QUANTITY_COLUMNS)?;
        let cost_idx = find_column(table, COST_COLUMNS)?;

        let mut holdings = Vec::new();
        let mut diagnostics = Vec::new();

        for (line, row) in table.rows.iter().enumerate() {
            let symbol = cell(row, instrument_idx).trim();
            if symbol.is_empty() {
                diagnostics.push(Diagnostic::global(CoreError::ValidationError(format!(
                    "Row {}: instrument is empty, row skipped",
                    line + 1
                ))));
                continue;
            }

            let parsed = parse_number(cell(row, quantity_idx), "quantity", symbol).and_then(|qty| {
                parse_number(cell(row, cost_idx), "average cost", symbol)
                    .map(|cost| Holding::new(symbol, qty, cost))
            });

            match parsed.and_then(|h| h.validate().map(|_| h)) {
                Ok(holding) => holdings.push(holding),
                Err(e) => diagnostics.push(Diagnostic::for_instrument(symbol.to_uppercase(), e)),
            }
        }

        Ok((holdings, diagnostics))
    }
}

impl Default for HoldingsService {
    fn default() -> Self {
        Self::new()
    }
}

fn find_column(table: &UploadedTable, names: &[&str]) -> Result<usize, CoreError> {
    names
        .iter()
        .find_map(|name| table.column_index(name))
        .ok_or_else(|| {
            CoreError::MalformedUpload(format!(
                "no '{}' column (found: {})",
                names[0],
                table.headers.join(", ")
            ))
        })
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

fn parse_number(cell: &str, what: &str, symbol: &str) -> Result<f64, CoreError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(0.0);
    }
    cell.replace(',', "").parse().map_err(|_| {
        CoreError::ValidationError(format!("{what} for {symbol} is not a number: '{cell}'"))
    })
}
