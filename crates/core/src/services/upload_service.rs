use csv::ReaderBuilder;

use crate::errors::CoreError;
use crate::models::upload::{ColumnSummary, UploadedTable};

/// Parses uploaded CSV files and computes column statistics.
pub struct UploadService;

impl UploadService {
    pub fn new() -> Self {
        Self
    }

    /// Parse a byte stream claiming to be CSV. The first row is the header.
    ///
    /// Any defect (invalid UTF-8, missing header, a row whose width differs
    /// from the header) fails the whole upload: no partial table is returned.
    pub fn parse_csv(&self, bytes: &[u8]) -> Result<UploadedTable, CoreError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::Headers)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(CoreError::MalformedUpload("missing header row".into()));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(UploadedTable { headers, rows })
    }

    /// Summary statistics for every numeric column, in header order.
    ///
    /// A column is numeric when it has at least one value and every
    /// non-blank cell parses as a number. Blank cells are left out of the
    /// count, like missing values.
    pub fn describe(&self, table: &UploadedTable) -> Vec<ColumnSummary> {
        table
            .headers
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| {
                let values = numeric_values(table.column(idx))?;
                summarize(name, values)
            })
            .collect()
    }
}

impl Default for UploadService {
    fn default() -> Self {
        Self::new()
    }
}

fn numeric_values<'a>(cells: impl Iterator<Item = &'a str>) -> Option<Vec<f64>> {
    let mut values = Vec::new();
    for cell in cells {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        let value: f64 = cell.parse().ok()?;
        if value.is_nan() {
            continue;
        }
        values.push(value);
    }
    Some(values)
}

fn summarize(column: &str, mut values: Vec<f64>) -> Option<ColumnSummary> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let count = values.len();
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (count > 1).then(|| {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    });

    Some(ColumnSummary {
        column: column.to_string(),
        count,
        mean,
        std,
        min: values[0],
        p25: quantile(&values, 0.25)?,
        p50: quantile(&values, 0.50)?,
        p75: quantile(&values, 0.75)?,
        max: values[count - 1],
    })
}

/// Linear-interpolated quantile of sorted data. `None` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}
