#![doc = include_str!("../README.md")]
use anyhow::Result;
use tracing::info;

use std::{io::Read, path::Path};

mod groups;
mod money;
mod month;
mod parser;
mod record;
mod report;

pub use groups::Groups;
pub use money::Money;
pub use month::MonthKey;
pub use parser::{read_rows, read_rows_from_path, Row};
pub use record::{validate, LoadSummary, Record, RowError, MIN_FIELDS};
pub use report::{
    best_selling_items, monthly_sales, order_stats_for, top_item_order_stats, top_revenue_items,
    total_sales, Monthly, OrderStats, SalesReport,
};

/// Settings for reading a sales file.
#[derive(Debug)]
pub struct Options {
    /// Field separator, as a single ASCII byte.
    pub delimiter: u8,
    pub groups: Groups,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            delimiter: b',',
            groups: Groups::default(),
        }
    }
}

/// Reads the sales file at `path` and computes its report.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read. Individual bad rows
/// are skipped, not treated as errors; see [`validate`].
pub fn analyze_file(path: impl AsRef<Path>, opts: &Options) -> Result<(SalesReport, LoadSummary)> {
    let path = path.as_ref();
    let rows = read_rows_from_path(path, opts.delimiter)?;
    info!(path = %path.display(), rows = rows.len(), "read sales file");
    Ok(analyze_rows(&rows, opts))
}

/// Reads sales data from `input` and computes its report.
///
/// # Errors
///
/// Returns any error from reading `input`.
pub fn analyze_reader(input: impl Read, opts: &Options) -> Result<(SalesReport, LoadSummary)> {
    let rows = read_rows(input, opts.delimiter)?;
    Ok(analyze_rows(&rows, opts))
}

fn analyze_rows(rows: &[Row], opts: &Options) -> (SalesReport, LoadSummary) {
    let (records, summary) = validate(rows, &opts.groups);
    info!(
        records = summary.records,
        malformed = summary.malformed,
        invalid = summary.invalid,
        "validated rows"
    );
    (SalesReport::from_records(&records), summary)
}
