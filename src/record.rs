use thiserror::Error;
use tracing::{debug, warn};

use std::str::FromStr;

use crate::{groups::Groups, money::Money, month::MonthKey, parser::Row};

/// Minimum number of fields a row needs to be counted as a sale.
pub const MIN_FIELDS: usize = 5;

/// One validated sale.
///
/// Input rows have the columns `date, product, category, quantity, revenue`.
/// The category column, and any columns after revenue, are not used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub month: MonthKey,
    pub product: String,
    pub quantity: i64,
    pub revenue: Money,
}

/// Why a row was left out of the aggregates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("expected at least 5 fields, found {0}")]
    TooFewFields(usize),
    #[error("bad date {value:?}: {reason}")]
    BadDate { value: String, reason: String },
    #[error("bad quantity {0:?}: not an integer")]
    BadQuantity(String),
    #[error("bad revenue {value:?}: {reason}")]
    BadRevenue { value: String, reason: String },
}

impl RowError {
    /// Malformed rows have too few fields. They are skipped without a warning.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::TooFewFields(_))
    }
}

impl Record {
    /// Validates the fields of a parsed row.
    ///
    /// # Errors
    ///
    /// Returns a [`RowError`] if the row has fewer than [`MIN_FIELDS`] fields,
    /// or its date, quantity or revenue cannot be parsed.
    pub fn from_fields(fields: &[String]) -> Result<Self, RowError> {
        let [date, product, _category, quantity, revenue, ..] = fields else {
            return Err(RowError::TooFewFields(fields.len()));
        };
        let month = MonthKey::from_date(date).map_err(|e| RowError::BadDate {
            value: date.clone(),
            reason: format!("{e:#}"),
        })?;
        let quantity = quantity
            .parse::<i64>()
            .map_err(|_| RowError::BadQuantity(quantity.clone()))?;
        let revenue = Money::from_str(revenue).map_err(|e| RowError::BadRevenue {
            value: revenue.clone(),
            reason: format!("{e:#}"),
        })?;
        Ok(Self {
            month,
            product: product.clone(),
            quantity,
            revenue,
        })
    }
}

impl TryFrom<&Row> for Record {
    type Error = RowError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Self::from_fields(&row.fields)
    }
}

/// Counts of what happened to the input rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    pub records: usize,
    pub malformed: usize,
    pub invalid: usize,
}

/// Validates `rows`, keeping only the rows that are complete sales.
///
/// Product names are mapped through `groups` before they are stored, so
/// every aggregate sees the grouped name. Rows with too few fields are
/// skipped silently; rows with an unparseable date, quantity or revenue are
/// skipped with a warning.
#[must_use]
pub fn validate(rows: &[Row], groups: &Groups) -> (Vec<Record>, LoadSummary) {
    let mut summary = LoadSummary {
        rows: rows.len(),
        ..LoadSummary::default()
    };
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match Record::try_from(row) {
            Ok(mut record) => {
                if !groups.is_empty() {
                    record.product = groups.display_name(&record.product).to_string();
                }
                records.push(record);
            }
            Err(err) if err.is_malformed() => {
                debug!(line = row.line, "skipping malformed row: {err}");
                summary.malformed += 1;
            }
            Err(err) => {
                warn!(line = row.line, "skipping invalid row: {err}");
                summary.invalid += 1;
            }
        }
    }
    summary.records = records.len();
    (records, summary)
}
