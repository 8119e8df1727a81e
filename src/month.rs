use anyhow::{bail, Context};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use std::{fmt::Display, str::FromStr};

/// Identifies the calendar month a sale belongs to.
///
/// Month keys are derived from the leading `YEAR-MONTH` part of a date, and
/// display as `YEAR-MONTH` with the month *not* zero-padded (`2024-1`, not
/// `2024-01`). Every per-month aggregate is keyed by this type, so results
/// from different aggregates join on the same keys.
///
/// Keys order chronologically: by year number, then by month number.
#[derive(
    Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct MonthKey {
    year: u32,
    month: u32,
}

impl MonthKey {
    /// Extracts the month key from a date such as `2024-01-05` or `2024-01`.
    ///
    /// The date is split on `-`; the first two components are the year and
    /// month numbers, parsed as base-10 so that leading zeros are dropped. Anything after the second component is
    /// ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use monthly_sales::MonthKey;
    /// let key = MonthKey::from_date("2024-01-05").unwrap();
    /// assert_eq!(key.to_string(), "2024-1");
    /// assert!(MonthKey::from_date("2024").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the date has no month component, the year is not
    /// a number, or the month is not a number from 1 to 12.
    pub fn from_date(date: &str) -> anyhow::Result<Self> {
        let mut parts = date.trim().split('-');
        let year = parts.next().unwrap_or_default();
        let Some(month) = parts.next() else {
            bail!("date {date:?} has no month component");
        };
        let year: u32 = year
            .parse()
            .with_context(|| format!("date {date:?} has a non-numeric year"))?;
        let month: u32 = month
            .parse()
            .with_context(|| format!("date {date:?} has a non-numeric month"))?;
        if !(1..=12).contains(&month) {
            bail!("date {date:?} has month {month}, outside 1-12");
        }
        Ok(Self { year, month })
    }

    #[must_use]
    pub fn year(&self) -> u32 {
        self.year
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!("{}-{}", self.year, self.month))
    }
}

impl FromStr for MonthKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_date(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_date_fn_drops_leading_zero_from_month() {
        let key = MonthKey::from_date("2024-01-05").unwrap();
        assert_eq!(key.year(), 2024);
        assert_eq!(key.month(), 1);
        assert_eq!(key.to_string(), "2024-1");
    }

    #[test]
    fn from_date_fn_ignores_components_after_month() {
        assert_eq!(
            MonthKey::from_date("2023-11-30-extra").unwrap().to_string(),
            "2023-11"
        );
        assert_eq!(MonthKey::from_date("2023-07").unwrap().to_string(), "2023-7");
    }

    #[test]
    fn from_date_fn_rejects_dates_without_valid_month() {
        assert!(MonthKey::from_date("2024").is_err());
        assert!(MonthKey::from_date("").is_err());
        assert!(MonthKey::from_date("-01-05").is_err());
        assert!(MonthKey::from_date("2024-Jan-05").is_err());
        assert!(MonthKey::from_date("2024-00-05").is_err());
        assert!(MonthKey::from_date("2024-13-05").is_err());
        assert!(MonthKey::from_date("05/01/2024").is_err());
        assert!(MonthKey::from_date("FY24-01-05").is_err());
    }

    #[test]
    fn month_keys_order_chronologically() {
        let mut keys: Vec<MonthKey> = ["2024-10-01", "2023-12-31", "2024-2-01", "2024-01-15"]
            .into_iter()
            .map(|d| MonthKey::from_date(d).unwrap())
            .collect();
        keys.sort();
        let keys: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["2023-12", "2024-1", "2024-2", "2024-10"]);
    }

    #[test]
    fn month_keys_compare_years_numerically() {
        let early = MonthKey::from_date("999-05-01").unwrap();
        let late = MonthKey::from_date("2024-01-01").unwrap();
        assert!(early < late);
        assert_eq!(MonthKey::from_date("0999-05").unwrap(), early);
    }

    #[test]
    fn month_key_serializes_as_display_string() {
        let key = MonthKey::from_date("2024-02-01").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-2\"");
        let back: MonthKey = serde_json::from_str("\"2024-2\"").unwrap();
        assert_eq!(back, key);
    }
}
