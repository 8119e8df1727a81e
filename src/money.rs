use anyhow::{bail, ensure};
use serde::{Serialize, Serializer};
use serde_with::DeserializeFromStr;

use std::{
    fmt::{Debug, Display},
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

/// Represents an amount of money.
///
/// The amount is stored internally as an integer number of cents, so sums
/// are exact, but the [`Display`] implementation formats it as a decimal
/// amount to 2 places. Parsing accepts text such as `30`, `30.5`, `-1,204.99`
/// or `.75`; digits beyond the second decimal place are rounded half away from
/// zero.
///
/// A single parsed amount must fit in an `i64` number of cents. Totals are
/// kept in an `i128`, which no sum over an in-memory list of amounts can
/// overflow.
#[derive(Clone, Copy, Default, DeserializeFromStr, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Money(i128);

impl Money {
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents as i128)
    }

    #[must_use]
    pub const fn cents(self) -> i128 {
        self.0
    }

    /// Returns the amount in currency units, for rendering as a number.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Debug for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        f.pad(&format!("{sign}{}.{:02}", cents / 100, cents % 100))
    }
}

impl FromStr for Money {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let text = s.trim().replace(',', "");
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(&text)),
        };
        let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        ensure!(
            !(whole.is_empty() && frac.is_empty()),
            "invalid amount {s:?}: no digits"
        );
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            bail!("invalid amount {s:?}: not a decimal number");
        }

        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse()? };
        let mut digits = frac.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().is_some_and(|d| d >= 5);

        let Some(cents) = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
        else {
            bail!("invalid amount {s:?}: out of range");
        };
        Ok(Self::from_cents(if negative { -cents } else { cents }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_fn_parses_decimal_amounts_as_cents() {
        assert_eq!(Money::from_str("30.00").unwrap().cents(), 3000);
        assert_eq!(Money::from_str("30").unwrap().cents(), 3000);
        assert_eq!(Money::from_str("30.5").unwrap().cents(), 3050);
        assert_eq!(Money::from_str(".75").unwrap().cents(), 75);
        assert_eq!(Money::from_str("1,204.99").unwrap().cents(), 120_499);
        assert_eq!(Money::from_str("-12.34").unwrap().cents(), -1234);
    }

    #[test]
    fn from_str_fn_rounds_extra_decimal_places() {
        assert_eq!(Money::from_str("19.995").unwrap().cents(), 2000);
        assert_eq!(Money::from_str("19.994").unwrap().cents(), 1999);
        assert_eq!(Money::from_str("-0.005").unwrap().cents(), -1);
    }

    #[test]
    fn from_str_fn_rejects_non_numeric_text() {
        assert!(Money::from_str("").is_err());
        assert!(Money::from_str("abc").is_err());
        assert!(Money::from_str("12.3.4").is_err());
        assert!(Money::from_str("1e5").is_err());
        assert!(Money::from_str("-").is_err());
        assert!(Money::from_str("99999999999999999999").is_err());
    }

    #[test]
    fn sum_fn_does_not_overflow_on_large_amounts() {
        let big = Money::from_str("90000000000000000").unwrap();
        let total: Money = [big, big, Money::from_cents(i64::MAX)].into_iter().sum();
        assert_eq!(
            total.cents(),
            2 * 9_000_000_000_000_000_000 + i128::from(i64::MAX)
        );
        assert_eq!(total.to_string(), "272233720368547758.07");
    }

    #[test]
    fn display_fn_formats_two_decimal_places() {
        assert_eq!(Money::from_cents(32000).to_string(), "320.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-150).to_string(), "-1.50");
        assert_eq!(format!("{:>8}", Money::from_cents(1050)), "   10.50");
    }

    #[test]
    fn money_deserializes_from_string() {
        let amount: Money = serde_json::from_str("\"40.10\"").unwrap();
        assert_eq!(amount, Money::from_cents(4010));
    }

    #[test]
    fn money_serializes_as_number() {
        assert_eq!(
            serde_json::to_string(&Money::from_cents(12050)).unwrap(),
            "120.5"
        );
    }

    #[test]
    fn sum_fn_adds_all_amounts() {
        let total: Money = [100, 250, -50].into_iter().map(Money::from_cents).sum();
        assert_eq!(total, Money::from_cents(300));
    }
}
