use anyhow::Result;
use serde::Serialize;

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
    ops::AddAssign,
};

use crate::{money::Money, month::MonthKey, record::Record};

/// Per-month results, ordered chronologically. Months with no valid records
/// have no entry.
pub type Monthly<T> = BTreeMap<MonthKey, T>;

/// Order-size statistics for one month's best-selling item.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OrderStats {
    pub min: i64,
    pub max: i64,
    pub avg: f64,
}

impl OrderStats {
    /// Computes the statistics of `quantities`, or `None` if it is empty.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_quantities(quantities: &[i64]) -> Option<Self> {
        let min = *quantities.iter().min()?;
        let max = *quantities.iter().max()?;
        let sum: i128 = quantities.iter().map(|&q| i128::from(q)).sum();
        Some(Self {
            min,
            max,
            avg: sum as f64 / quantities.len() as f64,
        })
    }
}

/// Running totals per product, kept in the order products were first seen.
#[derive(Debug)]
struct ProductTotals<T> {
    index: HashMap<String, usize>,
    totals: Vec<(String, T)>,
}

impl<T> Default for ProductTotals<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            totals: Vec::new(),
        }
    }
}

impl<T: Copy + Default + Ord + AddAssign> ProductTotals<T> {
    fn add(&mut self, product: &str, value: T) {
        let slot = match self.index.get(product) {
            Some(&i) => i,
            None => {
                self.index.insert(product.to_string(), self.totals.len());
                self.totals.push((product.to_string(), T::default()));
                self.totals.len() - 1
            }
        };
        self.totals[slot].1 += value;
    }

    /// Returns the product with the greatest total.
    ///
    /// The running maximum starts at zero and only a strictly greater total
    /// replaces it, so on a tie the product seen first wins, and a month where
    /// no product has a positive total has no leader.
    fn leader(&self) -> Option<&str> {
        let mut best: Option<(&str, T)> = None;
        for (product, total) in &self.totals {
            let floor = best.map_or_else(T::default, |(_, value)| value);
            if *total > floor {
                best = Some((product.as_str(), *total));
            }
        }
        best.map(|(product, _)| product)
    }
}

/// Returns, for each month, the product with the greatest total of `value`.
fn monthly_leaders<T, F>(records: &[Record], value: F) -> Monthly<Option<String>>
where
    T: Copy + Default + Ord + AddAssign,
    F: Fn(&Record) -> T,
{
    let mut by_month: Monthly<ProductTotals<T>> = BTreeMap::new();
    for record in records {
        by_month
            .entry(record.month.clone())
            .or_default()
            .add(&record.product, value(record));
    }
    by_month
        .into_iter()
        .map(|(month, totals)| (month, totals.leader().map(String::from)))
        .collect()
}

/// Returns the total revenue of all `records`.
#[must_use]
pub fn total_sales(records: &[Record]) -> Money {
    records.iter().map(|r| r.revenue).sum()
}

/// Returns the total revenue for each month.
#[must_use]
pub fn monthly_sales(records: &[Record]) -> Monthly<Money> {
    let mut sales = BTreeMap::new();
    for record in records {
        *sales.entry(record.month.clone()).or_default() += record.revenue;
    }
    sales
}

/// Returns the best-selling product (by units sold) for each month.
///
/// On a tie, the product that first appears in the input that month wins.
/// A month where no product sold a positive number of units maps to `None`.
#[must_use]
pub fn best_selling_items(records: &[Record]) -> Monthly<Option<String>> {
    monthly_leaders(records, |r| i128::from(r.quantity))
}

/// Returns the product with the highest revenue for each month.
///
/// Ties and months without positive revenue are handled as in
/// [`best_selling_items`].
#[must_use]
pub fn top_revenue_items(records: &[Record]) -> Monthly<Option<String>> {
    monthly_leaders(records, |r| r.revenue)
}

/// Returns order-size statistics for each month's best-selling product.
#[must_use]
pub fn top_item_order_stats(records: &[Record]) -> Monthly<OrderStats> {
    order_stats_for(records, &best_selling_items(records))
}

/// Returns, for each month, statistics over the quantities of the orders
/// for that month's product in `best_sellers`.
///
/// Months whose best seller is `None`, or that have no orders for it, have
/// no entry.
#[must_use]
pub fn order_stats_for(
    records: &[Record],
    best_sellers: &Monthly<Option<String>>,
) -> Monthly<OrderStats> {
    let mut orders: Monthly<Vec<i64>> = BTreeMap::new();
    for record in records {
        if let Some(Some(best)) = best_sellers.get(&record.month) {
            if *best == record.product {
                orders
                    .entry(record.month.clone())
                    .or_default()
                    .push(record.quantity);
            }
        }
    }
    orders
        .into_iter()
        .filter_map(|(month, quantities)| {
            OrderStats::from_quantities(&quantities).map(|stats| (month, stats))
        })
        .collect()
}

/// Holds the computed sales metrics.
///
/// To compute a report, use [`SalesReport::from_records`].
///
/// To get a printable version of the report, use its [`Display`]
/// implementation, or [`SalesReport::to_json`] for machine-readable output.
#[derive(Debug, Default, Serialize)]
pub struct SalesReport {
    pub total_sales: Money,
    pub monthly_sales: Monthly<Money>,
    pub best_selling_items: Monthly<Option<String>>,
    pub top_revenue_items: Monthly<Option<String>>,
    pub order_stats: Monthly<OrderStats>,
}

impl SalesReport {
    /// Computes every metric over `records`.
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        let best_selling_items = best_selling_items(records);
        let order_stats = order_stats_for(records, &best_selling_items);
        Self {
            total_sales: total_sales(records),
            monthly_sales: monthly_sales(records),
            best_selling_items,
            top_revenue_items: top_revenue_items(records),
            order_stats,
        }
    }

    /// Renders the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns any error from serializing the report.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn month_width(&self) -> usize {
        self.monthly_sales
            .keys()
            .map(|month| month.to_string().len())
            .max()
            .unwrap_or_default()
    }
}

fn item_name(item: Option<&String>) -> &str {
    item.map_or("(none)", String::as_str)
}

impl Display for SalesReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.month_width();
        writeln!(f, "Overall Sales: {}", self.total_sales)?;
        writeln!(f, "Sales by Month:")?;
        for (month, sales) in &self.monthly_sales {
            writeln!(f, "  {month:width$} {sales:>12}")?;
        }
        writeln!(f, "Top-Selling Items:")?;
        for (month, item) in &self.best_selling_items {
            writeln!(f, "  {month:width$} {}", item_name(item.as_ref()))?;
        }
        writeln!(f, "Highest Revenue Items:")?;
        for (month, item) in &self.top_revenue_items {
            writeln!(f, "  {month:width$} {}", item_name(item.as_ref()))?;
        }
        writeln!(f, "Order Stats for Top Items:")?;
        for (month, stats) in &self.order_stats {
            let item = self.best_selling_items.get(month).and_then(Option::as_ref);
            writeln!(
                f,
                "  {month:width$} {} min {} max {} avg {:.2}",
                item_name(item),
                stats.min,
                stats.max,
                stats.avg
            )?;
        }
        Ok(())
    }
}
