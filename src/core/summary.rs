//! Date filters and profit-and-loss rollups over sales and expenses.
//!
//! All views are recomputed from a fresh snapshot on every read. Nothing here
//! touches the store, and nothing here can fail: a record whose date does not
//! parse is left out of every filter and every bucket.

use crate::entities::{ExpenseModel, SaleModel};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

/// Parses a stored date, dropping any time of day.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[...]` and `YYYY-MM-DD HH:MM:SS`.
#[must_use]
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10)?;
    let rest = &raw[10..];
    if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
        return None;
    }
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// A dated money movement.
pub trait Ledgered {
    /// Date as stored
    fn date_text(&self) -> &str;

    /// Signed contribution to its side of the ledger
    fn amount(&self) -> i64;

    /// Calendar day, if the stored date parses.
    fn day(&self) -> Option<NaiveDate> {
        parse_day(self.date_text())
    }
}

impl Ledgered for SaleModel {
    fn date_text(&self) -> &str {
        &self.date
    }

    fn amount(&self) -> i64 {
        self.final_price
    }
}

impl Ledgered for ExpenseModel {
    fn date_text(&self) -> &str {
        &self.date
    }

    fn amount(&self) -> i64 {
        self.amount
    }
}

/// Records dated exactly `day`.
pub fn on_day<T: Ledgered>(records: &[T], day: NaiveDate) -> Vec<&T> {
    records.iter().filter(|r| r.day() == Some(day)).collect()
}

/// Whether `date` falls within `[from, to]`, compared by calendar day.
///
/// Returns `false` if any of the three fails to parse.
#[must_use]
pub fn in_range(date: &str, from: &str, to: &str) -> bool {
    match (parse_day(date), parse_day(from), parse_day(to)) {
        (Some(day), Some(from), Some(to)) => from <= day && day <= to,
        _ => false,
    }
}

/// Records whose date falls within `[from, to]`.
pub fn within<'a, T: Ledgered>(records: &'a [T], from: &str, to: &str) -> Vec<&'a T> {
    records
        .iter()
        .filter(|r| in_range(r.date_text(), from, to))
        .collect()
}

/// Which records a list view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    /// One calendar day
    Single(NaiveDate),
    /// Inclusive range of days
    Range {
        /// First day included
        from: NaiveDate,
        /// Last day included
        to: NaiveDate,
    },
}

impl DateFilter {
    /// Whether `day` passes the filter.
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        match *self {
            Self::Single(target) => day == target,
            Self::Range { from, to } => from <= day && day <= to,
        }
    }

    /// Records that pass the filter, in input order.
    pub fn apply<'a, T: Ledgered>(&self, records: &'a [T]) -> Vec<&'a T> {
        records
            .iter()
            .filter(|r| r.day().is_some_and(|day| self.contains(day)))
            .collect()
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(day) => write!(f, "{day}"),
            Self::Range { from, to } => write!(f, "{from} ~ {to}"),
        }
    }
}

/// Sum of the amounts of `records`, saturating at the `i64` bounds.
pub fn total<'a, T: Ledgered + 'a>(records: impl IntoIterator<Item = &'a T>) -> i64 {
    records
        .into_iter()
        .map(Ledgered::amount)
        .fold(0, i64::saturating_add)
}

/// Per-day sums in ascending date order.
pub fn daily_totals<'a, T: Ledgered + 'a>(
    records: impl IntoIterator<Item = &'a T>,
) -> Vec<(NaiveDate, i64)> {
    let mut totals: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for record in records {
        if let Some(day) = record.day() {
            let sum = totals.entry(day).or_default();
            *sum = sum.saturating_add(record.amount());
        }
    }
    totals.into_iter().collect()
}

/// A rollup bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Period {
    /// One calendar month
    Month {
        /// Calendar year
        year: i32,
        /// 1-based month
        month: u32,
    },
    /// One calendar year
    Year(i32),
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month { year, month } => write!(f, "{year}-{month:02}"),
            Self::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Sales, expenses and profit of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    /// Bucket these totals cover
    pub period: Period,
    /// Sum of final sale prices
    pub total_sales: i64,
    /// Sum of expense amounts
    pub total_expenses: i64,
    /// `total_sales - total_expenses`
    pub profit: i64,
}

impl PeriodSummary {
    fn new(period: Period, total_sales: i64, total_expenses: i64) -> Self {
        Self {
            period,
            total_sales,
            total_expenses,
            profit: total_sales.saturating_sub(total_expenses),
        }
    }
}

/// Which months a monthly rollup reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodSelection {
    /// Every month with at least one record
    #[default]
    Observed,
    /// January through December of one year, empty months as zero
    CalendarYear(i32),
}

fn accumulate<T: Ledgered, K: Ord>(
    buckets: &mut BTreeMap<K, (i64, i64)>,
    records: &[T],
    key: impl Fn(NaiveDate) -> Option<K>,
    expense_side: bool,
) {
    for record in records {
        let Some(bucket) = record.day().and_then(&key) else {
            continue;
        };
        let totals = buckets.entry(bucket).or_default();
        let side = if expense_side {
            &mut totals.1
        } else {
            &mut totals.0
        };
        *side = side.saturating_add(record.amount());
    }
}

/// Month-by-month sales, expenses and profit.
pub fn monthly_rollup<S: Ledgered, E: Ledgered>(
    sales: &[S],
    expenses: &[E],
    selection: PeriodSelection,
) -> Vec<PeriodSummary> {
    let mut buckets: BTreeMap<(i32, u32), (i64, i64)> = BTreeMap::new();
    if let PeriodSelection::CalendarYear(year) = selection {
        for month in 1..=12 {
            buckets.insert((year, month), (0, 0));
        }
    }
    let key = |day: NaiveDate| match selection {
        PeriodSelection::Observed => Some((day.year(), day.month())),
        PeriodSelection::CalendarYear(year) => {
            (day.year() == year).then(|| (day.year(), day.month()))
        }
    };
    accumulate(&mut buckets, sales, key, false);
    accumulate(&mut buckets, expenses, key, true);

    buckets
        .into_iter()
        .map(|((year, month), (s, e))| PeriodSummary::new(Period::Month { year, month }, s, e))
        .collect()
}

/// Year-by-year sales, expenses and profit for every observed year.
pub fn yearly_rollup<S: Ledgered, E: Ledgered>(sales: &[S], expenses: &[E]) -> Vec<PeriodSummary> {
    let mut buckets: BTreeMap<i32, (i64, i64)> = BTreeMap::new();
    let key = |day: NaiveDate| Some(day.year());
    accumulate(&mut buckets, sales, key, false);
    accumulate(&mut buckets, expenses, key, true);

    buckets
        .into_iter()
        .map(|(year, (s, e))| PeriodSummary::new(Period::Year(year), s, e))
        .collect()
}

/// Distinct years present in either collection, ascending.
pub fn available_years<S: Ledgered, E: Ledgered>(sales: &[S], expenses: &[E]) -> Vec<i32> {
    let years: BTreeSet<i32> = sales
        .iter()
        .filter_map(Ledgered::day)
        .chain(expenses.iter().filter_map(Ledgered::day))
        .map(|day| day.year())
        .collect();
    years.into_iter().collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    struct Entry {
        date: &'static str,
        amount: i64,
    }

    impl Ledgered for Entry {
        fn date_text(&self) -> &str {
            self.date
        }

        fn amount(&self) -> i64 {
            self.amount
        }
    }

    const fn entry(date: &'static str, amount: i64) -> Entry {
        Entry { date, amount }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_day_accepts_date_time_forms() {
        assert_eq!(parse_day("2024-03-15"), Some(day("2024-03-15")));
        assert_eq!(parse_day("2024-03-15T23:59:59Z"), Some(day("2024-03-15")));
        assert_eq!(parse_day("2024-03-15 08:00:00"), Some(day("2024-03-15")));
        assert_eq!(parse_day("2024-03-15x"), None);
        assert_eq!(parse_day("2024-02-30"), None);
        assert_eq!(parse_day("15/03/2024"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn test_in_range() {
        assert!(in_range("2024-03-15", "2024-03-01", "2024-03-31"));
        assert!(!in_range("2024-04-01", "2024-03-01", "2024-03-31"));
        // bounds are inclusive and time of day is ignored
        assert!(in_range("2024-03-31T23:59:59", "2024-03-01", "2024-03-31"));
        assert!(in_range("2024-03-01", "2024-03-01T12:00:00", "2024-03-31"));
        // fail closed
        assert!(!in_range("garbage", "2024-03-01", "2024-03-31"));
        assert!(!in_range("2024-03-15", "", "2024-03-31"));
        assert!(!in_range("2024-03-15", "2024-03-01", "2024-13-01"));
    }

    #[test]
    fn test_single_and_range_filters() {
        let records = vec![
            entry("2024-03-14", 1),
            entry("2024-03-15T10:00:00", 2),
            entry("2024-03-16", 3),
            entry("bad", 4),
        ];
        let single = DateFilter::Single(day("2024-03-15")).apply(&records);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].amount, 2);
        assert_eq!(on_day(&records, day("2024-03-15")).len(), 1);

        let range = DateFilter::Range {
            from: day("2024-03-15"),
            to: day("2024-03-16"),
        };
        assert_eq!(total(range.apply(&records)), 5);
        assert_eq!(within(&records, "2024-03-01", "2024-03-31").len(), 3);
    }

    #[test]
    fn test_daily_totals_are_order_independent() {
        let forward = vec![
            entry("2024-03-02", 100),
            entry("2024-03-01", 50),
            entry("2024-03-02", 25),
            entry("nope", 999),
        ];
        let reversed: Vec<Entry> = forward.iter().rev().map(|e| entry(e.date, e.amount)).collect();

        let expected = vec![(day("2024-03-01"), 50), (day("2024-03-02"), 125)];
        assert_eq!(daily_totals(&forward), expected);
        assert_eq!(daily_totals(&reversed), expected);
        assert_eq!(daily_totals(&forward), daily_totals(&forward));
    }

    #[test]
    fn test_monthly_profit_is_sales_minus_expenses() {
        let sales = vec![entry("2024-03-05", 300_000), entry("2024-03-20", 200_000)];
        let expenses = vec![entry("2024-03-10", 120_000)];

        let rollup = monthly_rollup(&sales, &expenses, PeriodSelection::Observed);
        assert_eq!(rollup.len(), 1);
        assert_eq!(rollup[0].period, Period::Month { year: 2024, month: 3 });
        assert_eq!(rollup[0].total_sales, 500_000);
        assert_eq!(rollup[0].total_expenses, 120_000);
        assert_eq!(rollup[0].profit, 380_000);
    }

    #[test]
    fn test_observed_months_skip_empty_months() {
        let sales = vec![entry("2024-01-05", 10), entry("2023-12-31", 5)];
        let expenses = vec![entry("2024-03-01", 7), entry("bad-date", 1_000)];

        let periods: Vec<String> = monthly_rollup(&sales, &expenses, PeriodSelection::Observed)
            .iter()
            .map(|s| s.period.to_string())
            .collect();
        assert_eq!(periods, vec!["2023-12", "2024-01", "2024-03"]);
    }

    #[test]
    fn test_calendar_year_has_twelve_months() {
        let sales = vec![entry("2024-01-05", 10), entry("2023-12-31", 5)];
        let expenses = vec![entry("2024-03-01", 7)];

        let rollup = monthly_rollup(&sales, &expenses, PeriodSelection::CalendarYear(2024));
        assert_eq!(rollup.len(), 12);
        assert_eq!(rollup[0].total_sales, 10);
        assert_eq!(rollup[1].profit, 0);
        assert_eq!(rollup[2].profit, -7);
        assert_eq!(rollup.iter().map(|s| s.total_sales).sum::<i64>(), 10);
    }

    #[test]
    fn test_yearly_rollup_and_available_years() {
        let sales = vec![entry("2024-01-05", 10), entry("2023-12-31", 5)];
        let expenses = vec![entry("2025-03-01", 7)];

        let rollup = yearly_rollup(&sales, &expenses);
        assert_eq!(
            rollup.iter().map(|s| s.period).collect::<Vec<_>>(),
            vec![Period::Year(2023), Period::Year(2024), Period::Year(2025)]
        );
        assert_eq!(rollup[2].profit, -7);
        assert_eq!(available_years(&sales, &expenses), vec![2023, 2024, 2025]);
    }

    #[test]
    fn test_huge_amounts_saturate_instead_of_wrapping() {
        let sales = vec![entry("2024-03-01", i64::MAX), entry("2024-03-02", i64::MAX)];
        let expenses = vec![entry("2024-03-05", i64::MAX), entry("2024-03-06", i64::MAX)];

        assert_eq!(total(&sales), i64::MAX);
        let same_day = vec![entry("2024-03-01", i64::MAX), entry("2024-03-01", 1)];
        assert_eq!(daily_totals(&same_day), vec![(day("2024-03-01"), i64::MAX)]);

        let rollup = monthly_rollup(&sales, &expenses, PeriodSelection::Observed);
        assert_eq!(rollup[0].total_sales, i64::MAX);
        assert_eq!(rollup[0].total_expenses, i64::MAX);
        assert_eq!(rollup[0].profit, 0);

        let loss = monthly_rollup(&[] as &[Entry], &expenses, PeriodSelection::Observed);
        assert_eq!(loss[0].profit, -i64::MAX);
    }
}
