//! Reply formatting and argument parsing shared by the command modules.

use crate::{
    core::summary::{DateFilter, PeriodSummary, parse_day},
    entities::{ExpenseModel, SaleModel},
    errors::{Error, Result},
};
use chrono::{Local, NaiveDate};
use std::str::FromStr;

/// Whole won with thousands separators, e.g. `₩1,234,500`.
#[must_use]
pub fn format_won(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}₩{grouped}")
}

/// Parses a date argument; `today` (or nothing) means the local date.
pub fn parse_date_arg(raw: Option<&str>) -> Result<NaiveDate> {
    match raw.map(str::trim) {
        None | Some("" | "today") => Ok(Local::now().date_naive()),
        Some(text) => parse_day(text)
            .ok_or_else(|| Error::validation(format!("'{text}' is not a date (use YYYY-MM-DD)"))),
    }
}

/// Builds the filter for a list command from an optional day or range.
pub fn date_filter(
    date: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<DateFilter> {
    match (from, to) {
        (None, None) => Ok(DateFilter::Single(parse_date_arg(date)?)),
        (Some(from), Some(to)) => {
            if date.is_some() {
                return Err(Error::validation("Give either a date or a from/to range, not both"));
            }
            let (from, to) = (parse_date_arg(Some(from))?, parse_date_arg(Some(to))?);
            if from > to {
                return Err(Error::validation("The range starts after it ends"));
            }
            Ok(DateFilter::Range { from, to })
        }
        _ => Err(Error::validation("A range needs both `from` and `to`")),
    }
}

/// Parses an enum argument, turning the parse failure into a validation error.
pub fn parse_choice<T>(raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| Error::validation(e.to_string()))
}

/// One line of a sale listing.
#[must_use]
pub fn sale_line(sale: &SaleModel, staff_name: Option<&str>) -> String {
    let mut line = format!(
        "#{} `{}` {} {} **{}**",
        sale.id,
        sale.date,
        sale.category.label(),
        sale.product,
        format_won(sale.final_price)
    );
    if sale.discount.percent() > 0 {
        line.push_str(&format!(" ({} off {})", sale.discount.label(), format_won(sale.base_price)));
    }
    line.push_str(&format!(" · {}", sale.payment_method.label()));
    if let Some(name) = staff_name {
        line.push_str(&format!(" · {name}"));
    }
    line
}

/// One line of an expense listing.
#[must_use]
pub fn expense_line(expense: &ExpenseModel) -> String {
    let card = if expense.last4.is_empty() {
        String::new()
    } else {
        format!(" · card {}", expense.last4)
    };
    format!(
        "#{} `{}` {} **{}**{card}",
        expense.id,
        expense.date,
        expense.store_name,
        format_won(expense.amount)
    )
}

/// One row of a rollup table.
#[must_use]
pub fn summary_line(summary: &PeriodSummary) -> String {
    format!(
        "`{}` sales {} · expenses {} · profit **{}**",
        summary.period,
        format_won(summary.total_sales),
        format_won(summary.total_expenses),
        format_won(summary.profit)
    )
}

/// The per-day totals block of a listing; empty when only one day is shown.
#[must_use]
pub fn daily_totals_section(days: &[(NaiveDate, i64)]) -> String {
    if days.len() < 2 {
        return String::new();
    }
    let lines: Vec<String> = days
        .iter()
        .map(|(day, amount)| format!("`{day}` {}", format_won(*amount)))
        .collect();
    format!("\n**Daily totals**\n{}", join_limited(&lines, 400))
}

/// Joins lines into a message body, cutting at Discord's length limit.
#[must_use]
pub fn join_limited(lines: &[String], limit: usize) -> String {
    let mut body = String::new();
    for (shown, line) in lines.iter().enumerate() {
        if body.len() + line.len() + 1 > limit {
            body.push_str(&format!("… and {} more", lines.len() - shown));
            break;
        }
        body.push_str(line);
        body.push('\n');
    }
    body
}
