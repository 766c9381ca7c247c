//! Card-statement spreadsheet import.
//!
//! Reads the first worksheet of an `.xlsx`/`.xls` statement export. Row 1 is
//! the header. Column A holds the date, C the card or account number, D the
//! merchant and F the amount. Rows that do not yield a complete expense are
//! skipped; the rest are returned for [`crate::core::expense::import_expenses`].

use crate::{
    core::{expense::NewExpense, summary::parse_day},
    errors::{Error, Result},
};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::{Days, NaiveDate};
use regex::Regex;
use std::{io::Cursor, sync::LazyLock};
use tracing::{debug, info};

const DATE_COLUMN: u32 = 0;
const CARD_COLUMN: u32 = 2;
const STORE_COLUMN: u32 = 3;
const AMOUNT_COLUMN: u32 = 5;
const COLUMNS: u32 = AMOUNT_COLUMN + 1;

static LAST4_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})\D*$").expect("last4 pattern"));

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(v) | Data::DateTimeIso(v) | Data::DurationIso(v) => v.trim().to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.as_f64().to_string(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

/// Converts a spreadsheet serial day number (1899-12-30 epoch) to a date.
#[must_use]
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let days = serial.floor() as u64;
    epoch.checked_add_days(Days::new(days))
}

/// Parses statement dates such as `24.03.15(금)`, `2024.03.15` or `2024-03-15`.
#[must_use]
pub fn parse_statement_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.split('(').next().unwrap_or_default().trim();
    let parts: Vec<&str> = text.split('.').map(str::trim).collect();
    if let [year, month, day] = parts.as_slice() {
        let year: i32 = match year.len() {
            2 => 2000 + year.parse::<i32>().ok()?,
            4 => year.parse().ok()?,
            _ => return None,
        };
        return NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?);
    }
    parse_day(text)
}

fn parse_date_cell(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(v) => serial_to_date(v.as_f64()),
        Data::Float(v) => serial_to_date(*v),
        #[allow(clippy::cast_precision_loss)]
        Data::Int(v) => serial_to_date(*v as f64),
        Data::String(v) | Data::DateTimeIso(v) => parse_statement_date(v),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_amount_cell(cell: &Data) -> Option<i64> {
    let amount = match cell {
        Data::Int(v) => *v,
        Data::Float(v) if v.is_finite() && v.fract() == 0.0 => *v as i64,
        Data::String(v) => v
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect::<String>()
            .parse()
            .ok()?,
        _ => return None,
    };
    (amount > 0).then_some(amount)
}

/// Last four digits of a card or account number, or empty when there are none.
#[must_use]
pub fn card_last4(raw: &str) -> String {
    LAST4_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map_or_else(String::new, |m| m.as_str().to_string())
}

/// Builds an expense from one statement row (columns A through F).
///
/// # Errors
/// Returns a short reason when the row lacks a usable date, merchant or amount.
pub fn parse_expense_row(row: &[Data]) -> std::result::Result<NewExpense, &'static str> {
    let cell = |column: u32| row.get(column as usize).unwrap_or(&Data::Empty);

    let date = parse_date_cell(cell(DATE_COLUMN)).ok_or("missing or malformed date")?;
    let store_name = cell_text(cell(STORE_COLUMN));
    if store_name.is_empty() {
        return Err("missing description");
    }
    let amount = parse_amount_cell(cell(AMOUNT_COLUMN)).ok_or("missing or non-positive amount")?;

    Ok(NewExpense {
        date,
        store_name,
        last4: card_last4(&cell_text(cell(CARD_COLUMN))),
        amount,
    })
}

/// Reads every usable expense row from a statement workbook.
///
/// # Errors
/// Returns [`Error::ImportFormat`] if the bytes are not a readable
/// spreadsheet or it has no worksheet. Individual bad rows are skipped.
pub fn parse_expense_sheet(bytes: &[u8]) -> Result<Vec<NewExpense>> {
    let import_error = |message: String| Error::ImportFormat { message };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| import_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| import_error("the file has no worksheets".to_string()))?
        .map_err(|e| import_error(e.to_string()))?;

    let (Some((first_row, _)), Some((last_row, _))) = (range.start(), range.end()) else {
        return Ok(Vec::new());
    };

    let mut expenses = Vec::new();
    // row 0 is the header
    for row in first_row.max(1)..=last_row {
        let cells: Vec<Data> = (0..COLUMNS)
            .map(|column| range.get_value((row, column)).cloned().unwrap_or(Data::Empty))
            .collect();
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        match parse_expense_row(&cells) {
            Ok(expense) => expenses.push(expense),
            Err(reason) => debug!("Skipping statement row {}: {reason}", row + 1),
        }
    }

    info!("Parsed {} expense row(s) from statement", expenses.len());
    Ok(expenses)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::date;

    fn text(value: &str) -> Data {
        Data::String(value.to_string())
    }

    #[test]
    fn test_statement_row_end_to_end() {
        let row = vec![
            text("24.03.15"),
            Data::Empty,
            text("1234-5678"),
            text("Acme Store"),
            Data::Empty,
            text("50000"),
        ];
        let expense = parse_expense_row(&row).unwrap();
        assert_eq!(expense.date, date("2024-03-15"));
        assert_eq!(expense.last4, "5678");
        assert_eq!(expense.store_name, "Acme Store");
        assert_eq!(expense.amount, 50_000);
    }

    #[test]
    fn test_statement_date_forms() {
        assert_eq!(parse_statement_date("24.03.15(금)"), Some(date("2024-03-15")));
        assert_eq!(parse_statement_date("2024.03.15"), Some(date("2024-03-15")));
        assert_eq!(parse_statement_date("2024-03-15"), Some(date("2024-03-15")));
        assert_eq!(parse_statement_date("24.02.30"), None);
        assert_eq!(parse_statement_date("324.03.15"), None);
        assert_eq!(parse_statement_date("yesterday"), None);
    }

    #[test]
    fn test_serial_dates() {
        assert_eq!(serial_to_date(45_366.0), Some(date("2024-03-15")));
        assert_eq!(serial_to_date(45_366.75), Some(date("2024-03-15")));
        assert_eq!(serial_to_date(0.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);

        let row = vec![
            Data::Float(45_366.0),
            Data::Empty,
            Data::Empty,
            text("Mart"),
            Data::Empty,
            Data::Float(12_000.0),
        ];
        let expense = parse_expense_row(&row).unwrap();
        assert_eq!(expense.date, date("2024-03-15"));
        assert_eq!(expense.last4, "");
        assert_eq!(expense.amount, 12_000);
    }

    #[test]
    fn test_card_suffix_uses_trailing_digits() {
        assert_eq!(card_last4("1234-5678"), "5678");
        assert_eq!(card_last4("9410-****-****-1234 (본인)"), "1234");
        assert_eq!(card_last4("cash"), "");
        assert_eq!(card_last4("12"), "");
    }

    #[test]
    fn test_amounts_with_separators() {
        assert_eq!(parse_amount_cell(&text("1,234,500")), Some(1_234_500));
        assert_eq!(parse_amount_cell(&Data::Int(300)), Some(300));
        assert_eq!(parse_amount_cell(&text("-5,000")), None);
        assert_eq!(parse_amount_cell(&Data::Float(10.5)), None);
        assert_eq!(parse_amount_cell(&text("abc")), None);
        assert_eq!(parse_amount_cell(&Data::Empty), None);
    }

    #[test]
    fn test_incomplete_rows_are_rejected() {
        let no_store = vec![text("24.03.15"), Data::Empty, Data::Empty, text("  "), Data::Empty, text("100")];
        assert!(parse_expense_row(&no_store).is_err());

        let no_amount = vec![text("24.03.15"), Data::Empty, Data::Empty, text("Mart")];
        assert!(parse_expense_row(&no_amount).is_err());

        let bad_date = vec![text("someday"), Data::Empty, Data::Empty, text("Mart"), Data::Empty, text("100")];
        assert!(parse_expense_row(&bad_date).is_err());
    }

    #[test]
    fn test_unreadable_file_is_an_import_error() {
        let result = parse_expense_sheet(b"definitely not a spreadsheet");
        assert!(matches!(result, Err(Error::ImportFormat { message: _ })));
    }
}
