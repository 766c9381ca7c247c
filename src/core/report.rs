//! Daily sales and expense report built from an uploaded template workbook.
//!
//! The template is never modified. Each report is a fresh copy with the
//! day's figures written into the cells named by the [`ReportLayout`].

use crate::{
    config::report_layout::{ReportLayout, TallyPeriod, TallyRule},
    core::{
        access::AccessContext,
        snapshot::{LedgerSnapshot, SnapshotCache, load_snapshot},
        summary::{Ledgered, on_day},
        workbook::{CellRef, CellValue, ColumnRef, Workbook},
    },
    entities::{ExpenseModel, SaleModel},
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// What to do when the report day has no sales and no expenses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyDayPolicy {
    /// Refuse with [`Error::EmptyReport`]
    #[default]
    Abort,
    /// Produce a report with only the date filled in
    Generate,
}

/// A generated report file.
#[derive(Debug, Clone)]
pub struct DailyReport {
    /// Suggested download name
    pub file_name: String,
    /// `.xlsx` bytes
    pub bytes: Vec<u8>,
    /// Sale lines written (at most the listing capacity)
    pub sales_written: usize,
    /// Expense lines written (at most the listing capacity)
    pub expenses_written: usize,
}

/// `sales_expenses_YYYYMMDD.xlsx`
#[must_use]
pub fn report_file_name(day: NaiveDate) -> String {
    format!("sales_expenses_{}.xlsx", day.format("%Y%m%d"))
}

/// Month and zero-padded day, e.g. `3.05`.
#[must_use]
pub fn short_date(day: NaiveDate) -> String {
    format!("{}.{:02}", day.month(), day.day())
}

fn row_offset(start_row: u32, index: usize) -> Option<u32> {
    u32::try_from(index).ok().and_then(|i| start_row.checked_add(i))
}

fn sale_lines(
    layout: &ReportLayout,
    sales: &[&SaleModel],
    cells: &mut Vec<(CellRef, CellValue)>,
) -> usize {
    let lines = &layout.sales_lines;
    let capacity = lines.capacity as usize;
    if sales.len() > capacity {
        debug!("{} sale line(s) beyond capacity left out", sales.len() - capacity);
    }

    let mut written = 0;
    for (index, sale) in sales.iter().take(capacity).enumerate() {
        let Some(row) = row_offset(lines.start_row, index) else {
            break;
        };
        let mut put = |column: Option<ColumnRef>, value: CellValue| {
            if let Some(column) = column {
                cells.push((column.at(row), value));
            }
        };
        put(lines.payment_method, layout.payment_label(sale.payment_method).into());
        put(lines.category, layout.category_label(sale.category).into());
        put(lines.product, sale.product.as_str().into());
        put(lines.final_price, sale.final_price.into());
        if let Some(day) = sale.day() {
            put(lines.short_date, short_date(day).into());
        }
        written += 1;
    }
    written
}

fn expense_lines(
    layout: &ReportLayout,
    expenses: &[&ExpenseModel],
    cells: &mut Vec<(CellRef, CellValue)>,
) -> usize {
    let lines = &layout.expense_lines;
    let capacity = lines.capacity as usize;
    if expenses.len() > capacity {
        debug!("{} expense line(s) beyond capacity left out", expenses.len() - capacity);
    }

    let mut written = 0;
    for (index, expense) in expenses.iter().take(capacity).enumerate() {
        let Some(row) = row_offset(lines.start_row, index) else {
            break;
        };
        let mut put = |column: Option<ColumnRef>, value: CellValue| {
            if let Some(column) = column {
                cells.push((column.at(row), value));
            }
        };
        put(lines.store_name, expense.store_name.as_str().into());
        if let Some(day) = expense.day() {
            put(lines.short_date, short_date(day).into());
        }
        put(lines.card_last4, expense.last4.as_str().into());
        put(lines.amount, expense.amount.into());
        written += 1;
    }
    written
}

fn tally_matches(rule: &TallyRule, sale: &SaleModel, snapshot: &LedgerSnapshot) -> bool {
    if rule.category.is_some_and(|c| c != sale.category) {
        return false;
    }
    if rule.product.as_deref().is_some_and(|p| p.trim() != sale.product) {
        return false;
    }
    if rule.role.is_some() && rule.role != sale.staff_role {
        return false;
    }
    if let Some(name) = rule.staff.as_deref() {
        let credited = sale.staff_id.and_then(|id| snapshot.staff_name(id));
        if credited != Some(name.trim()) {
            return false;
        }
    }
    true
}

fn in_period(period: TallyPeriod, sale_day: NaiveDate, day: NaiveDate) -> bool {
    match period {
        TallyPeriod::Day => sale_day == day,
        TallyPeriod::Month => {
            sale_day.year() == day.year() && sale_day.month() == day.month() && sale_day <= day
        }
    }
}

fn tallies(
    layout: &ReportLayout,
    snapshot: &LedgerSnapshot,
    day: NaiveDate,
    cells: &mut Vec<(CellRef, CellValue)>,
) {
    for rule in &layout.tallies {
        let (count, amount) = snapshot
            .sales
            .iter()
            .filter(|s| s.day().is_some_and(|d| in_period(rule.period, d, day)))
            .filter(|s| tally_matches(rule, s, snapshot))
            .fold((0_i64, 0_i64), |(n, sum), s| {
                (n + 1, sum.saturating_add(s.final_price))
            });
        if let Some(cell) = rule.count_cell {
            cells.push((cell, count.into()));
        }
        if let Some(cell) = rule.amount_cell {
            cells.push((cell, amount.into()));
        }
    }
}

/// Fills a copy of `template` with the figures for `day`.
///
/// # Errors
/// Returns:
/// - [`Error::EmptyReport`] if the day has no records and `policy` is
///   [`EmptyDayPolicy::Abort`]
/// - [`Error::Workbook`] if the template is not a usable workbook
pub fn build_daily_report(
    day: NaiveDate,
    snapshot: &LedgerSnapshot,
    template: &[u8],
    layout: &ReportLayout,
    policy: EmptyDayPolicy,
) -> Result<DailyReport> {
    let day_sales = on_day(&snapshot.sales, day);
    let day_expenses = on_day(&snapshot.expenses, day);
    if day_sales.is_empty() && day_expenses.is_empty() && policy == EmptyDayPolicy::Abort {
        return Err(Error::EmptyReport { date: day });
    }

    let mut workbook = Workbook::from_bytes(template)?;
    let sheet = workbook.sheet_path(layout.sheet.as_deref())?;

    let mut cells = vec![(
        layout.date_cell,
        CellValue::from(day.format(&layout.date_format).to_string()),
    )];
    if let Some(cell) = layout.weekday_cell {
        let index = day.weekday().num_days_from_monday() as usize;
        if let Some(label) = layout.weekday_labels.get(index) {
            cells.push((cell, label.as_str().into()));
        }
    }
    tallies(layout, snapshot, day, &mut cells);
    let sales_written = sale_lines(layout, &day_sales, &mut cells);
    let expenses_written = expense_lines(layout, &day_expenses, &mut cells);

    workbook.set_cells(&sheet, &cells)?;
    workbook.force_full_recalculation()?;
    workbook.drop_calc_chain()?;

    Ok(DailyReport {
        file_name: report_file_name(day),
        bytes: workbook.to_bytes()?,
        sales_written,
        expenses_written,
    })
}

/// Reads the stored template.
///
/// # Errors
/// Returns [`Error::TemplateUnavailable`] if the file cannot be read.
pub async fn load_template(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| Error::TemplateUnavailable {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Replaces the stored template after checking that it opens as a workbook.
///
/// # Errors
/// Returns an error if the context is not admin, the bytes are not a
/// workbook, or the file cannot be written.
pub async fn store_template(access: &AccessContext, path: &Path, bytes: &[u8]) -> Result<()> {
    access.require_admin()?;
    let workbook = Workbook::from_bytes(bytes)?;
    workbook.sheet_path(None)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    info!("Report template replaced by {} ({} bytes)", access.actor(), bytes.len());
    Ok(())
}

/// Builds the report for `day` from a fresh snapshot and the stored template.
///
/// # Errors
/// Returns an error if the context is not admin, the ledger or template
/// cannot be read, or [`build_daily_report`] fails.
pub async fn generate_daily_report(
    db: &DatabaseConnection,
    cache: Option<&SnapshotCache>,
    access: &AccessContext,
    template_path: &Path,
    layout: &ReportLayout,
    policy: EmptyDayPolicy,
    day: NaiveDate,
) -> Result<DailyReport> {
    access.require_admin()?;
    let snapshot = load_snapshot(db, cache).await?;
    let template = load_template(template_path).await?;
    let report = build_daily_report(day, &snapshot, &template, layout, policy)?;
    info!(
        "Daily report for {day} generated for {}: {} sale line(s), {} expense line(s)",
        access.actor(),
        report.sales_written,
        report.expenses_written
    );
    Ok(report)
}
