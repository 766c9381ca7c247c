//! Cell mapping for the daily report template.
//!
//! The layout file says where each report field lands in the uploaded
//! template. Changing the template only needs a new layout file, not a new
//! build.

use crate::{
    core::workbook::{CellRef, ColumnRef},
    entities::{Category, DiscountTier, PaymentMethod, StaffRole},
    errors::{Error, Result},
};
use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::{collections::HashMap, path::Path};

/// Layout format understood by this build.
pub const LAYOUT_VERSION: u32 = 1;

/// Where each report field is written in the template.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportLayout {
    /// Must equal [`LAYOUT_VERSION`]
    pub version: u32,
    /// Worksheet tab to fill; the first sheet when absent
    #[serde(default)]
    pub sheet: Option<String>,
    /// Cell receiving the report date
    pub date_cell: CellRef,
    /// `chrono` format string for the report date
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Cell receiving the weekday label
    #[serde(default)]
    pub weekday_cell: Option<CellRef>,
    /// Weekday labels, Monday first
    #[serde(default = "default_weekday_labels")]
    pub weekday_labels: Vec<String>,
    /// Display overrides keyed by enum key (e.g. `card = "카드"`)
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Listing of the day's sales
    pub sales_lines: SalesLines,
    /// Listing of the day's expenses
    pub expense_lines: ExpenseLines,
    /// Counters and sums for matching sales
    #[serde(default)]
    pub tallies: Vec<TallyRule>,
}

/// Columns of the sales listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesLines {
    /// First row of the listing
    pub start_row: u32,
    /// Rows available; further sales are left out
    pub capacity: u32,
    /// Payment method label column
    pub payment_method: Option<ColumnRef>,
    /// Category label column
    pub category: Option<ColumnRef>,
    /// Product name column
    pub product: Option<ColumnRef>,
    /// Final price column
    pub final_price: Option<ColumnRef>,
    /// `M.DD` date column
    pub short_date: Option<ColumnRef>,
}

/// Columns of the expense listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseLines {
    /// First row of the listing
    pub start_row: u32,
    /// Rows available; further expenses are left out
    pub capacity: u32,
    /// Store name column
    pub store_name: Option<ColumnRef>,
    /// `M.DD` date column
    pub short_date: Option<ColumnRef>,
    /// Card last-four column
    pub card_last4: Option<ColumnRef>,
    /// Amount column
    pub amount: Option<ColumnRef>,
}

/// Time window a tally covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TallyPeriod {
    /// The report day only
    Day,
    /// First of the month through the report day
    Month,
}

/// Counts and sums the sales that match every given matcher.
#[derive(Debug, Clone, Deserialize)]
pub struct TallyRule {
    /// Match on category
    #[serde(default)]
    pub category: Option<Category>,
    /// Match on exact product name
    #[serde(default)]
    pub product: Option<String>,
    /// Match on the role recorded with the sale
    #[serde(default)]
    pub role: Option<StaffRole>,
    /// Match on the staff member's name
    #[serde(default)]
    pub staff: Option<String>,
    /// Day or month-to-date
    pub period: TallyPeriod,
    /// Receives the number of matching sales
    #[serde(default)]
    pub count_cell: Option<CellRef>,
    /// Receives the sum of their final prices
    #[serde(default)]
    pub amount_cell: Option<CellRef>,
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_weekday_labels() -> Vec<String> {
    ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn layout_error(message: impl Into<String>) -> Error {
    Error::Config {
        message: message.into(),
    }
}

impl ReportLayout {
    /// Parses and validates a layout from TOML text.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for malformed TOML, an unsupported version,
    /// a bad date format, or a weekday list that is not seven entries long.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let layout: Self = toml::from_str(text)
            .map_err(|e| layout_error(format!("Failed to parse report layout: {e}")))?;
        layout.validate()?;
        Ok(layout)
    }

    fn validate(&self) -> Result<()> {
        if self.version != LAYOUT_VERSION {
            return Err(layout_error(format!(
                "Unsupported report layout version {} (expected {LAYOUT_VERSION})",
                self.version
            )));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(layout_error(format!(
                "Invalid report date format '{}'",
                self.date_format
            )));
        }
        if self.weekday_labels.len() != 7 {
            return Err(layout_error(format!(
                "weekday_labels needs 7 entries, found {}",
                self.weekday_labels.len()
            )));
        }
        for rule in &self.tallies {
            if rule.count_cell.is_none() && rule.amount_cell.is_none() {
                return Err(layout_error(
                    "Each tally needs a count_cell, an amount_cell, or both",
                ));
            }
        }
        Ok(())
    }

    /// Display text for a stored enum key, honoring `[labels]` overrides.
    #[must_use]
    pub fn label<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.labels.get(key).map_or(fallback, String::as_str)
    }

    /// Display text for a category.
    #[must_use]
    pub fn category_label(&self, category: Category) -> &str {
        self.label(category.key(), category.label())
    }

    /// Display text for a payment method.
    #[must_use]
    pub fn payment_label(&self, method: PaymentMethod) -> &str {
        self.label(method.key(), method.label())
    }

    /// Display text for a discount tier.
    #[must_use]
    pub fn discount_label(&self, tier: DiscountTier) -> &str {
        self.label(tier.key(), tier.label())
    }
}

/// Loads the report layout from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or is invalid.
pub fn load_layout(path: impl AsRef<Path>) -> Result<ReportLayout> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        layout_error(format!(
            "Failed to read report layout {}: {e}",
            path.display()
        ))
    })?;
    ReportLayout::from_toml_str(&text)
}
