//! Unified error type for the clinic ledger.
//!
//! Every failure is scoped to a single user action: the shell reports it and
//! leaves local state untouched. Nothing here is retried automatically.

use crate::entities::Category;
use chrono::NaiveDate;
use thiserror::Error;

/// All errors produced by the ledger and its command shell.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input was missing or malformed; nothing was created.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// The pricing lookup resolved to zero, so the sale was refused.
    #[error("No price is defined for {category} product '{product}'")]
    UnpricedProduct {
        /// Category the product was looked up in
        category: Category,
        /// Product name as entered
        product: String,
    },

    /// The backing store rejected or failed a call.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// An uploaded import file could not be read as a spreadsheet.
    #[error("Import format error: {message}")]
    ImportFormat {
        /// Reader diagnostic
        message: String,
    },

    /// The report template could not be fetched.
    #[error("Report template unavailable at {path}: {message}")]
    TemplateUnavailable {
        /// Path the template was expected at
        path: String,
        /// Underlying failure
        message: String,
    },

    /// Report generation was aborted because the day has no records.
    #[error("No sales or expenses recorded on {date}")]
    EmptyReport {
        /// Requested report date
        date: NaiveDate,
    },

    /// The template workbook is corrupt or could not be patched.
    #[error("Workbook error: {message}")]
    Workbook {
        /// What went wrong while reading or writing the workbook
        message: String,
    },

    /// A mutating operation was attempted without admin access.
    #[error("Admin access required (requested by {actor})")]
    Unauthorized {
        /// Who attempted the operation
        actor: String,
    },

    /// The referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record
        entity: &'static str,
        /// Identifier that was looked up
        id: i64,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable is missing.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Discord framework failure.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Builds a [`Error::Validation`] from any message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Short message suitable for showing to the person who ran the command.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } => format!("❌ {message}"),
            Self::UnpricedProduct { category, product } => format!(
                "❌ '{product}' has no price in the {category} catalog. Add it with `/product add` first."
            ),
            Self::Unauthorized { .. } => {
                "🔒 Admin mode required. Unlock it with `/admin <passcode>`.".to_string()
            }
            Self::NotFound { entity, id } => format!("❌ {entity} #{id} does not exist."),
            Self::EmptyReport { date } => {
                format!("⚠️ Nothing was recorded on {date}; no report was generated.")
            }
            Self::TemplateUnavailable { .. } => {
                "❌ No report template is available. Upload one with `/report template`.".to_string()
            }
            Self::ImportFormat { message } => format!("❌ Could not read the file: {message}"),
            Self::Workbook { message } => format!("❌ The template workbook is unusable: {message}"),
            Self::Database(_) => "❌ The ledger store is unavailable. Please try again.".to_string(),
            other => format!("❌ An error occurred: {other}"),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
