//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Expense commands
pub mod expense;

/// General utility commands and admin mode
pub mod general;

/// Product catalog commands
pub mod product;

/// Daily report commands
pub mod report;

/// Sale commands
pub mod sale;

/// Staff commands
pub mod staff;

/// Rollup commands
pub mod summary;

// Export commands
pub use expense::*;
pub use general::*;
pub use product::*;
pub use report::*;
pub use sale::*;
pub use staff::*;
pub use summary::*;
