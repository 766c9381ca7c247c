/// Request-scoped admin authorization
pub mod access;

/// Expense CRUD and bulk import
pub mod expense;

/// Card-statement spreadsheet parsing
pub mod import;

/// Unit prices and discounts
pub mod pricing;

/// Product catalog CRUD and seeding
pub mod product;

/// Daily report generation from a template workbook
pub mod report;

/// Sale recording and re-pricing
pub mod sale;

/// Read-all of the ledger with a cache fallback
pub mod snapshot;

/// Staff CRUD
pub mod staff;

/// Date filters and profit-and-loss rollups
pub mod summary;

/// Template-preserving `.xlsx` cell patching
pub mod workbook;
