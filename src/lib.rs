//! `clinic_ledger` keeps the books of a sports clinic from Discord.
//!
//! Staff record sales and expenses with slash commands. Sale prices are never
//! typed in: they come from the product catalog, the trainer's rank and a
//! discount tier. The same records feed monthly and yearly profit rollups,
//! the card statement importer and the daily report workbook.
//!
//! # Layout
//! - [`core`](crate::core) holds the ledger rules. Every function takes a
//!   database connection and, for writes, an
//!   [`AccessContext`](crate::core::access::AccessContext).
//! - [`bot`] turns slash commands into `core` calls and formats replies.
//! - [`entities`] maps the four tables: staff, products, sales, expenses.
//! - [`config`] reads `config.toml`, the report layout and the environment.
//! - [`errors`] is the single error type shared by all of the above.

// Hard errors: memory safety and mistakes that silently drop results
#![deny(
    unsafe_code,
    unsafe_op_in_unsafe_fn,
    unreachable_code,
    unreachable_patterns,
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warnings for the rest of the lint policy
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Money paths must not panic
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::exit,
    clippy::todo,
    clippy::unimplemented,
    clippy::float_cmp,

    // Leftovers and needless copies
    clippy::dbg_macro,
    clippy::clone_on_ref_ptr,
    clippy::inefficient_to_string,
    clippy::large_types_passed_by_value,
    clippy::needless_pass_by_value,
    clippy::unnecessary_wraps,

    // Readability
    clippy::cognitive_complexity,
    clippy::large_enum_variant,
    clippy::match_same_arms,
    clippy::too_many_lines,
    clippy::enum_glob_use,
    clippy::inconsistent_struct_constructor,
    clippy::must_use_candidate,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    future_incompatible,
    rust_2018_idioms,
)]
// Slash command handlers return `Result` and are documented for Discord users,
// not with `# Errors` sections
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
)]

/// Slash commands, autocomplete and the shared bot state
pub mod bot;
/// `config.toml`, the report layout file, database setup and the admin passcode
pub mod config;
/// Pricing, store operations, rollups, statement import and report filling
pub mod core;
/// SeaORM models for staff, products, sales and expenses
pub mod entities;
/// Crate-wide error type and its user-facing messages
pub mod errors;

#[cfg(test)]
pub mod test_utils;
