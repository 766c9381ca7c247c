/// Admin passcode from environment variables
pub mod access;

/// Database configuration and connection management
pub mod database;

/// Report cell-mapping configuration
pub mod report_layout;

/// Application configuration and product seeds from config.toml
pub mod settings;

pub use settings::{AppConfig, ProductSeed, load_config, load_default_config};
