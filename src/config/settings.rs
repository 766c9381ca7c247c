//! Application configuration loading from config.toml
//!
//! The config file carries the clinic name, report and cache settings, the
//! product seed list and an optional legacy price table. Seeds fill an empty
//! catalog on first start. Legacy prices are only consulted for product names
//! the catalog does not know.

use crate::{
    core::report::EmptyDayPolicy,
    entities::Category,
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Clinic identity
    #[serde(default)]
    pub clinic: ClinicSettings,
    /// Daily report generation
    #[serde(default)]
    pub report: ReportSettings,
    /// Local snapshot cache
    #[serde(default)]
    pub cache: CacheSettings,
    /// Products to seed into an empty catalog
    #[serde(default)]
    pub products: Vec<ProductSeed>,
    /// Name-keyed fallback prices for products missing from the catalog
    #[serde(default)]
    pub legacy_prices: Vec<ProductSeed>,
}

/// Clinic identity shown in command replies
#[derive(Debug, Deserialize, Clone)]
pub struct ClinicSettings {
    /// Display name of the clinic
    #[serde(default = "default_clinic_name")]
    pub name: String,
}

impl Default for ClinicSettings {
    fn default() -> Self {
        Self {
            name: default_clinic_name(),
        }
    }
}

/// Where the report template and cell mapping live, and what to do on empty days
#[derive(Debug, Deserialize, Clone)]
pub struct ReportSettings {
    /// Template workbook uploaded through `/report template`
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,
    /// TOML mapping of report fields to cell addresses
    #[serde(default = "default_layout_path")]
    pub layout_path: PathBuf,
    /// Abort or still generate when the day has no records
    #[serde(default)]
    pub empty_day: EmptyDayPolicy,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
            layout_path: default_layout_path(),
            empty_day: EmptyDayPolicy::default(),
        }
    }
}

/// Cache-aside snapshot used when the store cannot be read
#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    /// Whether snapshots are written and used as a fallback
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// JSON file holding the last good snapshot
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    /// Oldest snapshot that may still be served
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_cache_path(),
            max_age_hours: default_max_age_hours(),
        }
    }
}

/// A seed or legacy price entry, in the same shape as a stored product
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ProductSeed {
    /// Pricing category
    pub category: Category,
    /// Product name
    pub name: String,
    /// Price when no role-specific price applies
    pub base_price: i64,
    /// PT price for senior trainers
    #[serde(default)]
    pub senior_price: Option<i64>,
    /// PT price for standard trainers
    #[serde(default)]
    pub standard_price: Option<i64>,
    /// Group PT classes ignore the trainer's role
    #[serde(default)]
    pub is_group: bool,
}

fn default_clinic_name() -> String {
    "Sports Clinic".to_string()
}

fn default_template_path() -> PathBuf {
    PathBuf::from("data/report_template.xlsx")
}

fn default_layout_path() -> PathBuf {
    PathBuf::from("report_layout.toml")
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("data/snapshot_cache.json")
}

const fn default_max_age_hours() -> u64 {
    24
}

const fn default_true() -> bool {
    true
}

/// Parses a config.toml document.
///
/// # Errors
/// Returns [`Error::Config`] if the TOML is invalid or fields have the wrong type.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Loads configuration from `CONFIG_PATH`, or ./config.toml when unset
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_product_seeds() {
        let toml_str = r#"
            [clinic]
            name = "Gene Sports Clinic"

            [[products]]
            category = "exam"
            name = "Basic exam"
            base_price = 100000

            [[products]]
            category = "personal_training"
            name = "10-session pass"
            base_price = 750000
            senior_price = 900000
            standard_price = 750000

            [[products]]
            category = "personal_training"
            name = "Group 1 month"
            base_price = 350000
            is_group = true
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.clinic.name, "Gene Sports Clinic");
        assert_eq!(config.products.len(), 3);
        assert_eq!(config.products[0].category, Category::Exam);
        assert_eq!(config.products[1].senior_price, Some(900_000));
        assert!(!config.products[1].is_group);
        assert!(config.products[2].is_group);
        assert_eq!(config.products[2].standard_price, None);
    }

    #[test]
    fn test_defaults_apply_to_missing_sections() {
        let config = parse_config("").unwrap();
        assert_eq!(config.report.empty_day, EmptyDayPolicy::Abort);
        assert_eq!(config.report.layout_path, PathBuf::from("report_layout.toml"));
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_age_hours, 24);
        assert!(config.products.is_empty());
        assert!(config.legacy_prices.is_empty());
    }

    #[test]
    fn test_legacy_prices_are_separate_from_seeds() {
        let toml_str = r#"
            [[products]]
            category = "retail"
            name = "ZT"
            base_price = 55000

            [[legacy_prices]]
            category = "retail"
            name = "Old protein bar"
            base_price = 3000
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.products.len(), 1);
        assert_eq!(config.legacy_prices.len(), 1);
        assert_eq!(config.legacy_prices[0].name, "Old protein bar");
    }

    #[test]
    fn test_empty_day_policy_is_configurable() {
        let config = parse_config("[report]\nempty_day = \"generate\"\n").unwrap();
        assert_eq!(config.report.empty_day, EmptyDayPolicy::Generate);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let toml_str = r#"
            [[products]]
            category = "massage"
            name = "Deep tissue"
            base_price = 1
        "#;
        assert!(matches!(
            parse_config(toml_str),
            Err(Error::Config { message: _ })
        ));
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = parse_config(include_str!("../../config.toml")).unwrap();
        assert_eq!(config.products.len(), 22);
        assert!(config.legacy_prices.is_empty());
        let pass = config
            .products
            .iter()
            .find(|p| p.name == "10회권")
            .unwrap();
        assert_eq!(pass.senior_price, Some(900_000));
        assert_eq!(pass.standard_price, Some(750_000));
        assert_eq!(
            config.products.iter().filter(|p| p.is_group).count(),
            3
        );
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }
}
