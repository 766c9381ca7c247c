//! Price lookup and discount arithmetic.
//!
//! Everything here is pure: callers pass in the catalog they already loaded.
//! Amounts are whole won, and discounts are computed in integer percent so
//! there is no floating-point drift.

use crate::{
    config::ProductSeed,
    entities::{Category, DiscountTier, ProductModel, StaffRole},
};
use tracing::warn;

/// Largest price or expense amount accepted, in won.
pub const MAX_AMOUNT: i64 = 100_000_000_000;

/// Anything that carries a price list entry: stored products and config seeds.
pub trait PriceEntry {
    /// Pricing category
    fn category(&self) -> Category;
    /// Product name
    fn name(&self) -> &str;
    /// Price when no role-specific price applies
    fn base_price(&self) -> i64;
    /// PT price for senior trainers
    fn senior_price(&self) -> Option<i64>;
    /// PT price for standard trainers
    fn standard_price(&self) -> Option<i64>;
    /// Group PT ignores the trainer's role
    fn is_group(&self) -> bool;

    /// Unit price for a trainer of `role`.
    ///
    /// Only individual PT passes vary by role; a missing role-specific price
    /// falls back to the base price.
    fn price_for(&self, role: Option<StaffRole>) -> i64 {
        if self.category() != Category::PersonalTraining || self.is_group() {
            return self.base_price();
        }
        let role_price = match role {
            Some(StaffRole::Senior) => self.senior_price(),
            Some(StaffRole::Standard) => self.standard_price(),
            None => None,
        };
        role_price.unwrap_or_else(|| self.base_price())
    }
}

macro_rules! impl_price_entry {
    ($($ty:ty),+) => {
        $(
            impl PriceEntry for $ty {
                fn category(&self) -> Category {
                    self.category
                }
                fn name(&self) -> &str {
                    &self.name
                }
                fn base_price(&self) -> i64 {
                    self.base_price
                }
                fn senior_price(&self) -> Option<i64> {
                    self.senior_price
                }
                fn standard_price(&self) -> Option<i64> {
                    self.standard_price
                }
                fn is_group(&self) -> bool {
                    self.is_group
                }
            }
        )+
    };
}

impl_price_entry!(ProductModel, ProductSeed);

/// Looks up the unit price of a product.
///
/// The catalog is matched on (category, name). Names missing from the
/// catalog are looked up by name alone in the legacy table. A product found
/// in neither prices at `0`, which callers must treat as "not sellable".
pub fn resolve_base_price<C: PriceEntry, L: PriceEntry>(
    catalog: &[C],
    legacy: &[L],
    category: Category,
    name: &str,
    role: Option<StaffRole>,
) -> i64 {
    let name = name.trim();
    if let Some(entry) = catalog
        .iter()
        .find(|p| p.category() == category && p.name() == name)
    {
        return entry.price_for(role);
    }
    if let Some(entry) = legacy.iter().find(|p| p.name() == name) {
        return entry.price_for(role);
    }
    warn!("No price found for {category} product '{name}'");
    0
}

/// Applies a discount tier, rounding half away from zero to whole won.
#[must_use]
pub fn apply_discount(base: i64, tier: DiscountTier) -> i64 {
    let scaled = i128::from(base) * i128::from(100 - tier.percent());
    let rounded = if scaled >= 0 {
        (scaled + 50) / 100
    } else {
        (scaled - 50) / 100
    };
    // |rounded| <= |base|, so it always fits back into i64
    i64::try_from(rounded).unwrap_or(base)
}

/// Result of pricing one sale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    /// Undiscounted unit price
    pub base_price: i64,
    /// Price after the discount
    pub final_price: i64,
    /// Applied discount as a fraction
    pub rate: f64,
}

/// Resolves the base price and applies the discount in one step.
pub fn quote_sale<C: PriceEntry, L: PriceEntry>(
    catalog: &[C],
    legacy: &[L],
    category: Category,
    name: &str,
    role: Option<StaffRole>,
    discount: DiscountTier,
) -> PriceQuote {
    let base_price = resolve_base_price(catalog, legacy, category, name, role);
    PriceQuote {
        base_price,
        final_price: apply_discount(base_price, discount),
        rate: discount.rate(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    fn seed(
        category: Category,
        name: &str,
        base: i64,
        senior: Option<i64>,
        standard: Option<i64>,
        is_group: bool,
    ) -> ProductSeed {
        ProductSeed {
            category,
            name: name.to_string(),
            base_price: base,
            senior_price: senior,
            standard_price: standard,
            is_group,
        }
    }

    fn legacy_table() -> Vec<ProductSeed> {
        vec![
            seed(Category::Exam, "Basic exam", 100_000, None, None, false),
            seed(
                Category::PersonalTraining,
                "1 session",
                80_000,
                Some(100_000),
                Some(80_000),
                false,
            ),
            seed(Category::PersonalTraining, "Group 1 month", 350_000, None, None, true),
            seed(Category::Retail, "Protein drink", 5_000, None, None, false),
        ]
    }

    #[test]
    fn test_discount_rates() {
        assert_eq!(apply_discount(100_000, DiscountTier::NoDiscount), 100_000);
        assert_eq!(apply_discount(100_000, DiscountTier::Tier1), 90_000);
        assert_eq!(apply_discount(100_000, DiscountTier::Tier2), 80_000);
        assert_eq!(apply_discount(100_000, DiscountTier::Tier3), 70_000);
    }

    #[test]
    fn test_discount_rounds_half_away_from_zero() {
        // 5 * 0.9 = 4.5
        assert_eq!(apply_discount(5, DiscountTier::Tier1), 5);
        // 15 * 0.7 = 10.5
        assert_eq!(apply_discount(15, DiscountTier::Tier3), 11);
        // 14 * 0.9 = 12.6
        assert_eq!(apply_discount(14, DiscountTier::Tier1), 13);
        // 12 * 0.8 = 9.6
        assert_eq!(apply_discount(12, DiscountTier::Tier2), 10);
        assert_eq!(apply_discount(-5, DiscountTier::Tier1), -5);
        assert_eq!(apply_discount(0, DiscountTier::Tier3), 0);
    }

    #[test]
    fn test_role_prices_for_individual_pt() {
        let legacy = legacy_table();
        let none: &[ProductSeed] = &[];
        let pt = Category::PersonalTraining;
        assert_eq!(
            resolve_base_price(none, &legacy, pt, "1 session", Some(StaffRole::Senior)),
            100_000
        );
        assert_eq!(
            resolve_base_price(none, &legacy, pt, "1 session", Some(StaffRole::Standard)),
            80_000
        );
        assert_eq!(resolve_base_price(none, &legacy, pt, "1 session", None), 80_000);
    }

    #[test]
    fn test_group_pt_ignores_role() {
        let legacy = legacy_table();
        let none: &[ProductSeed] = &[];
        assert_eq!(
            resolve_base_price(
                none,
                &legacy,
                Category::PersonalTraining,
                "Group 1 month",
                Some(StaffRole::Senior)
            ),
            350_000
        );
    }

    #[test]
    fn test_catalog_takes_precedence_over_legacy() {
        let catalog = vec![seed(Category::Exam, "Basic exam", 120_000, None, None, false)];
        let legacy = legacy_table();
        assert_eq!(
            resolve_base_price(&catalog, &legacy, Category::Exam, "Basic exam", None),
            120_000
        );
        // legacy lookup is by name only
        assert_eq!(
            resolve_base_price(&catalog, &legacy, Category::Retail, "Basic exam", None),
            100_000
        );
    }

    #[test]
    fn test_missing_role_price_falls_back_to_base() {
        let catalog = vec![seed(
            Category::PersonalTraining,
            "Trial",
            60_000,
            None,
            Some(55_000),
            false,
        )];
        let none: &[ProductSeed] = &[];
        assert_eq!(
            resolve_base_price(
                &catalog,
                none,
                Category::PersonalTraining,
                "Trial",
                Some(StaffRole::Senior)
            ),
            60_000
        );
    }

    #[test]
    fn test_unknown_product_prices_at_zero() {
        let legacy = legacy_table();
        let none: &[ProductSeed] = &[];
        assert_eq!(
            resolve_base_price(none, &legacy, Category::Retail, "Mystery", None),
            0
        );
    }

    #[test]
    fn test_quote_sale_senior_pt() {
        let legacy = legacy_table();
        let none: &[ProductSeed] = &[];
        let quote = quote_sale(
            none,
            &legacy,
            Category::PersonalTraining,
            " 1 session ",
            Some(StaffRole::Senior),
            DiscountTier::Tier1,
        );
        assert_eq!(quote.base_price, 100_000);
        assert_eq!(quote.final_price, 90_000);
        assert_eq!(quote.rate, 0.1);
    }
}
