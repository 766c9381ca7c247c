//! Autocomplete handlers for Discord slash command parameters.
//!
//! This module provides autocomplete functionality for product names, staff
//! names and the fixed enum choices, so users pick values the ledger accepts.

use crate::{
    bot::BotData,
    core::{product, staff},
    entities::{Category, DiscountTier, PaymentMethod, StaffRole},
    errors::Error,
};
use sea_orm::Iterable;

/// Discord shows at most 25 suggestions.
const MAX_SUGGESTIONS: usize = 25;

fn matching(candidates: impl IntoIterator<Item = String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matched: Vec<String> = candidates
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .collect();
    matched.sort();
    matched.dedup();
    matched.truncate(MAX_SUGGESTIONS);
    matched
}

/// Provides autocomplete suggestions for product names.
///
/// Names are deduplicated across categories and sorted alphabetically.
pub async fn autocomplete_product_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(products) = product::get_catalog(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(products.into_iter().map(|p| p.name), partial)
}

/// Provides autocomplete suggestions for staff names.
pub async fn autocomplete_staff_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(members) = staff::get_all_staff(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(members.into_iter().map(|s| s.name), partial)
}

/// Product categories.
pub async fn autocomplete_category(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(Category::iter().map(|c| c.key().to_string()), partial)
}

/// Staff roles.
pub async fn autocomplete_role(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(StaffRole::iter().map(|r| r.key().to_string()), partial)
}

/// Discount tiers.
pub async fn autocomplete_discount(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(DiscountTier::iter().map(|d| d.key().to_string()), partial)
}

/// Payment methods.
pub async fn autocomplete_payment(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(PaymentMethod::iter().map(|m| m.key().to_string()), partial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_is_case_insensitive_sorted_and_unique() {
        let names = ["ZT", "zb", "Protein", "ZT"].map(String::from);
        assert_eq!(matching(names, "z"), vec!["ZT", "zb"]);
    }

    #[test]
    fn test_matching_caps_suggestions() {
        let names = (0..40).map(|i| format!("pass {i:02}"));
        assert_eq!(matching(names, "pass").len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_enum_keys_are_offered() {
        let keys = matching(PaymentMethod::iter().map(|m| m.key().to_string()), "");
        assert_eq!(keys, vec!["bank_transfer", "card", "cash"]);
    }
}
