//! Product Discord commands - `/product add|list|update|remove`.
//!
//! This module contains commands for maintaining the price catalog that sales
//! are priced from.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            self, BotData,
            format::{format_won, parse_choice},
            handlers::autocomplete,
        },
        core::product::{self, ProductDraft},
        entities::{Category, ProductModel},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    fn price_summary(prod: &ProductModel) -> String {
        let mut summary = format_won(prod.base_price);
        if let (Some(senior), Some(standard)) = (prod.senior_price, prod.standard_price) {
            summary = format!(
                "senior {} / standard {}",
                format_won(senior),
                format_won(standard)
            );
        }
        if prod.is_group {
            summary.push_str(" · group");
        }
        summary
    }

    async fn lookup(
        ctx: poise::Context<'_, BotData, Error>,
        category: &str,
        name: &str,
    ) -> Result<Option<ProductModel>> {
        let category: Category = parse_choice(category)?;
        let found = product::find_product(&ctx.data().database, category, name).await?;
        if found.is_none() {
            ctx.say(format!("❌ Product '{name}' not found in {}.", category.label()))
                .await?;
        }
        Ok(found)
    }

    /// Parent command for managing the price catalog.
    #[poise::command(
        slash_command,
        subcommands("product_add", "product_list", "product_update", "product_remove")
    )]
    pub async fn product(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Product management command. Available subcommands:\n\
            `/product add` - Add a product to the catalog\n\
            `/product list` - List the catalog\n\
            `/product update` - Change a product's prices\n\
            `/product remove` - Remove a product";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a product to the catalog.
    ///
    /// Senior and standard prices only matter for individual PT passes.
    #[poise::command(slash_command, rename = "add")]
    pub async fn product_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "Product name"] name: String,
        #[description = "Price in won"] base_price: i64,
        #[description = "PT price when sold by a senior trainer"] senior_price: Option<i64>,
        #[description = "PT price when sold by a standard trainer"] standard_price: Option<i64>,
        #[description = "Group class priced regardless of trainer"] is_group: Option<bool>,
    ) -> Result<()> {
        let draft = ProductDraft {
            category: parse_choice(&category)?,
            name,
            base_price,
            senior_price,
            standard_price,
            is_group: is_group.unwrap_or(false),
        };
        let access = bot::access(ctx).await;
        let created = product::create_product(&ctx.data().database, &access, draft).await?;

        ctx.say(format!(
            "✅ Added {} product **{}** at {}.",
            created.category.label(),
            created.name,
            price_summary(&created)
        ))
        .await?;
        Ok(())
    }

    /// Lists the catalog, optionally for one category.
    #[poise::command(slash_command, rename = "list")]
    pub async fn product_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only this category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
    ) -> Result<()> {
        let only = category.as_deref().map(parse_choice::<Category>).transpose()?;
        let products: Vec<ProductModel> = product::get_catalog(&ctx.data().database)
            .await?
            .into_iter()
            .filter(|p| only.is_none_or(|c| p.category == c))
            .collect();

        if products.is_empty() {
            ctx.say("No products have been defined yet. Use `/product add` to create some!")
                .await?;
            return Ok(());
        }

        // Discord embeds hold at most 25 fields
        let shown = products.len().min(25);
        let fields = products.iter().take(shown).map(|p| {
            (
                format!("{} · {}", p.category.label(), p.name),
                price_summary(p),
                false,
            )
        });
        let mut embed = serenity::CreateEmbed::default()
            .title("**Product List**")
            .color(0x0058_65F2)
            .fields(fields);
        if products.len() > shown {
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "{} more not shown; filter by category",
                products.len() - shown
            )));
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Changes a product's prices. Omitted fields keep their current value.
    #[poise::command(slash_command, rename = "update")]
    pub async fn product_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "Name of the product to update"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        name: String,
        #[description = "New price in won"] base_price: Option<i64>,
        #[description = "New senior PT price"] senior_price: Option<i64>,
        #[description = "New standard PT price"] standard_price: Option<i64>,
        #[description = "Group class priced regardless of trainer"] is_group: Option<bool>,
    ) -> Result<()> {
        let Some(current) = lookup(ctx, &category, &name).await? else {
            return Ok(());
        };

        let draft = ProductDraft {
            category: current.category,
            name: current.name.clone(),
            base_price: base_price.unwrap_or(current.base_price),
            senior_price: senior_price.or(current.senior_price),
            standard_price: standard_price.or(current.standard_price),
            is_group: is_group.unwrap_or(current.is_group),
        };
        let access = bot::access(ctx).await;
        let updated =
            product::update_product(&ctx.data().database, &access, current.id, draft).await?;

        ctx.say(format!(
            "✅ **{}** now costs {}. Existing sales keep their recorded prices.",
            updated.name,
            price_summary(&updated)
        ))
        .await?;
        Ok(())
    }

    /// Removes a product from the catalog.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn product_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "Name of the product to remove"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        name: String,
    ) -> Result<()> {
        let Some(current) = lookup(ctx, &category, &name).await? else {
            return Ok(());
        };

        let access = bot::access(ctx).await;
        product::delete_product(&ctx.data().database, &access, current.id).await?;
        ctx.say(format!("✅ Product '{}' has been removed.", current.name))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
