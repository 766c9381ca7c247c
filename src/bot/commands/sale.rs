//! Sale Discord commands - `/sale add|list|update|remove`.
//!
//! Prices are never typed in: the catalog resolves them from the category,
//! product name, staff role and discount tier.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            self, BotData,
            format::{
                daily_totals_section, date_filter, format_won, join_limited, parse_choice,
                parse_date_arg, sale_line,
            },
            handlers::autocomplete,
        },
        core::{
            sale::{self, NewSale},
            snapshot,
            staff,
            summary::{daily_totals, total},
        },
        entities::DiscountTier,
        errors::{Error, Result},
    };

    async fn build_sale(
        ctx: poise::Context<'_, BotData, Error>,
        date: Option<String>,
        category: &str,
        product: String,
        staff_name: Option<String>,
        discount: Option<String>,
        payment: &str,
    ) -> Result<NewSale> {
        let staff_id = match staff_name {
            Some(name) => {
                let member = staff::get_staff_by_name(&ctx.data().database, &name)
                    .await?
                    .ok_or_else(|| Error::validation(format!("Staff member '{name}' not found")))?;
                Some(member.id)
            }
            None => None,
        };

        Ok(NewSale {
            date: parse_date_arg(date.as_deref())?,
            category: parse_choice(category)?,
            product,
            staff_id,
            discount: discount
                .as_deref()
                .map(parse_choice::<DiscountTier>)
                .transpose()?
                .unwrap_or_default(),
            payment_method: parse_choice(payment)?,
        })
    }

    /// Parent command for recording and reviewing sales.
    #[poise::command(
        slash_command,
        subcommands("sale_add", "sale_list", "sale_update", "sale_remove")
    )]
    pub async fn sale(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Sale command. Available subcommands:\n\
            `/sale add` - Record a sale\n\
            `/sale list` - List sales for a day or a date range\n\
            `/sale update` - Correct a recorded sale\n\
            `/sale remove` - Remove a sale";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Records a sale priced from the catalog.
    #[poise::command(slash_command, rename = "add")]
    pub async fn sale_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "Product name"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product: String,
        #[description = "How the customer paid"]
        #[autocomplete = "autocomplete::autocomplete_payment"]
        payment: String,
        #[description = "Credited staff member"]
        #[autocomplete = "autocomplete::autocomplete_staff_name"]
        staff: Option<String>,
        #[description = "Discount tier (defaults to none)"]
        #[autocomplete = "autocomplete::autocomplete_discount"]
        discount: Option<String>,
        #[description = "Date of the sale, YYYY-MM-DD (defaults to today)"] date: Option<String>,
    ) -> Result<()> {
        let new_sale = build_sale(ctx, date, &category, product, staff, discount, &payment).await?;
        let access = bot::access(ctx).await;
        let data = ctx.data();
        let recorded =
            sale::record_sale(&data.database, &access, &data.config.legacy_prices, new_sale).await?;

        ctx.say(format!(
            "✅ Sale #{} recorded: {} **{}** on {} for **{}** ({} of {}).",
            recorded.id,
            recorded.category.label(),
            recorded.product,
            recorded.date,
            format_won(recorded.final_price),
            recorded.discount.label(),
            format_won(recorded.base_price)
        ))
        .await?;
        Ok(())
    }

    /// Lists sales for one day (default today) or a from/to range, with daily totals.
    #[poise::command(slash_command, rename = "list")]
    pub async fn sale_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Single day, YYYY-MM-DD"] date: Option<String>,
        #[description = "Range start, YYYY-MM-DD"] from: Option<String>,
        #[description = "Range end, YYYY-MM-DD"] to: Option<String>,
    ) -> Result<()> {
        let filter = date_filter(date.as_deref(), from.as_deref(), to.as_deref())?;
        let data = ctx.data();
        let ledger = snapshot::load_snapshot(&data.database, data.cache.as_ref()).await?;
        let sales = filter.apply(&ledger.sales);

        let mut message = format!("**Sales for {filter}**\n");
        if ledger.is_stale() {
            message.push_str("⚠️ The store is unreachable; showing the cached copy.\n");
        }
        if sales.is_empty() {
            message.push_str("No sales recorded.");
            ctx.say(message).await?;
            return Ok(());
        }

        let lines: Vec<String> = sales
            .iter()
            .map(|s| sale_line(s, s.staff_id.and_then(|id| ledger.staff_name(id))))
            .collect();
        message.push_str(&join_limited(&lines, 1400));
        message.push_str(&daily_totals_section(&daily_totals(sales.iter().copied())));
        message.push_str(&format!(
            "\n**Total: {}** over {} sale(s)",
            format_won(total(sales.iter().copied())),
            sales.len()
        ));

        ctx.say(message).await?;
        Ok(())
    }

    /// Replaces a sale's details and prices it again from the current catalog.
    #[poise::command(slash_command, rename = "update")]
    pub async fn sale_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Sale number"] id: i64,
        #[description = "Category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "Product name"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product: String,
        #[description = "How the customer paid"]
        #[autocomplete = "autocomplete::autocomplete_payment"]
        payment: String,
        #[description = "Credited staff member"]
        #[autocomplete = "autocomplete::autocomplete_staff_name"]
        staff: Option<String>,
        #[description = "Discount tier (defaults to none)"]
        #[autocomplete = "autocomplete::autocomplete_discount"]
        discount: Option<String>,
        #[description = "Date of the sale, YYYY-MM-DD (keeps the recorded date)"] date: Option<
            String,
        >,
    ) -> Result<()> {
        let Some(existing) = sale::get_sale(&ctx.data().database, id).await? else {
            return Err(Error::NotFound { entity: "Sale", id });
        };
        let date = date.or(Some(existing.date));
        let changes = build_sale(ctx, date, &category, product, staff, discount, &payment).await?;
        let access = bot::access(ctx).await;
        let data = ctx.data();
        let updated =
            sale::update_sale(&data.database, &access, &data.config.legacy_prices, id, changes)
                .await?;

        ctx.say(format!(
            "✅ Sale #{} updated: **{}** for **{}**.",
            updated.id,
            updated.product,
            format_won(updated.final_price)
        ))
        .await?;
        Ok(())
    }

    /// Removes a sale by its number.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn sale_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Sale number shown by /sale list"] id: i64,
    ) -> Result<()> {
        let access = bot::access(ctx).await;
        sale::delete_sale(&ctx.data().database, &access, id).await?;
        ctx.say(format!("✅ Sale #{id} has been removed.")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
