//! Expense Discord commands - `/expense add|import|list|update|remove`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            self, BotData,
            format::{
                daily_totals_section, date_filter, expense_line, format_won, join_limited,
                parse_date_arg,
            },
        },
        core::{
            expense::{self, NewExpense},
            import, snapshot,
            summary::{daily_totals, total},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::info;

    /// Parent command for clinic expenses.
    #[poise::command(
        slash_command,
        subcommands(
            "expense_add",
            "expense_import",
            "expense_list",
            "expense_update",
            "expense_remove"
        )
    )]
    pub async fn expense(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Expense command. Available subcommands:\n\
            `/expense add` - Record one expense\n\
            `/expense import` - Import a card statement spreadsheet\n\
            `/expense list` - List expenses for a day or a date range\n\
            `/expense update` - Correct an expense\n\
            `/expense remove` - Remove an expense";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Records one expense.
    #[poise::command(slash_command, rename = "add")]
    pub async fn expense_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Store or payee"] store: String,
        #[description = "Amount in won"] amount: i64,
        #[description = "Last four digits of the card"] last4: Option<String>,
        #[description = "Date of the payment, YYYY-MM-DD (defaults to today)"] date: Option<String>,
    ) -> Result<()> {
        let new_expense = NewExpense {
            date: parse_date_arg(date.as_deref())?,
            store_name: store,
            last4: last4.unwrap_or_default(),
            amount,
        };
        let access = bot::access(ctx).await;
        let created = expense::create_expense(&ctx.data().database, &access, new_expense).await?;

        ctx.say(format!(
            "✅ Expense #{} recorded: {} **{}** on {}.",
            created.id,
            created.store_name,
            format_won(created.amount),
            created.date
        ))
        .await?;
        Ok(())
    }

    /// Imports expenses from a card statement (`.xlsx` or `.xls`).
    ///
    /// Rows without a date, merchant or positive amount are skipped.
    #[poise::command(slash_command, rename = "import")]
    pub async fn expense_import(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Statement spreadsheet"] file: serenity::Attachment,
    ) -> Result<()> {
        let access = bot::access(ctx).await;
        access.require_admin()?;
        ctx.defer().await?;

        let bytes = file.download().await?;
        let rows = import::parse_expense_sheet(&bytes)?;
        if rows.is_empty() {
            ctx.say(format!("⚠️ No usable expense rows found in `{}`.", file.filename))
                .await?;
            return Ok(());
        }

        let amount = rows
            .iter()
            .map(|r| r.amount)
            .fold(0_i64, i64::saturating_add);
        let imported = expense::import_expenses(&ctx.data().database, &access, rows).await?;
        info!("Imported {imported} expense(s) from {}", file.filename);

        ctx.say(format!(
            "✅ Imported {imported} expense(s) totalling **{}** from `{}`.",
            format_won(amount),
            file.filename
        ))
        .await?;
        Ok(())
    }

    /// Lists expenses for one day (default today) or a from/to range.
    #[poise::command(slash_command, rename = "list")]
    pub async fn expense_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Single day, YYYY-MM-DD"] date: Option<String>,
        #[description = "Range start, YYYY-MM-DD"] from: Option<String>,
        #[description = "Range end, YYYY-MM-DD"] to: Option<String>,
    ) -> Result<()> {
        let filter = date_filter(date.as_deref(), from.as_deref(), to.as_deref())?;
        let data = ctx.data();
        let ledger = snapshot::load_snapshot(&data.database, data.cache.as_ref()).await?;
        let expenses = filter.apply(&ledger.expenses);

        let mut message = format!("**Expenses for {filter}**\n");
        if ledger.is_stale() {
            message.push_str("⚠️ The store is unreachable; showing the cached copy.\n");
        }
        if expenses.is_empty() {
            message.push_str("No expenses recorded.");
        } else {
            let lines: Vec<String> = expenses.iter().map(|e| expense_line(e)).collect();
            message.push_str(&join_limited(&lines, 1400));
            message.push_str(&daily_totals_section(&daily_totals(expenses.iter().copied())));
            message.push_str(&format!(
                "\n**Total: {}** over {} expense(s)",
                format_won(total(expenses.iter().copied())),
                expenses.len()
            ));
        }

        ctx.say(message).await?;
        Ok(())
    }

    /// Corrects an expense. Omitted fields keep their current value.
    #[poise::command(slash_command, rename = "update")]
    pub async fn expense_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense number shown by /expense list"] id: i64,
        #[description = "Store or payee"] store: Option<String>,
        #[description = "Amount in won"] amount: Option<i64>,
        #[description = "Last four digits of the card, or `none`"] last4: Option<String>,
        #[description = "Date of the payment, YYYY-MM-DD"] date: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(current) = expense::get_expense(db, id).await? else {
            ctx.say(format!("❌ Expense #{id} not found.")).await?;
            return Ok(());
        };

        let date = match date.as_deref() {
            Some(text) => parse_date_arg(Some(text))?,
            None => parse_date_arg(Some(current.date.as_str()))?,
        };
        let last4 = match last4 {
            Some(text) if text.trim().eq_ignore_ascii_case("none") => String::new(),
            Some(text) => text,
            None => current.last4,
        };
        let changes = NewExpense {
            date,
            store_name: store.unwrap_or(current.store_name),
            last4,
            amount: amount.unwrap_or(current.amount),
        };
        let access = bot::access(ctx).await;
        let updated = expense::update_expense(db, &access, id, changes).await?;

        ctx.say(format!("✅ Updated {}", expense_line(&updated))).await?;
        Ok(())
    }

    /// Removes an expense by its number.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn expense_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense number shown by /expense list"] id: i64,
    ) -> Result<()> {
        let access = bot::access(ctx).await;
        expense::delete_expense(&ctx.data().database, &access, id).await?;
        ctx.say(format!("✅ Expense #{id} has been removed.")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
