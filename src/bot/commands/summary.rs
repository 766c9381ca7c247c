//! Profit-and-loss commands - `/summary monthly|yearly`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            format::{format_won, summary_line},
        },
        core::{
            snapshot::{self, LedgerSnapshot},
            summary::{
                PeriodSelection, PeriodSummary, available_years, monthly_rollup, yearly_rollup,
            },
        },
        errors::{Error, Result},
    };

    fn render(title: &str, ledger: &LedgerSnapshot, rows: &[PeriodSummary]) -> String {
        let mut message = format!("**{title}**\n");
        if ledger.is_stale() {
            message.push_str("⚠️ The store is unreachable; showing the cached copy.\n");
        }
        if rows.is_empty() {
            message.push_str("Nothing recorded yet.");
            return message;
        }
        for row in rows {
            message.push_str(&summary_line(row));
            message.push('\n');
        }
        let profit: i64 = rows.iter().map(|r| r.profit).sum();
        message.push_str(&format!("**Overall profit: {}**", format_won(profit)));
        message
    }

    /// Parent command for rollups.
    #[poise::command(slash_command, subcommands("summary_monthly", "summary_yearly"))]
    pub async fn summary(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Summary command. Available subcommands:\n\
            `/summary monthly [year]` - Sales, expenses and profit per month\n\
            `/summary yearly` - Sales, expenses and profit per year";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Month-by-month totals. With a year, all twelve months of that year are shown.
    #[poise::command(slash_command, rename = "monthly")]
    pub async fn summary_monthly(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Calendar year (defaults to every month with records)"] year: Option<i32>,
    ) -> Result<()> {
        let data = ctx.data();
        let ledger = snapshot::load_snapshot(&data.database, data.cache.as_ref()).await?;
        let selection = year.map_or(PeriodSelection::Observed, PeriodSelection::CalendarYear);
        let rows = monthly_rollup(&ledger.sales, &ledger.expenses, selection);

        let mut title = year.map_or_else(
            || "Monthly summary".to_string(),
            |y| format!("Monthly summary for {y}"),
        );
        if year.is_none() {
            let years = available_years(&ledger.sales, &ledger.expenses);
            if !years.is_empty() {
                let listed: Vec<String> = years.iter().map(ToString::to_string).collect();
                title.push_str(&format!(" (years: {})", listed.join(", ")));
            }
        }

        ctx.say(render(&title, &ledger, &rows)).await?;
        Ok(())
    }

    /// Year-by-year totals.
    #[poise::command(slash_command, rename = "yearly")]
    pub async fn summary_yearly(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let ledger = snapshot::load_snapshot(&data.database, data.cache.as_ref()).await?;
        let rows = yearly_rollup(&ledger.sales, &ledger.expenses);

        ctx.say(render("Yearly summary", &ledger, &rows)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
