//! Report Discord commands - `/report template` and `/report daily`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{self, BotData, format::parse_date_arg},
        core::report,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Parent command for the daily report.
    #[poise::command(slash_command, subcommands("report_template", "report_daily"))]
    pub async fn report(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Report command. Available subcommands:\n\
            `/report daily [date]` - Generate the daily sales and expense report\n\
            `/report template <file>` - Replace the report template";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Replaces the `.xlsx` template the daily report is filled into.
    #[poise::command(slash_command, rename = "template")]
    pub async fn report_template(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Template workbook (.xlsx)"] file: serenity::Attachment,
    ) -> Result<()> {
        let access = bot::access(ctx).await;
        access.require_admin()?;
        ctx.defer().await?;

        let bytes = file.download().await?;
        let path = &ctx.data().config.report.template_path;
        report::store_template(&access, path, &bytes).await?;

        ctx.say(format!("✅ Report template replaced with `{}`.", file.filename))
            .await?;
        Ok(())
    }

    /// Generates the daily report and replies with the workbook.
    #[poise::command(slash_command, rename = "daily")]
    pub async fn report_daily(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Report date, YYYY-MM-DD (defaults to today)"] date: Option<String>,
    ) -> Result<()> {
        let day = parse_date_arg(date.as_deref())?;
        let access = bot::access(ctx).await;
        access.require_admin()?;
        ctx.defer().await?;

        let data = ctx.data();
        let generated = report::generate_daily_report(
            &data.database,
            data.cache.as_ref(),
            &access,
            &data.config.report.template_path,
            &data.layout,
            data.config.report.empty_day,
            day,
        )
        .await?;

        let content = format!(
            "📄 Daily report for {day}: {} sale line(s), {} expense line(s).",
            generated.sales_written, generated.expenses_written
        );
        let attachment = serenity::CreateAttachment::bytes(generated.bytes, generated.file_name);
        ctx.send(
            poise::CreateReply::default()
                .content(content)
                .attachment(attachment),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
