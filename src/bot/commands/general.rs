//! General Discord commands - ping, help and the admin-mode switches.
//! These commands don't touch the ledger; `admin` and `lock` only change the
//! caller's session.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::access::AccessContext,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let clinic = &ctx.data().config.clinic.name;
        let help_text = format!(
            "**{clinic} Ledger Help**\n\
            Anyone can read the ledger. Changes need admin mode.\n\n\
            **Records**\n\
            • `/sale add|list|update|remove` - Record, list, correct or remove sales.\n\
            • `/expense add|import|list|update|remove` - Record expenses or import a card statement.\n\
            • `/staff add|list|update|remove` - Manage trainers and clinicians.\n\
            • `/product add|list|update|remove` - Manage the price catalog.\n\n\
            **Reports**\n\
            • `/summary monthly [year]` - Sales, expenses and profit per month.\n\
            • `/summary yearly` - The same per year.\n\
            • `/report daily [date]` - Fill the daily report template.\n\
            • `/report template <file>` - Replace the report template.\n\n\
            **Utility Commands**\n\
            • `/admin <passcode>` - Unlock admin mode for yourself.\n\
            • `/lock` - Leave admin mode.\n\
            • `/ping` - Checks if the bot is responsive."
        );

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Unlocks admin mode for the caller.
    #[poise::command(slash_command)]
    pub async fn admin(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Admin passcode"] passcode: String,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();
        let access = AccessContext::unlock(user_id.as_str(), &passcode, &data.passcode);

        let reply = if access.is_admin() {
            data.sessions.grant(&user_id).await;
            "🔓 Admin mode unlocked. Use `/lock` when you are done."
        } else {
            "❌ Wrong passcode."
        };
        ctx.send(poise::CreateReply::default().content(reply).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Leaves admin mode.
    #[poise::command(slash_command)]
    pub async fn lock(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let reply = if ctx.data().sessions.revoke(&user_id).await {
            "🔒 Admin mode locked."
        } else {
            "You were not in admin mode."
        };
        ctx.send(poise::CreateReply::default().content(reply).ephemeral(true))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
