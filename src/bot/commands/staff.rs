//! Staff management commands - `/staff add|list|update|remove`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{self, BotData, format::parse_choice, handlers::autocomplete},
        core::staff,
        entities::StaffRole,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Manage trainers and clinicians.
    #[poise::command(
        slash_command,
        subcommands("staff_add", "staff_list", "staff_update", "staff_remove")
    )]
    pub async fn staff(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Staff management command. Available subcommands:\n\
            `/staff add` - Add a staff member\n\
            `/staff list` - List all staff\n\
            `/staff update` - Rename a staff member or change their rank\n\
            `/staff remove` - Remove a staff member",
        )
        .await?;
        Ok(())
    }

    /// Adds a staff member.
    #[poise::command(slash_command, rename = "add")]
    pub async fn staff_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Display name"] name: String,
        #[description = "Rank used for PT prices"]
        #[autocomplete = "autocomplete::autocomplete_role"]
        role: String,
    ) -> Result<()> {
        let role: StaffRole = parse_choice(&role)?;
        let access = bot::access(ctx).await;
        let member = staff::create_staff(&ctx.data().database, &access, &name, role).await?;

        ctx.say(format!(
            "✅ Added **{}** ({}) as staff #{}.",
            member.name,
            member.role.label(),
            member.id
        ))
        .await?;
        Ok(())
    }

    /// Lists all staff members.
    #[poise::command(slash_command, rename = "list")]
    pub async fn staff_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let members = staff::get_all_staff(&ctx.data().database).await?;
        if members.is_empty() {
            ctx.say("No staff yet. Add someone with `/staff add`.").await?;
            return Ok(());
        }

        let fields = members.into_iter().map(|m| {
            (
                format!("#{} {}", m.id, m.name),
                m.role.label().to_string(),
                true,
            )
        });
        let embed = serenity::CreateEmbed::default()
            .title("**Staff**")
            .color(0x0058_65F2)
            .fields(fields);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Renames a staff member or changes their rank. Recorded sales keep their prices.
    #[poise::command(slash_command, rename = "update")]
    pub async fn staff_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the staff member"]
        #[autocomplete = "autocomplete::autocomplete_staff_name"]
        name: String,
        #[description = "New display name"] new_name: Option<String>,
        #[description = "New rank used for PT prices"]
        #[autocomplete = "autocomplete::autocomplete_role"]
        role: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(member) = staff::get_staff_by_name(db, &name).await? else {
            ctx.say(format!("❌ Staff member '{name}' not found.")).await?;
            return Ok(());
        };

        let role = match role {
            Some(role) => parse_choice::<StaffRole>(&role)?,
            None => member.role,
        };
        let new_name = new_name.unwrap_or_else(|| member.name.clone());
        let access = bot::access(ctx).await;
        let updated = staff::update_staff(db, &access, member.id, &new_name, role).await?;

        ctx.say(format!(
            "✅ Staff #{} is now **{}** ({}). Recorded sales keep their prices.",
            updated.id,
            updated.name,
            updated.role.label()
        ))
        .await?;
        Ok(())
    }

    /// Removes a staff member. Their sales are kept without a staff link.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn staff_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the staff member"]
        #[autocomplete = "autocomplete::autocomplete_staff_name"]
        name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(member) = staff::get_staff_by_name(db, &name).await? else {
            ctx.say(format!("❌ Staff member '{name}' not found.")).await?;
            return Ok(());
        };

        let access = bot::access(ctx).await;
        let detached = staff::delete_staff(db, &access, member.id).await?;
        ctx.say(format!(
            "✅ Removed **{}**. {detached} sale(s) are kept without a staff link.",
            member.name
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
