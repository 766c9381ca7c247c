//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the clinic ledger,
//! including all slash commands, autocomplete handlers, admin sessions and
//! the framework setup.

/// Discord command implementations (general, staff, product, sale, expense, summary, report)
pub mod commands;
/// Reply formatting and argument parsing shared by commands
pub mod format;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::{AppConfig, report_layout::ReportLayout},
    core::{
        access::{AccessContext, Passcode},
        snapshot::SnapshotCache,
    },
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::{collections::HashSet, sync::Arc};
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

/// Discord users who have unlocked admin mode. Sessions never expire; they
/// end with `/lock` or a restart.
#[derive(Debug, Default)]
pub struct AdminSessions {
    users: RwLock<HashSet<String>>,
}

impl AdminSessions {
    /// Marks `user_id` as unlocked. Returns `false` if it already was.
    pub async fn grant(&self, user_id: &str) -> bool {
        self.users.write().await.insert(user_id.to_string())
    }

    /// Ends the session of `user_id`. Returns `false` if there was none.
    pub async fn revoke(&self, user_id: &str) -> bool {
        self.users.write().await.remove(user_id)
    }

    /// Whether `user_id` currently holds an admin session.
    pub async fn is_unlocked(&self, user_id: &str) -> bool {
        self.users.read().await.contains(user_id)
    }
}

/// Shared data available to all bot commands.
/// This structure holds the database connection, configuration and the
/// admin session set that commands need to access.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Parsed `config.toml`
    pub config: Arc<AppConfig>,
    /// Cell mapping for the daily report
    pub layout: ReportLayout,
    /// Admin passcode
    pub passcode: Passcode,
    /// Users currently in admin mode
    pub sessions: AdminSessions,
    /// Snapshot cache used when the store is unreachable
    pub cache: Option<SnapshotCache>,
}

impl BotData {
    /// Creates a new `BotData` instance with no unlocked sessions.
    #[must_use]
    pub fn new(
        database: DatabaseConnection,
        config: Arc<AppConfig>,
        layout: ReportLayout,
        passcode: Passcode,
        cache: Option<SnapshotCache>,
    ) -> Self {
        Self {
            database,
            config,
            layout,
            passcode,
            sessions: AdminSessions::default(),
            cache,
        }
    }

    /// Builds the access context for one invocation by `user_id`.
    pub async fn access_for(&self, user_id: &str) -> AccessContext {
        if self.sessions.is_unlocked(user_id).await {
            AccessContext::admin(user_id)
        } else {
            AccessContext::read_only(user_id)
        }
    }
}

/// Access context of the user who invoked `ctx`.
pub async fn access(ctx: poise::Context<'_, BotData, Error>) -> AccessContext {
    ctx.data().access_for(&ctx.author().id.to_string()).await
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error}", ctx.command().qualified_name);
            let reply = poise::CreateReply::default()
                .content(error.user_message())
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send error message: {e}");
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Every command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::admin(),
        commands::lock(),
        commands::staff(),
        commands::product(),
        commands::sale(),
        commands::expense(),
        commands::summary(),
        commands::report(),
    ]
}

/// Connects to Discord and runs until the client stops.
///
/// # Errors
/// Returns an error if the client cannot be built or the gateway connection fails.
#[instrument(skip_all)]
pub async fn run_bot(token: &str, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered {} commands globally", framework.options().commands.len());
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();
    let mut client = serenity::Client::builder(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await?;
    Ok(())
}
