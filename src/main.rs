use clinic_ledger::{
    bot::{self, BotData},
    config::{self, access::passcode_from_env, database, report_layout},
    core::{product, snapshot::SnapshotCache},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();

    // 3. Configuration and report layout
    let app_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {e}"))?;
    let layout = report_layout::load_layout(&app_config.report.layout_path)
        .inspect_err(|e| error!("Failed to load report layout: {e}"))?;
    info!("Configuration loaded for {}", app_config.clinic.name);

    // 4. Database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;

    // 5. Seed the catalog from config on first start only
    let seeded = product::seed_catalog(&db, &app_config.products).await?;
    info!("Catalog seeding added {seeded} product(s)");

    // 6. Run the bot
    // DISCORD_BOT_TOKEN is loaded here, directly before use, not stored in AppConfig
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    let cache = SnapshotCache::from_settings(&app_config.cache);
    let data = BotData::new(
        db,
        Arc::new(app_config),
        layout,
        passcode_from_env(),
        cache,
    );
    bot::run_bot(&token, data).await
}
