mod address;
mod analyzer;
mod bot;
mod config;
mod deploy;
mod domain;
mod format;
mod logger;
mod router;

use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load local .env if present (no-op when the platform injects env vars)
    let _ = dotenvy::dotenv();

    logger::init_tracing();

    let cfg = config::Config::from_env()?;
    info!(?cfg, "boot");

    bot::run(cfg).await
}
