//! XP Track Daemon - Tibia character experience tracker
//!
//! Polls the TibiaData highscores once a day for every registered character,
//! stores (level, xp) snapshots, and serves derived statistics over HTTP.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xptrackd::collector;
use xptrackd::highscores::HighscoresClient;
use xptrackd::server::{self, AppState};
use xptrack_common::{XpDb, XpTrackConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("xptrackd v{} starting", env!("CARGO_PKG_VERSION"));

    let config = XpTrackConfig::load();
    let db = Arc::new(Mutex::new(XpDb::open_at(&config.db_path)?));
    let client = Arc::new(HighscoresClient::new(&config.fetch)?);

    info!(
        "Tracking {} characters, database at {}",
        db.lock().await.character_count()?,
        config.db_path
    );

    let scheduler = tokio::spawn(collector::run_scheduler(
        db.clone(),
        client.clone(),
        config.fetch.hour_utc,
    ));

    let state = Arc::new(AppState::new(db, client));

    tokio::select! {
        result = server::run(state, &config.listen_addr) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down gracefully");
        }
    }

    scheduler.abort();
    Ok(())
}
