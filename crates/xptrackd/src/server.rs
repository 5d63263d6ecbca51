//! HTTP server for xptrackd

use crate::highscores::HighscoresClient;
use crate::routes;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::info;
use xptrack_common::XpDb;

/// Application state shared across handlers
pub struct AppState {
    pub db: Arc<Mutex<XpDb>>,
    pub client: Arc<HighscoresClient>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(db: Arc<Mutex<XpDb>>, client: Arc<HighscoresClient>) -> Self {
        Self {
            db,
            client,
            start_time: Instant::now(),
        }
    }
}

/// Build the full API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::character_routes())
        .merge(routes::statistics_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until the task is cancelled.
pub async fn run(state: Arc<AppState>, listen_addr: &str) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("Listening on http://{}", listen_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
