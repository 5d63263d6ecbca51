//! API routes for xptrackd
//!
//! Versioned under /v1:
//! - health: daemon liveness and basic counts
//! - characters: registry CRUD, raw logs, per-character statistics
//! - statistics: full derived statistics across all characters
//! - fetch: trigger a collection cycle outside the daily schedule

use crate::collector;
use crate::highscores::HighscoresSource;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use xptrack_common::{stats, Character, CharacterStatistics, CharacterSummary, CycleReport,
    ExperienceSample, NewCharacter};

type AppStateArc = Arc<AppState>;
type ApiError = (StatusCode, String);

fn internal(e: impl std::fmt::Display) -> ApiError {
    error!("Internal error: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
}

fn not_found(msg: &str) -> ApiError {
    (StatusCode::NOT_FOUND, msg.to_string())
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub version: String,
    pub uptime_secs: u64,
    pub characters: usize,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health))
}

async fn health(State(state): State<AppStateArc>) -> Result<Json<HealthResponse>, ApiError> {
    let characters = state.db.lock().await.character_count().map_err(internal)?;
    Ok(Json(HealthResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        characters,
    }))
}

// ============================================================================
// Character Routes
// ============================================================================

pub fn character_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/characters", get(list_characters).post(add_character))
        .route("/v1/characters/:id", delete(remove_character))
        .route("/v1/characters/:id/logs", get(character_logs))
        .route("/v1/characters/:id/stats", get(character_stats))
        .route("/v1/characters/:id/statistics", get(character_statistics))
}

async fn list_characters(
    State(state): State<AppStateArc>,
) -> Result<Json<Vec<Character>>, ApiError> {
    let characters = state.db.lock().await.list_characters().map_err(internal)?;
    Ok(Json(characters))
}

/// Register a character after verifying it exists on the highscores, and
/// store its current snapshot as the first log.
async fn add_character(
    State(state): State<AppStateArc>,
    Json(new): Json<NewCharacter>,
) -> Result<(StatusCode, Json<Character>), ApiError> {
    if new.name.trim().is_empty() || new.world.trim().is_empty() || new.vocation.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "name, world and vocation are required".to_string(),
        ));
    }

    if state
        .db
        .lock()
        .await
        .find_character(&new.name)
        .map_err(internal)?
        .is_some()
    {
        return Err((
            StatusCode::CONFLICT,
            format!("Character '{}' is already tracked", new.name.trim()),
        ));
    }

    let hit = state
        .client
        .lookup(&new.world, &new.vocation, &new.name)
        .await
        .ok_or_else(|| {
            not_found("Character not found on the highscores; check name, world and vocation")
        })?;

    let db = state.db.lock().await;
    let character = db.add_character(&new).map_err(internal)?;
    db.insert_log(character.id, Utc::now().date_naive(), hit.level, hit.xp)
        .map_err(internal)?;

    info!("Registered character {} ({})", character.name, character.world);
    Ok((StatusCode::CREATED, Json(character)))
}

async fn remove_character(
    State(state): State<AppStateArc>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let removed = state.db.lock().await.remove_character(id).map_err(internal)?;
    if removed {
        info!("Removed character {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Character not found"))
    }
}

async fn character_logs(
    State(state): State<AppStateArc>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ExperienceSample>>, ApiError> {
    let db = state.db.lock().await;
    db.get_character(id)
        .map_err(internal)?
        .ok_or_else(|| not_found("Character not found"))?;
    let logs = db.logs_for(id).map_err(internal)?;
    Ok(Json(logs))
}

/// Compact summary: name, level, total XP, 7-sample daily average.
async fn character_stats(
    State(state): State<AppStateArc>,
    Path(id): Path<i64>,
) -> Result<Json<CharacterSummary>, ApiError> {
    let (character, samples) = load_character_samples(&state, id).await?;
    Ok(Json(stats::summarize(&character, &samples)))
}

/// Full derived statistics for one character.
async fn character_statistics(
    State(state): State<AppStateArc>,
    Path(id): Path<i64>,
) -> Result<Json<CharacterStatistics>, ApiError> {
    let (character, samples) = load_character_samples(&state, id).await?;
    Ok(Json(stats::compute_now(&character, &samples)))
}

async fn load_character_samples(
    state: &AppStateArc,
    id: i64,
) -> Result<(Character, Vec<ExperienceSample>), ApiError> {
    let db = state.db.lock().await;
    let character = db
        .get_character(id)
        .map_err(internal)?
        .ok_or_else(|| not_found("Character not found"))?;
    let samples = db.logs_for(id).map_err(internal)?;
    if samples.is_empty() {
        return Err(not_found("No XP logs found"));
    }
    Ok((character, samples))
}

// ============================================================================
// Statistics & Fetch Routes
// ============================================================================

pub fn statistics_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/statistics", get(all_statistics))
        .route("/v1/fetch", post(trigger_fetch))
}

/// Full derived statistics for every tracked character. Characters without
/// logs are skipped, matching the "no data" contract.
async fn all_statistics(
    State(state): State<AppStateArc>,
) -> Result<Json<Vec<CharacterStatistics>>, ApiError> {
    let db = state.db.lock().await;
    let characters = db.list_characters().map_err(internal)?;

    let mut all = Vec::with_capacity(characters.len());
    for character in characters {
        let samples = db.logs_for(character.id).map_err(internal)?;
        if samples.is_empty() {
            continue;
        }
        all.push(stats::compute_now(&character, &samples));
    }

    Ok(Json(all))
}

async fn trigger_fetch(State(state): State<AppStateArc>) -> Result<Json<CycleReport>, ApiError> {
    let today = Utc::now().date_naive();
    let report = collector::run_cycle(&state.db, state.client.as_ref(), today)
        .await
        .map_err(internal)?;
    Ok(Json(report))
}
