//! HTTP API integration tests.
//!
//! Drives the router directly with tower's oneshot, no TCP listener.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;
use xptrack_common::config::FetchConfig;
use xptrack_common::{CharacterStatistics, CharacterSummary, NewCharacter, XpDb};
use xptrackd::highscores::HighscoresClient;
use xptrackd::server::{router, AppState};

fn test_state() -> (Arc<AppState>, Arc<Mutex<XpDb>>) {
    let db = Arc::new(Mutex::new(XpDb::open_in_memory().unwrap()));
    // Unroutable endpoint: registration lookups fail fast instead of
    // touching the real API.
    let fetch = FetchConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        page_limit: 1,
        timeout_secs: 1,
        ..FetchConfig::default()
    };
    let client = Arc::new(HighscoresClient::new(&fetch).unwrap());
    (Arc::new(AppState::new(db.clone(), client)), db)
}

async fn seed_character(db: &Arc<Mutex<XpDb>>, logs: &[(NaiveDate, u32, i64)]) -> i64 {
    let db = db.lock().await;
    let character = db
        .add_character(&NewCharacter {
            name: "Taiane Damanga".to_string(),
            world: "Etebra".to_string(),
            vocation: "druids".to_string(),
        })
        .unwrap();
    for &(date, level, xp) in logs {
        db.insert_log(character.id, date, level, xp).unwrap();
    }
    character.id
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_character_count() {
    let (state, db) = test_state();
    seed_character(&db, &[]).await;

    let response = router(state)
        .oneshot(Request::get("/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: serde_json::Value = body_json(response).await;
    assert_eq!(health["characters"], 1);
}

#[tokio::test]
async fn stats_route_returns_summary() {
    let (state, db) = test_state();
    let id = seed_character(
        &db,
        &[
            (date(2026, 3, 1), 100, 1_000_000),
            (date(2026, 3, 2), 100, 1_500_000),
            (date(2026, 3, 3), 101, 2_000_000),
        ],
    )
    .await;

    let response = router(state)
        .oneshot(
            Request::get(format!("/v1/characters/{}/stats", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let summary: CharacterSummary = body_json(response).await;
    assert_eq!(summary.name, "Taiane Damanga");
    assert_eq!(summary.level, 101);
    assert_eq!(summary.total_xp, 2_000_000);
    assert_eq!(summary.days_tracked, 3);
    assert_eq!(summary.daily_average, 500_000);
}

#[tokio::test]
async fn stats_route_signals_no_data() {
    let (state, db) = test_state();
    let id = seed_character(&db, &[]).await;

    let response = router(state)
        .oneshot(
            Request::get(format!("/v1/characters/{}/stats", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_statistics_route_computes_derived_fields() {
    let (state, db) = test_state();
    let id = seed_character(
        &db,
        &[
            (date(2026, 3, 1), 199, 1_000_000),
            (date(2026, 3, 2), 201, 2_000_000),
            (date(2026, 3, 3), 205, 3_500_000),
        ],
    )
    .await;

    let response = router(state)
        .oneshot(
            Request::get(format!("/v1/characters/{}/statistics", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let statistics: CharacterStatistics = body_json(response).await;
    assert_eq!(statistics.daily_xp_series.len(), 2);
    assert_eq!(statistics.daily_xp_series[0].daily_xp, 1_000_000);
    assert_eq!(statistics.milestone_dates[&200], Some(date(2026, 3, 2)));
    assert_eq!(statistics.activity_heatmap.len(), 52);
    assert!(statistics.estimated_date_for_next_100_levels.is_some());
}

#[tokio::test]
async fn statistics_index_skips_characters_without_logs() {
    let (state, db) = test_state();
    seed_character(&db, &[]).await;

    let response = router(state)
        .oneshot(Request::get("/v1/statistics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let all: Vec<CharacterStatistics> = body_json(response).await;
    assert!(all.is_empty());
}

#[tokio::test]
async fn registration_fails_when_character_is_not_on_highscores() {
    let (state, _db) = test_state();

    let body = serde_json::to_string(&NewCharacter {
        name: "Ghost".to_string(),
        world: "Etebra".to_string(),
        vocation: "druids".to_string(),
    })
    .unwrap();

    let response = router(state)
        .oneshot(
            Request::post("/v1/characters")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_character() {
    let (state, db) = test_state();
    let id = seed_character(&db, &[(date(2026, 3, 1), 100, 1_000_000)]).await;

    let app = router(state);
    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/v1/characters/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::get(format!("/v1/characters/{}/logs", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
