//! TibiaData highscores client.
//!
//! Scans the paginated experience highscores of a world for a character by
//! case-insensitive exact name and returns its current level and cumulative
//! XP. The client is constructed explicitly and passed where needed; there
//! is no shared module-level handle.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use xptrack_common::config::FetchConfig;

/// A character's position on the highscores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighscoreHit {
    pub level: u32,
    pub xp: i64,
}

#[derive(Debug, Error)]
pub enum HighscoresError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

/// Source of highscores lookups.
///
/// The daemon uses the real [`HighscoresClient`]; collector tests substitute
/// a stub.
pub trait HighscoresSource {
    fn lookup(
        &self,
        world: &str,
        vocation: &str,
        name: &str,
    ) -> impl std::future::Future<Output = Option<HighscoreHit>> + Send;
}

/// HTTP client for the TibiaData v4 highscores API
pub struct HighscoresClient {
    client: reqwest::Client,
    base_url: String,
    page_limit: u32,
}

impl HighscoresClient {
    /// Build a client from the fetch configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, HighscoresError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(HighscoresError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_limit: config.page_limit,
        })
    }

    /// Fetch one highscores page. A 404 means the page does not exist.
    async fn fetch_page(
        &self,
        world: &str,
        vocation: &str,
        page: u32,
    ) -> Result<Vec<HighscoreEntry>, HighscoresError> {
        let url = format!(
            "{}/highscores/{}/experience/{}/{}",
            self.base_url, world, vocation, page
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HighscoresError::UnexpectedStatus(status.as_u16()));
        }

        let body: HighscoresResponse = response.json().await?;
        Ok(body
            .highscores
            .and_then(|h| h.highscore_list)
            .unwrap_or_default())
    }

    /// Scan pages for the character. Non-404 page errors are logged and the
    /// scan continues; 404 means the world has no further pages.
    async fn scan(&self, world: &str, vocation: &str, name: &str) -> Option<HighscoreHit> {
        let wanted = name.trim().to_lowercase();

        for page in 1..=self.page_limit {
            let entries = match self.fetch_page(world, vocation, page).await {
                Ok(entries) => entries,
                Err(HighscoresError::UnexpectedStatus(404)) => {
                    debug!("Highscores page {} does not exist, stopping scan", page);
                    break;
                }
                Err(e) => {
                    warn!("Highscores page {} failed: {}", page, e);
                    continue;
                }
            };

            if let Some(entry) = entries
                .iter()
                .find(|e| e.name.to_lowercase() == wanted)
            {
                debug!(
                    "Found {} on page {}: level {}, {} XP",
                    entry.name, page, entry.level, entry.value
                );
                return Some(HighscoreHit {
                    level: entry.level,
                    xp: entry.value,
                });
            }
        }

        None
    }
}

impl HighscoresSource for HighscoresClient {
    async fn lookup(&self, world: &str, vocation: &str, name: &str) -> Option<HighscoreHit> {
        let world = world_slug(world);
        let vocation = vocation_slug(vocation);
        self.scan(&world, &vocation, name).await
    }
}

/// Canonical world slug: trimmed and lowercased.
pub fn world_slug(world: &str) -> String {
    world.trim().to_lowercase()
}

/// Canonical vocation slug: trimmed and lowercased, already-plural form
/// kept as-is ("druids", "knights", ...).
pub fn vocation_slug(vocation: &str) -> String {
    vocation.trim().to_lowercase()
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct HighscoresResponse {
    highscores: Option<HighscoresPayload>,
}

#[derive(Debug, Deserialize)]
struct HighscoresPayload {
    highscore_list: Option<Vec<HighscoreEntry>>,
}

#[derive(Debug, Deserialize)]
struct HighscoreEntry {
    name: String,
    level: u32,
    /// Cumulative experience points
    value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_trimmed_and_lowercased() {
        assert_eq!(world_slug(" Etebra "), "etebra");
        assert_eq!(vocation_slug("Druids"), "druids");
        // Plural form is preserved, not singularized.
        assert_eq!(vocation_slug("knights"), "knights");
    }

    #[test]
    fn parses_tibiadata_response_shape() {
        let json = r#"{
            "highscores": {
                "world": "Etebra",
                "category": "experience",
                "highscore_list": [
                    {"rank": 1, "name": "Taiane Damanga", "vocation": "Elder Druid",
                     "world": "Etebra", "level": 512, "value": 1234567890}
                ]
            },
            "information": {"api_version": 4}
        }"#;

        let parsed: HighscoresResponse = serde_json::from_str(json).unwrap();
        let list = parsed.highscores.unwrap().highscore_list.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "Taiane Damanga");
        assert_eq!(list[0].level, 512);
        assert_eq!(list[0].value, 1_234_567_890);
    }

    #[test]
    fn missing_list_parses_as_empty() {
        let parsed: HighscoresResponse =
            serde_json::from_str(r#"{"highscores": {"world": "Etebra"}}"#).unwrap();
        assert!(parsed.highscores.unwrap().highscore_list.is_none());
    }
}
