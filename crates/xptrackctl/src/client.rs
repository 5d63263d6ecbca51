//! HTTP client for the xptrackd API.

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use xptrack_common::{Character, CharacterStatistics, CharacterSummary, CycleReport,
    NewCharacter};

/// Default daemon address, overridable with --addr or XPTRACK_ADDR.
pub const DEFAULT_ADDR: &str = "http://127.0.0.1:7870";

pub struct DaemonClient {
    client: reqwest::Client,
    base_url: String,
}

impl DaemonClient {
    pub fn new(addr: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: addr.trim_end_matches('/').to_string(),
        })
    }

    pub async fn health(&self) -> Result<serde_json::Value> {
        self.get_json("/v1/health").await
    }

    pub async fn list_characters(&self) -> Result<Vec<Character>> {
        self.get_json("/v1/characters").await
    }

    /// Resolve a character by case-insensitive name.
    pub async fn find_character(&self, name: &str) -> Result<Character> {
        let wanted = name.trim().to_lowercase();
        self.list_characters()
            .await?
            .into_iter()
            .find(|c| c.name.to_lowercase() == wanted)
            .ok_or_else(|| anyhow!("No tracked character named '{}'", name.trim()))
    }

    pub async fn add_character(&self, new: &NewCharacter) -> Result<Character> {
        let url = format!("{}/v1/characters", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(new)
            .send()
            .await
            .with_context(|| daemon_unreachable(&self.base_url))?;
        Self::parse(response).await
    }

    pub async fn remove_character(&self, id: i64) -> Result<()> {
        let url = format!("{}/v1/characters/{}", self.base_url, id);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .with_context(|| daemon_unreachable(&self.base_url))?;
        if !response.status().is_success() {
            bail!("Daemon returned {}: {}", response.status(), response.text().await?);
        }
        Ok(())
    }

    pub async fn character_summary(&self, id: i64) -> Result<CharacterSummary> {
        self.get_json(&format!("/v1/characters/{}/stats", id)).await
    }

    pub async fn character_statistics(&self, id: i64) -> Result<CharacterStatistics> {
        self.get_json(&format!("/v1/characters/{}/statistics", id))
            .await
    }

    pub async fn trigger_fetch(&self) -> Result<CycleReport> {
        let url = format!("{}/v1/fetch", self.base_url);
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .with_context(|| daemon_unreachable(&self.base_url))?;
        Self::parse(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| daemon_unreachable(&self.base_url))?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            bail!("Daemon returned {}: {}", status, message);
        }
        response
            .json::<T>()
            .await
            .context("Failed to decode daemon response")
    }
}

fn daemon_unreachable(addr: &str) -> String {
    format!("Cannot reach xptrackd at {} (is the daemon running?)", addr)
}
