//! Domain and wire types shared between the daemon and the CLI.
//!
//! Wire types serialize as camelCase to keep the JSON contract identical to
//! what the dashboard and charting consumers already expect.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of week rows in the activity heatmap.
pub const HEATMAP_WEEKS: usize = 52;

/// Number of weekday columns in the activity heatmap (0 = Sunday).
pub const HEATMAP_DAYS: usize = 7;

/// A tracked character.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub world: String,
    pub vocation: String,
    pub created_at: DateTime<Utc>,
}

/// Registration request for a new character.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCharacter {
    pub name: String,
    pub world: String,
    pub vocation: String,
}

/// One dated observation of a character's level and cumulative experience.
///
/// At most one sample exists per character per calendar day; sequences are
/// stored and served ascending by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceSample {
    pub date: NaiveDate,
    pub level: u32,
    pub xp: i64,
}

/// One entry of the derived daily series, starting at the second sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyXpEntry {
    pub date: NaiveDate,
    pub daily_xp: i64,
    pub moving_avg_7: i64,
    pub moving_avg_30: i64,
}

/// The single day with the highest XP gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestDay {
    pub date: NaiveDate,
    pub daily_xp: i64,
}

/// Compact per-character summary (dashboard cards, `stats` route).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    pub name: String,
    pub level: u32,
    pub total_xp: i64,
    pub daily_average: i64,
    pub days_tracked: usize,
}

/// Full derived statistics for one character.
///
/// Recomputed fresh on every call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStatistics {
    pub name: String,
    pub world: String,
    pub vocation: String,
    pub level: u32,
    pub total_xp: i64,
    pub daily_average: i64,
    pub days_tracked: usize,
    pub daily_xp_series: Vec<DailyXpEntry>,
    /// 52x7 grid of average XP/hour, indexed by [week][weekday], Sunday = 0.
    pub activity_heatmap: Vec<Vec<f64>>,
    /// First date each milestone level was reached, None if unreached.
    pub milestone_dates: BTreeMap<u32, Option<NaiveDate>>,
    pub estimated_date_for_next_100_levels: Option<NaiveDate>,
    pub streak_count: u32,
    pub best_day: Option<BestDay>,
    /// Percentage of calendar days played so far this year.
    pub consistency_ratio: i64,
}

/// Outcome of one daily collection cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub attempted: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}
