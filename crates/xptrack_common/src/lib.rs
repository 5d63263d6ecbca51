//! Shared library for the XP Track daemon and CLI.
//!
//! Holds the domain types, the SQLite-backed log store, the level-cost
//! model, and the statistics derivation engine that both binaries consume.

pub mod config;
pub mod db;
pub mod levels;
pub mod stats;
pub mod types;

pub use config::XpTrackConfig;
pub use db::XpDb;
pub use types::{
    BestDay, Character, CharacterStatistics, CharacterSummary, CycleReport, DailyXpEntry,
    ExperienceSample, NewCharacter,
};
