//! SQLite-backed character registry and XP log store.
//!
//! Schema:
//! - characters: one row per tracked character, unique by name
//! - xp_logs: one (level, xp) snapshot per character per calendar day,
//!   enforced by a UNIQUE(character_id, date) constraint
//!
//! Logs are always served ascending by date; the statistics engine relies on
//! that ordering.

use crate::types::{Character, ExperienceSample, NewCharacter};
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-backed store for characters and their daily XP logs
pub struct XpDb {
    conn: Connection,
}

impl XpDb {
    /// Open or create the database at a specific path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create db directory: {:?}", parent))?;
            }
        }

        let conn = Connection::open(path_ref)
            .with_context(|| format!("Failed to open database: {:?}", path_ref))?;

        // WAL for concurrent reads while the collector writes
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        init_schema(&conn)?;

        Ok(Self { conn })
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Register a new character.
    pub fn add_character(&self, new: &NewCharacter) -> Result<Character> {
        let created_at = Utc::now();
        self.conn
            .execute(
                "INSERT INTO characters (name, world, vocation, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![new.name, new.world, new.vocation, created_at],
            )
            .with_context(|| format!("Failed to insert character '{}'", new.name))?;

        let id = self.conn.last_insert_rowid();
        Ok(Character {
            id,
            name: new.name.clone(),
            world: new.world.clone(),
            vocation: new.vocation.clone(),
            created_at,
        })
    }

    /// List all characters, ordered by name.
    pub fn list_characters(&self) -> Result<Vec<Character>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, world, vocation, created_at FROM characters ORDER BY name",
        )?;
        let rows = stmt.query_map([], row_to_character)?;
        let mut characters = Vec::new();
        for row in rows {
            characters.push(row?);
        }
        Ok(characters)
    }

    /// Look up a character by id.
    pub fn get_character(&self, id: i64) -> Result<Option<Character>> {
        let character = self
            .conn
            .query_row(
                "SELECT id, name, world, vocation, created_at FROM characters WHERE id = ?1",
                params![id],
                row_to_character,
            )
            .optional()?;
        Ok(character)
    }

    /// Look up a character by name, case-insensitively.
    pub fn find_character(&self, name: &str) -> Result<Option<Character>> {
        let character = self
            .conn
            .query_row(
                "SELECT id, name, world, vocation, created_at FROM characters
                 WHERE LOWER(name) = LOWER(?1)",
                params![name.trim()],
                row_to_character,
            )
            .optional()?;
        Ok(character)
    }

    /// Delete a character and all of its logs. Returns false if unknown.
    pub fn remove_character(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM characters WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Insert a daily log. Returns false when a log for that day already
    /// exists (the one-sample-per-day rule).
    pub fn insert_log(
        &self,
        character_id: i64,
        date: NaiveDate,
        level: u32,
        xp: i64,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO xp_logs (character_id, date, level, xp, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![character_id, date, level, xp, Utc::now()],
        )?;
        Ok(changed > 0)
    }

    /// Whether a log exists for the character on the given date.
    pub fn has_log_on(&self, character_id: i64, date: NaiveDate) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM xp_logs WHERE character_id = ?1 AND date = ?2",
            params![character_id, date],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// All samples for a character, ascending by date.
    pub fn logs_for(&self, character_id: i64) -> Result<Vec<ExperienceSample>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, level, xp FROM xp_logs
             WHERE character_id = ?1 ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![character_id], |row| {
            Ok(ExperienceSample {
                date: row.get(0)?,
                level: row.get(1)?,
                xp: row.get(2)?,
            })
        })?;

        let mut samples = Vec::new();
        for row in rows {
            samples.push(row?);
        }
        Ok(samples)
    }

    /// Total number of tracked characters.
    pub fn character_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM characters", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS characters (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            world TEXT NOT NULL,
            vocation TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS xp_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            character_id INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            level INTEGER NOT NULL,
            xp INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(character_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_logs_character_date
            ON xp_logs(character_id, date);
        "#,
    )?;
    Ok(())
}

fn row_to_character(row: &rusqlite::Row<'_>) -> rusqlite::Result<Character> {
    Ok(Character {
        id: row.get(0)?,
        name: row.get(1)?,
        world: row.get(2)?,
        vocation: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_character() -> NewCharacter {
        NewCharacter {
            name: "Taiane Damanga".to_string(),
            world: "Etebra".to_string(),
            vocation: "druids".to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn open_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/xptrack.db");
        let db = XpDb::open_at(&path).unwrap();
        assert_eq!(db.character_count().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn add_and_find_character_case_insensitive() {
        let db = XpDb::open_in_memory().unwrap();
        let character = db.add_character(&new_character()).unwrap();

        let found = db.find_character("taiane damanga").unwrap().unwrap();
        assert_eq!(found.id, character.id);
        assert_eq!(found.world, "Etebra");

        assert!(db.find_character("Unknown Knight").unwrap().is_none());
    }

    #[test]
    fn duplicate_character_names_are_rejected() {
        let db = XpDb::open_in_memory().unwrap();
        db.add_character(&new_character()).unwrap();
        assert!(db.add_character(&new_character()).is_err());
    }

    #[test]
    fn one_log_per_character_per_day() {
        let db = XpDb::open_in_memory().unwrap();
        let character = db.add_character(&new_character()).unwrap();
        let day = date(2026, 3, 1);

        assert!(db.insert_log(character.id, day, 100, 1000).unwrap());
        assert!(!db.insert_log(character.id, day, 100, 2000).unwrap());
        assert!(db.has_log_on(character.id, day).unwrap());

        let logs = db.logs_for(character.id).unwrap();
        assert_eq!(logs.len(), 1);
        // First insert wins.
        assert_eq!(logs[0].xp, 1000);
    }

    #[test]
    fn logs_are_served_ascending_by_date() {
        let db = XpDb::open_in_memory().unwrap();
        let character = db.add_character(&new_character()).unwrap();

        // Insert out of order.
        db.insert_log(character.id, date(2026, 3, 3), 101, 3000).unwrap();
        db.insert_log(character.id, date(2026, 3, 1), 100, 1000).unwrap();
        db.insert_log(character.id, date(2026, 3, 2), 100, 2000).unwrap();

        let logs = db.logs_for(character.id).unwrap();
        let dates: Vec<_> = logs.iter().map(|l| l.date).collect();
        assert_eq!(
            dates,
            vec![date(2026, 3, 1), date(2026, 3, 2), date(2026, 3, 3)]
        );
    }

    #[test]
    fn removing_a_character_cascades_to_logs() {
        let db = XpDb::open_in_memory().unwrap();
        let character = db.add_character(&new_character()).unwrap();
        db.insert_log(character.id, date(2026, 3, 1), 100, 1000).unwrap();

        assert!(db.remove_character(character.id).unwrap());
        assert!(db.get_character(character.id).unwrap().is_none());
        assert!(db.logs_for(character.id).unwrap().is_empty());

        // Removing again is a no-op.
        assert!(!db.remove_character(character.id).unwrap());
    }
}
