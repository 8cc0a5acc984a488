//! Persistent storage using SQLite (rusqlite)
//!
//! This module provides:
//! - OS-standard data directory location (via `directories` crate)
//! - SQLite database with schema versioning
//! - Saved preferences (rules, team presets, sound)
//! - An archive of finished matches, stored as versioned JSON snapshots

use crate::app::Preferences;
use crate::engine::MatchSnapshot;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Current schema version. Bump this when making schema changes.
/// Version history:
/// - v1: meta and settings tables
/// - v2: added the matches archive
const SCHEMA_VERSION: u32 = 2;

/// Archive payload version. Rows written by a newer build are skipped on read.
pub const PAYLOAD_VERSION: u32 = 1;

const PREFERENCES_KEY: &str = "preferences";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("could not determine data directory")]
    NoDataDirectory,
    #[error("database schema version {found} is newer than supported version {supported}")]
    FutureSchemaVersion { found: u32, supported: u32 },
    #[error("failed to create data directory: {0}")]
    CreateDirFailed(#[source] std::io::Error),
    #[error("migration from v{from} to v{to} failed: {reason}")]
    MigrationFailed { from: u32, to: u32, reason: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Envelope stored in the `matches.payload` column
#[derive(Debug, Serialize, Deserialize)]
struct ArchivePayload {
    version: u32,
    snapshot: MatchSnapshot,
}

/// A finished match read back from the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedMatch {
    pub id: i64,
    /// Unix timestamp (milliseconds) when the match was archived
    pub created_at: i64,
    pub snapshot: MatchSnapshot,
}

/// The main storage handle for courtside data.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create the storage database.
    ///
    /// Uses OS-standard directories:
    /// - Linux: `$XDG_DATA_HOME/courtside/` or `~/.local/share/courtside/`
    /// - macOS: `~/Library/Application Support/courtside/`
    pub fn open() -> Result<Self, StorageError> {
        let data_dir = Self::data_dir()?;
        std::fs::create_dir_all(&data_dir).map_err(StorageError::CreateDirFailed)?;

        let db_path = data_dir.join("courtside.db");
        debug!(path = %db_path.display(), "opening database");
        Self::from_connection(Connection::open(&db_path)?)
    }

    /// Open an in-memory database.
    ///
    /// Used by tests, and as the fallback when the on-disk database can't be opened.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        let storage = Storage { conn };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Get the OS-standard data directory for courtside
    pub fn data_dir() -> Result<PathBuf, StorageError> {
        ProjectDirs::from("", "", "courtside")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(StorageError::NoDataDirectory)
    }

    /// Load saved preferences, if any were saved.
    ///
    /// Values out of range are pulled back into range.
    pub fn load_preferences(&self) -> Result<Option<Preferences>, StorageError> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![PREFERENCES_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            Some(json) => {
                let prefs: Preferences = serde_json::from_str(&json)?;
                Ok(Some(prefs.sanitized()))
            }
            None => Ok(None),
        }
    }

    /// Save preferences, replacing what was there.
    pub fn save_preferences(&self, prefs: &Preferences) -> Result<(), StorageError> {
        let json = serde_json::to_string(prefs)?;
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![PREFERENCES_KEY, json],
        )?;
        Ok(())
    }

    /// Append a match to the archive and return its row id.
    pub fn archive_match(&self, snapshot: &MatchSnapshot) -> Result<i64, StorageError> {
        let payload = serde_json::to_string(&ArchivePayload {
            version: PAYLOAD_VERSION,
            snapshot: snapshot.clone(),
        })?;

        self.conn.execute(
            "INSERT INTO matches (created_at, team_a, team_b, winner, payload) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                now_millis(),
                &snapshot.team_a.name,
                &snapshot.team_b.name,
                snapshot.winner.as_deref(),
                payload
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Remove an archived match. Returns false when no row had that id.
    pub fn delete_match(&self, id: i64) -> Result<bool, StorageError> {
        let deleted = self
            .conn
            .execute("DELETE FROM matches WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// All archived matches, oldest first.
    ///
    /// Rows that fail to parse or were written by a newer payload version are skipped.
    pub fn archived_matches(&self) -> Result<Vec<ArchivedMatch>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, created_at, payload FROM matches ORDER BY created_at, id")?;

        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let created_at: i64 = row.get(1)?;
            let payload: String = row.get(2)?;
            Ok((id, created_at, payload))
        })?;

        let mut matches = Vec::new();
        for row in rows {
            let (id, created_at, payload) = row?;
            match serde_json::from_str::<ArchivePayload>(&payload) {
                Ok(p) if p.version <= PAYLOAD_VERSION => matches.push(ArchivedMatch {
                    id,
                    created_at,
                    snapshot: p.snapshot,
                }),
                Ok(p) => warn!(id, version = p.version, "skipping archived match from newer version"),
                Err(e) => warn!(id, error = %e, "skipping unreadable archived match"),
            }
        }
        Ok(matches)
    }

    /// Number of archived matches.
    #[cfg(test)]
    pub fn match_count(&self) -> Result<i64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))?;
        Ok(count)
    }

    // Private helper methods

    fn initialize_schema(&self) -> Result<(), StorageError> {
        let current_version = self.get_schema_version()?;

        if current_version == 0 {
            self.create_schema_v1()?;
            self.migrate_schema(1)?;
        } else if current_version < SCHEMA_VERSION {
            self.migrate_schema(current_version)?;
        } else if current_version > SCHEMA_VERSION {
            return Err(StorageError::FutureSchemaVersion {
                found: current_version,
                supported: SCHEMA_VERSION,
            });
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Result<u32, StorageError> {
        let table_exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='meta'",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        let version: Option<u32> = self
            .conn
            .query_row("SELECT schema_version FROM meta LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(version.unwrap_or(0))
    }

    fn create_schema_v1(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            -- Meta table: schema version and creation time
            CREATE TABLE meta (
                schema_version INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            -- Settings: JSON values keyed by name
            CREATE TABLE settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;

        self.conn.execute(
            "INSERT INTO meta (schema_version, created_at) VALUES (?1, ?2)",
            params![1, now_millis()],
        )?;

        Ok(())
    }

    fn migrate_schema(&self, from_version: u32) -> Result<(), StorageError> {
        let mut current_version = from_version;

        while current_version < SCHEMA_VERSION {
            match current_version {
                1 => {
                    self.migrate_v1_to_v2()?;
                    current_version = 2;
                }
                _ => {
                    return Err(StorageError::MigrationFailed {
                        from: current_version,
                        to: SCHEMA_VERSION,
                        reason: format!("no migration path from version {}", current_version),
                    });
                }
            }
        }

        self.conn.execute(
            "UPDATE meta SET schema_version = ?1",
            params![SCHEMA_VERSION],
        )?;
        debug!(from = from_version, to = SCHEMA_VERSION, "schema migrated");

        Ok(())
    }

    /// Migrate from schema v1 to v2: add the matches archive
    fn migrate_v1_to_v2(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            -- Finished matches. team/winner columns are denormalized for browsing;
            -- the payload is the source of truth.
            CREATE TABLE IF NOT EXISTS matches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at INTEGER NOT NULL,
                team_a TEXT NOT NULL,
                team_b TEXT NOT NULL,
                winner TEXT,
                payload TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_matches_created ON matches (created_at);
            "#,
        )?;
        Ok(())
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
