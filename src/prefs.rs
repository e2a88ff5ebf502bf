//! Preferences store.
//!
//! SQLite-backed key-value store for launcher settings, plus a small history
//! log of background-service events. Lives in the app data directory.

use rusqlite::{Connection, Result as SqliteResult};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const START_BACKGROUND: &str = "start_background_immediately";
pub const BACKGROUND_INTERVAL: &str = "background_interval_minutes";
pub const NOTIFICATIONS: &str = "notifications";
pub const CHECK_FOR_UPDATES: &str = "check_for_updates";
pub const APP_VERSION: &str = "app_version";

/// Seeded on first run. `app_version` is written on every startup instead.
const DEFAULTS: &[(&str, &str)] = &[
    (START_BACKGROUND, "false"),
    (BACKGROUND_INTERVAL, "30"),
    (NOTIFICATIONS, "true"),
    (CHECK_FOR_UPDATES, "true"),
];

/// Handle to the preferences database. Managed as Tauri state.
pub struct Prefs {
    path: PathBuf,
}

/// One background-service event from the history table.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEvent {
    pub event_type: String,
    pub timestamp: String,
    pub details: Option<String>,
}

impl Prefs {
    /// Opens (creating if needed) the store and seeds default settings.
    pub fn open<P: AsRef<Path>>(path: P) -> SqliteResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                event_type TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                details TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_history_timestamp ON history(timestamp);
            ",
        )?;

        {
            let mut stmt =
                conn.prepare("INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)")?;
            for (key, value) in DEFAULTS {
                stmt.execute((key, value))?;
            }
        }

        Ok(Self { path })
    }

    fn conn(&self) -> SqliteResult<Connection> {
        Connection::open(&self.path)
    }

    pub fn get(&self, key: &str) -> SqliteResult<Option<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get(0)).ok();
        Ok(result)
    }

    pub fn set(&self, key: &str, value: &str) -> SqliteResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            (key, value),
        )?;
        Ok(())
    }

    /// Missing or unparsable values fall back to `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Ok(Some(v)) => match v.as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => default,
            },
            _ => default,
        }
    }

    /// Missing or unparsable values fall back to `default`.
    pub fn get_u64(&self, key: &str, default: u64) -> u64 {
        self.get(key)
            .ok()
            .flatten()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// All settings as key-value pairs, for the settings UI.
    pub fn all(&self) -> SqliteResult<HashMap<String, String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
        let settings = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(settings)
    }

    /// Records a background-service event.
    pub fn log_event(&self, event_type: &str, details: Option<&str>) -> SqliteResult<()> {
        let conn = self.conn()?;
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO history (event_type, timestamp, details) VALUES (?1, ?2, ?3)",
            (event_type, now, details),
        )?;
        Ok(())
    }

    /// Most recent events first.
    pub fn recent_events(&self, limit: u32) -> SqliteResult<Vec<HistoryEvent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT event_type, timestamp, details FROM history ORDER BY id DESC LIMIT ?1",
        )?;
        let events = stmt
            .query_map([limit], |row| {
                Ok(HistoryEvent {
                    event_type: row.get(0)?,
                    timestamp: row.get(1)?,
                    details: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_temp() -> (tempfile::TempDir, Prefs) {
        let dir = tempdir().expect("tempdir");
        let prefs = Prefs::open(dir.path().join("prefs.db")).expect("open prefs");
        (dir, prefs)
    }

    #[test]
    fn test_defaults_seeded_on_first_open() {
        let (_dir, prefs) = open_temp();
        assert_eq!(
            prefs.get(START_BACKGROUND).unwrap(),
            Some("false".to_string())
        );
        assert_eq!(
            prefs.get(BACKGROUND_INTERVAL).unwrap(),
            Some("30".to_string())
        );
        assert!(prefs.get_bool(NOTIFICATIONS, false));
        assert!(prefs.get_bool(CHECK_FOR_UPDATES, false));
    }

    #[test]
    fn test_reopen_does_not_clobber_user_values() {
        let dir = tempdir().expect("tempdir");
        let db = dir.path().join("prefs.db");
        {
            let prefs = Prefs::open(&db).expect("open prefs");
            prefs.set(BACKGROUND_INTERVAL, "5").unwrap();
        }
        let prefs = Prefs::open(&db).expect("reopen prefs");
        assert_eq!(prefs.get_u64(BACKGROUND_INTERVAL, 30), 5);
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let (_dir, prefs) = open_temp();
        prefs.set(APP_VERSION, "2.5.5").unwrap();
        assert_eq!(prefs.get(APP_VERSION).unwrap(), Some("2.5.5".to_string()));

        prefs.set(APP_VERSION, "2.6.0").unwrap();
        assert_eq!(prefs.get(APP_VERSION).unwrap(), Some("2.6.0".to_string()));
    }

    #[test]
    fn test_get_bool_falls_back_on_garbage() {
        let (_dir, prefs) = open_temp();
        prefs.set("flag", "maybe").unwrap();
        assert!(prefs.get_bool("flag", true));
        assert!(!prefs.get_bool("flag", false));
        assert!(prefs.get_bool("missing", true));

        prefs.set("flag", "1").unwrap();
        assert!(prefs.get_bool("flag", false));
    }

    #[test]
    fn test_get_u64_falls_back_on_garbage() {
        let (_dir, prefs) = open_temp();
        prefs.set("n", "oops").unwrap();
        assert_eq!(prefs.get_u64("n", 30), 30);
        prefs.set("n", " 15 ").unwrap();
        assert_eq!(prefs.get_u64("n", 30), 15);
        assert_eq!(prefs.get_u64("missing", 7), 7);
    }

    #[test]
    fn test_all_contains_defaults_and_user_keys() {
        let (_dir, prefs) = open_temp();
        prefs.set("custom", "value").unwrap();
        let all = prefs.all().unwrap();
        assert_eq!(all.get("custom").map(String::as_str), Some("value"));
        assert!(all.contains_key(START_BACKGROUND));
    }

    #[test]
    fn test_history_is_recorded_newest_first_and_capped() {
        let (_dir, prefs) = open_temp();
        prefs.log_event("background_run", Some("interval")).unwrap();
        prefs.log_event("background_run", Some("manual")).unwrap();
        prefs.log_event("background_started", None).unwrap();

        let events = prefs.recent_events(2).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "background_started");
        assert_eq!(events[1].details.as_deref(), Some("manual"));
    }
}
