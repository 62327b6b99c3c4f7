// ==========================================
// HMS Manager - configuration manager
// ==========================================
// Storage: config_kv table (key-value, scope_id='global').
// Reads fall back to defaults. The risk-matrix and weather thresholds are
// not configuration; they are fixed constants in the engines.
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Build from an existing connection. The unified PRAGMAs are
    /// re-applied (idempotent) so behavior matches freshly opened
    /// connections.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("lock failed: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// Read a config value (scope_id='global').
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock failed: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Write a global config value (upsert).
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock failed: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// Snapshot of all global config as JSON. Recorded alongside exports
    /// so a historical report can show the settings it was produced with.
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock failed: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// Restore global config from a snapshot. Overwrites existing values.
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let conn = self.conn.lock().map_err(|e| format!("lock failed: {}", e))?;
        conn.execute("BEGIN TRANSACTION", [])?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            // Snapshots may carry meta entries that are not real keys.
            if key.starts_with("__meta_") {
                continue;
            }
            let affected = conn.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
            count += affected;
        }

        conn.execute("COMMIT", [])?;
        Ok(count)
    }

    // ===== typed getters =====

    /// Days before expiry a competency counts as EXPIRING_SOON.
    pub fn get_competency_warning_days(&self) -> Result<i64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::COMPETENCY_WARNING_DAYS, "90")?;
        Ok(value.parse::<i64>().unwrap_or(90))
    }

    /// Days shown in the forecast widget (truncation window).
    pub fn get_forecast_window_days(&self) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::FORECAST_WINDOW_DAYS, "3")?;
        Ok(value.parse::<usize>().unwrap_or(3))
    }

    /// Default UI locale.
    pub fn get_default_locale(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(config_keys::DEFAULT_LOCALE, "nb-NO")
    }

    /// Entries shown in the dashboard activity feed.
    pub fn get_dashboard_feed_limit(&self) -> Result<i64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DASHBOARD_FEED_LIMIT, "20")?;
        Ok(value.parse::<i64>().unwrap_or(20))
    }
}

// ==========================================
// Config key constants
// ==========================================
pub mod config_keys {
    pub const COMPETENCY_WARNING_DAYS: &str = "competency_warning_days";
    pub const FORECAST_WINDOW_DAYS: &str = "forecast_window_days";
    pub const DEFAULT_LOCALE: &str = "default_locale";
    pub const DASHBOARD_FEED_LIMIT: &str = "dashboard_feed_limit";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_on_missing_keys() {
        let config = manager();
        assert_eq!(config.get_competency_warning_days().unwrap(), 90);
        assert_eq!(config.get_forecast_window_days().unwrap(), 3);
        assert_eq!(config.get_default_locale().unwrap(), "nb-NO");
    }

    #[test]
    fn test_set_and_get() {
        let config = manager();
        config
            .set_config_value(config_keys::COMPETENCY_WARNING_DAYS, "30")
            .unwrap();
        assert_eq!(config.get_competency_warning_days().unwrap(), 30);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let config = manager();
        config
            .set_config_value(config_keys::FORECAST_WINDOW_DAYS, "5")
            .unwrap();

        let snapshot = config.get_config_snapshot().unwrap();

        config
            .set_config_value(config_keys::FORECAST_WINDOW_DAYS, "3")
            .unwrap();
        config.restore_config_from_snapshot(&snapshot).unwrap();

        assert_eq!(config.get_forecast_window_days().unwrap(), 5);
    }

    #[test]
    fn test_garbage_value_falls_back() {
        let config = manager();
        config
            .set_config_value(config_keys::COMPETENCY_WARNING_DAYS, "ninety")
            .unwrap();
        assert_eq!(config.get_competency_warning_days().unwrap(), 90);
    }
}
