// ==========================================
// HMS Manager - audit log repository
// ==========================================
// Table: action_log. Append-only; rows are never updated or deleted by
// the application.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ActionLogRepository
// ==========================================
pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionLogRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<ActionLog> {
        let action_type_raw: String = row.get(1)?;
        Ok(ActionLog {
            action_id: row.get(0)?,
            // Unknown strings (from newer schema versions) fall back to a
            // generic update so reads never fail.
            action_type: ActionType::from_str(&action_type_raw)
                .unwrap_or(ActionType::SectionUpdated),
            entity_kind: row.get(2)?,
            entity_id: row.get(3)?,
            actor: row.get(4)?,
            summary: row.get(5)?,
            action_ts: NaiveDateTime::parse_from_str(&row.get::<_, String>(6)?, DATETIME_FMT)
                .unwrap_or_else(|_| NaiveDateTime::default()),
        })
    }

    pub fn insert(&self, entry: &ActionLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO action_log
                (action_id, action_type, entity_kind, entity_id, actor, summary, action_ts)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                entry.action_id,
                entry.action_type.to_db_str(),
                entry.entity_kind,
                entry.entity_id,
                entry.actor,
                entry.summary,
                entry.action_ts.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// Most recent entries, newest first.
    pub fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT action_id, action_type, entity_kind, entity_id, actor, summary, action_ts
             FROM action_log
             ORDER BY action_ts DESC, action_id DESC
             LIMIT ?1",
        )?;

        let entries = stmt
            .query_map(params![limit], Self::row_to_entry)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(entries)
    }

    /// Entries for one entity, newest first.
    pub fn list_by_entity(
        &self,
        entity_kind: &str,
        entity_id: &str,
    ) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT action_id, action_type, entity_kind, entity_id, actor, summary, action_ts
             FROM action_log
             WHERE entity_kind = ?1 AND entity_id = ?2
             ORDER BY action_ts DESC, action_id DESC",
        )?;

        let entries = stmt
            .query_map(params![entity_kind, entity_id], Self::row_to_entry)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(entries)
    }
}
