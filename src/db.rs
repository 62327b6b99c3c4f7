// ==========================================
// HMS Manager - SQLite connection setup
// ==========================================
// Goals:
// - one place for Connection::open PRAGMA behavior, so foreign keys are
//   never enabled in some modules and disabled in others
// - one busy_timeout for all connections to cut down on spurious busy
//   errors under concurrent writes
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Schema version the code expects.
///
/// Used as a warning signal only (no automatic migration) so we never run
/// silently against an older database file.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Apply the unified PRAGMAs to a SQLite connection.
///
/// foreign_keys and busy_timeout are per-connection settings and must be
/// applied to every connection that is opened.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Read schema_version (None when the table does not exist yet).
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Create all tables (idempotent).
///
/// Called on startup and by the test helpers so both paths share one schema
/// definition.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS handbook (
            handbook_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            revision INTEGER NOT NULL DEFAULT 1,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS handbook_section (
            section_id TEXT PRIMARY KEY,
            handbook_id TEXT NOT NULL REFERENCES handbook(handbook_id) ON DELETE CASCADE,
            parent_section_id TEXT REFERENCES handbook_section(section_id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            body TEXT NOT NULL DEFAULT '',
            sort_order INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS section_version (
            version_id TEXT PRIMARY KEY,
            section_id TEXT NOT NULL REFERENCES handbook_section(section_id) ON DELETE CASCADE,
            version_no INTEGER NOT NULL,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            published_by TEXT NOT NULL,
            published_at TEXT NOT NULL,
            UNIQUE(section_id, version_no)
        );

        CREATE TABLE IF NOT EXISTS risk_assessment (
            assessment_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            area TEXT,
            status TEXT NOT NULL,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS hazard (
            hazard_id TEXT PRIMARY KEY,
            assessment_id TEXT NOT NULL REFERENCES risk_assessment(assessment_id) ON DELETE CASCADE,
            description TEXT NOT NULL,
            probability INTEGER NOT NULL,
            severity INTEGER NOT NULL,
            risk_value INTEGER NOT NULL,
            risk_level TEXT NOT NULL,
            existing_controls TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS measure (
            measure_id TEXT PRIMARY KEY,
            hazard_id TEXT NOT NULL REFERENCES hazard(hazard_id) ON DELETE CASCADE,
            description TEXT NOT NULL,
            responsible TEXT,
            due_date TEXT,
            status TEXT NOT NULL,
            completed_at TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sja_record (
            sja_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            work_description TEXT NOT NULL DEFAULT '',
            location TEXT,
            latitude REAL,
            longitude REAL,
            planned_date TEXT,
            status TEXT NOT NULL,
            created_by TEXT NOT NULL,
            approved_by TEXT,
            approved_at TEXT,
            weather_snapshot_json TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sja_hazard (
            sja_hazard_id TEXT PRIMARY KEY,
            sja_id TEXT NOT NULL REFERENCES sja_record(sja_id) ON DELETE CASCADE,
            description TEXT NOT NULL,
            probability INTEGER NOT NULL,
            severity INTEGER NOT NULL,
            risk_value INTEGER NOT NULL,
            risk_level TEXT NOT NULL,
            mitigation TEXT
        );

        CREATE TABLE IF NOT EXISTS employee (
            employee_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT UNIQUE,
            role TEXT,
            active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS competency (
            competency_id TEXT PRIMARY KEY,
            employee_id TEXT NOT NULL REFERENCES employee(employee_id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            category TEXT,
            issued_date TEXT,
            expiry_date TEXT,
            certificate_ref TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS action_log (
            action_id TEXT PRIMARY KEY,
            action_type TEXT NOT NULL,
            entity_kind TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            actor TEXT NOT NULL,
            summary TEXT NOT NULL,
            action_ts TEXT NOT NULL
        );

        -- action_log is queried by time window for the dashboard feed
        CREATE INDEX IF NOT EXISTS idx_action_ts ON action_log(action_ts);
        CREATE INDEX IF NOT EXISTS idx_action_entity ON action_log(entity_kind, entity_id);
        CREATE INDEX IF NOT EXISTS idx_section_parent ON handbook_section(parent_section_id);
        CREATE INDEX IF NOT EXISTS idx_hazard_assessment ON hazard(assessment_id);
        CREATE INDEX IF NOT EXISTS idx_measure_hazard ON measure(hazard_id);
        CREATE INDEX IF NOT EXISTS idx_competency_employee ON competency(employee_id);

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;
    Ok(())
}
