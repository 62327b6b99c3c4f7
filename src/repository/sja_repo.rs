// ==========================================
// HMS Manager - SJA repository
// ==========================================
// Tables: sja_record, sja_hazard. The weather snapshot is stored verbatim
// as JSON; the repository does not interpret it.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::sja::{SjaHazard, SjaRecord};
use crate::domain::types::{RiskLevel, SjaStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT).unwrap_or_else(|_| NaiveDateTime::default())
}

// ==========================================
// SjaRepository
// ==========================================
pub struct SjaRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SjaRepository {
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

    // ==========================================
    // SJA records
    // ==========================================

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<SjaRecord> {
        Ok(SjaRecord {
            sja_id: row.get(0)?,
            title: row.get(1)?,
            work_description: row.get(2)?,
            location: row.get(3)?,
            latitude: row.get(4)?,
            longitude: row.get(5)?,
            planned_date: row
                .get::<_, Option<String>>(6)?
                .and_then(|s| NaiveDate::parse_from_str(&s, DATE_FMT).ok()),
            status: SjaStatus::from_str(&row.get::<_, String>(7)?),
            created_by: row.get(8)?,
            approved_by: row.get(9)?,
            approved_at: row
                .get::<_, Option<String>>(10)?
                .map(|s| parse_datetime(&s)),
            weather_snapshot_json: row.get(11)?,
            created_at: parse_datetime(&row.get::<_, String>(12)?),
            updated_at: parse_datetime(&row.get::<_, String>(13)?),
        })
    }

    const RECORD_COLUMNS: &'static str = "sja_id, title, work_description, location, latitude, longitude, \
         planned_date, status, created_by, approved_by, approved_at, \
         weather_snapshot_json, created_at, updated_at";

    pub fn insert_record(&self, record: &SjaRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO sja_record
                (sja_id, title, work_description, location, latitude, longitude,
                 planned_date, status, created_by, approved_by, approved_at,
                 weather_snapshot_json, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                record.sja_id,
                record.title,
                record.work_description,
                record.location,
                record.latitude,
                record.longitude,
                record.planned_date.map(|d| d.format(DATE_FMT).to_string()),
                record.status.to_db_str(),
                record.created_by,
                record.approved_by,
                record
                    .approved_at
                    .map(|ts| ts.format(DATETIME_FMT).to_string()),
                record.weather_snapshot_json,
                record.created_at.format(DATETIME_FMT).to_string(),
                record.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn update_record(&self, record: &SjaRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE sja_record
            SET title = ?2, work_description = ?3, location = ?4, latitude = ?5,
                longitude = ?6, planned_date = ?7, status = ?8, approved_by = ?9,
                approved_at = ?10, weather_snapshot_json = ?11, updated_at = ?12
            WHERE sja_id = ?1
            "#,
            params![
                record.sja_id,
                record.title,
                record.work_description,
                record.location,
                record.latitude,
                record.longitude,
                record.planned_date.map(|d| d.format(DATE_FMT).to_string()),
                record.status.to_db_str(),
                record.approved_by,
                record
                    .approved_at
                    .map(|ts| ts.format(DATETIME_FMT).to_string()),
                record.weather_snapshot_json,
                record.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "SjaRecord".to_string(),
                id: record.sja_id.clone(),
            });
        }
        Ok(())
    }

    pub fn find_record(&self, sja_id: &str) -> RepositoryResult<Option<SjaRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM sja_record WHERE sja_id = ?1",
            Self::RECORD_COLUMNS
        );
        let result = conn.query_row(&sql, params![sja_id], Self::row_to_record);

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_records(&self) -> RepositoryResult<Vec<SjaRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM sja_record ORDER BY updated_at DESC",
            Self::RECORD_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }

    pub fn list_records_by_status(&self, status: SjaStatus) -> RepositoryResult<Vec<SjaRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM sja_record WHERE status = ?1 ORDER BY updated_at DESC",
            Self::RECORD_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let records = stmt
            .query_map(params![status.to_db_str()], Self::row_to_record)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }

    pub fn delete_record(&self, sja_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count = conn.execute("DELETE FROM sja_record WHERE sja_id = ?1", params![sja_id])?;
        Ok(count)
    }

    // ==========================================
    // SJA hazards
    // ==========================================

    fn row_to_hazard(row: &Row<'_>) -> rusqlite::Result<SjaHazard> {
        Ok(SjaHazard {
            sja_hazard_id: row.get(0)?,
            sja_id: row.get(1)?,
            description: row.get(2)?,
            probability: row.get(3)?,
            severity: row.get(4)?,
            risk_value: row.get(5)?,
            risk_level: RiskLevel::from_str(&row.get::<_, String>(6)?),
            mitigation: row.get(7)?,
        })
    }

    pub fn upsert_hazard(&self, hazard: &SjaHazard) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO sja_hazard
                (sja_hazard_id, sja_id, description, probability, severity,
                 risk_value, risk_level, mitigation)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(sja_hazard_id) DO UPDATE SET
                description = ?3, probability = ?4, severity = ?5,
                risk_value = ?6, risk_level = ?7, mitigation = ?8
            "#,
            params![
                hazard.sja_hazard_id,
                hazard.sja_id,
                hazard.description,
                hazard.probability,
                hazard.severity,
                hazard.risk_value,
                hazard.risk_level.to_db_str(),
                hazard.mitigation,
            ],
        )?;
        Ok(())
    }

    pub fn list_hazards(&self, sja_id: &str) -> RepositoryResult<Vec<SjaHazard>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT sja_hazard_id, sja_id, description, probability, severity,
                    risk_value, risk_level, mitigation
             FROM sja_hazard
             WHERE sja_id = ?1
             ORDER BY risk_value DESC",
        )?;

        let hazards = stmt
            .query_map(params![sja_id], Self::row_to_hazard)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(hazards)
    }

    pub fn delete_hazard(&self, sja_hazard_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count = conn.execute(
            "DELETE FROM sja_hazard WHERE sja_hazard_id = ?1",
            params![sja_hazard_id],
        )?;
        Ok(count)
    }
}
