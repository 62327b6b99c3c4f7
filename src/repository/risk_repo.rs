// ==========================================
// HMS Manager - risk assessment repository
// ==========================================
// Tables: risk_assessment, hazard, measure.
// Repository rule: data access only; risk values arrive precomputed from
// the API layer.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::risk_assessment::{Hazard, Measure, RiskAssessment};
use crate::domain::types::{AssessmentStatus, MeasureStatus, RiskLevel};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT).unwrap_or_else(|_| NaiveDateTime::default())
}

fn parse_date_opt(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|v| NaiveDate::parse_from_str(&v, DATE_FMT).ok())
}

// ==========================================
// RiskAssessmentRepository
// ==========================================
pub struct RiskAssessmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RiskAssessmentRepository {
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
    // Assessments
    // ==========================================

    fn row_to_assessment(row: &Row<'_>) -> rusqlite::Result<RiskAssessment> {
        Ok(RiskAssessment {
            assessment_id: row.get(0)?,
            title: row.get(1)?,
            area: row.get(2)?,
            status: AssessmentStatus::from_str(&row.get::<_, String>(3)?),
            created_by: row.get(4)?,
            created_at: parse_datetime(&row.get::<_, String>(5)?),
            updated_at: parse_datetime(&row.get::<_, String>(6)?),
        })
    }

    pub fn insert_assessment(&self, assessment: &RiskAssessment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO risk_assessment
                (assessment_id, title, area, status, created_by, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                assessment.assessment_id,
                assessment.title,
                assessment.area,
                assessment.status.to_db_str(),
                assessment.created_by,
                assessment.created_at.format(DATETIME_FMT).to_string(),
                assessment.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn update_assessment(&self, assessment: &RiskAssessment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE risk_assessment
            SET title = ?2, area = ?3, status = ?4, updated_at = ?5
            WHERE assessment_id = ?1
            "#,
            params![
                assessment.assessment_id,
                assessment.title,
                assessment.area,
                assessment.status.to_db_str(),
                assessment.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "RiskAssessment".to_string(),
                id: assessment.assessment_id.clone(),
            });
        }
        Ok(())
    }

    pub fn find_assessment(&self, assessment_id: &str) -> RepositoryResult<Option<RiskAssessment>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT assessment_id, title, area, status, created_by, created_at, updated_at
             FROM risk_assessment WHERE assessment_id = ?1",
            params![assessment_id],
            Self::row_to_assessment,
        );

        match result {
            Ok(assessment) => Ok(Some(assessment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_assessments(&self) -> RepositoryResult<Vec<RiskAssessment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT assessment_id, title, area, status, created_by, created_at, updated_at
             FROM risk_assessment ORDER BY updated_at DESC",
        )?;

        let assessments = stmt
            .query_map([], Self::row_to_assessment)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(assessments)
    }

    // ==========================================
    // Hazards
    // ==========================================

    fn row_to_hazard(row: &Row<'_>) -> rusqlite::Result<Hazard> {
        Ok(Hazard {
            hazard_id: row.get(0)?,
            assessment_id: row.get(1)?,
            description: row.get(2)?,
            probability: row.get(3)?,
            severity: row.get(4)?,
            risk_value: row.get(5)?,
            risk_level: RiskLevel::from_str(&row.get::<_, String>(6)?),
            existing_controls: row.get(7)?,
            created_at: parse_datetime(&row.get::<_, String>(8)?),
            updated_at: parse_datetime(&row.get::<_, String>(9)?),
        })
    }

    /// Insert or replace a hazard (upsert keyed on hazard_id).
    pub fn upsert_hazard(&self, hazard: &Hazard) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO hazard
                (hazard_id, assessment_id, description, probability, severity,
                 risk_value, risk_level, existing_controls, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(hazard_id) DO UPDATE SET
                description = ?3, probability = ?4, severity = ?5,
                risk_value = ?6, risk_level = ?7, existing_controls = ?8,
                updated_at = ?10
            "#,
            params![
                hazard.hazard_id,
                hazard.assessment_id,
                hazard.description,
                hazard.probability,
                hazard.severity,
                hazard.risk_value,
                hazard.risk_level.to_db_str(),
                hazard.existing_controls,
                hazard.created_at.format(DATETIME_FMT).to_string(),
                hazard.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn find_hazard(&self, hazard_id: &str) -> RepositoryResult<Option<Hazard>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT hazard_id, assessment_id, description, probability, severity,
                    risk_value, risk_level, existing_controls, created_at, updated_at
             FROM hazard WHERE hazard_id = ?1",
            params![hazard_id],
            Self::row_to_hazard,
        );

        match result {
            Ok(hazard) => Ok(Some(hazard)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Hazards of one assessment, highest risk first.
    pub fn list_hazards(&self, assessment_id: &str) -> RepositoryResult<Vec<Hazard>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT hazard_id, assessment_id, description, probability, severity,
                    risk_value, risk_level, existing_controls, created_at, updated_at
             FROM hazard
             WHERE assessment_id = ?1
             ORDER BY risk_value DESC, created_at ASC",
        )?;

        let hazards = stmt
            .query_map(params![assessment_id], Self::row_to_hazard)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(hazards)
    }

    /// Hazards at a given risk level, across assessments.
    pub fn list_hazards_by_level(&self, risk_level: RiskLevel) -> RepositoryResult<Vec<Hazard>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT hazard_id, assessment_id, description, probability, severity,
                    risk_value, risk_level, existing_controls, created_at, updated_at
             FROM hazard
             WHERE risk_level = ?1
             ORDER BY risk_value DESC",
        )?;

        let hazards = stmt
            .query_map(params![risk_level.to_db_str()], Self::row_to_hazard)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(hazards)
    }

    pub fn delete_hazard(&self, hazard_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count = conn.execute("DELETE FROM hazard WHERE hazard_id = ?1", params![hazard_id])?;
        Ok(count)
    }

    // ==========================================
    // Measures
    // ==========================================

    fn row_to_measure(row: &Row<'_>) -> rusqlite::Result<Measure> {
        Ok(Measure {
            measure_id: row.get(0)?,
            hazard_id: row.get(1)?,
            description: row.get(2)?,
            responsible: row.get(3)?,
            due_date: parse_date_opt(row.get(4)?),
            status: MeasureStatus::from_str(&row.get::<_, String>(5)?),
            completed_at: row
                .get::<_, Option<String>>(6)?
                .map(|s| parse_datetime(&s)),
            created_at: parse_datetime(&row.get::<_, String>(7)?),
        })
    }

    pub fn upsert_measure(&self, measure: &Measure) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO measure
                (measure_id, hazard_id, description, responsible, due_date,
                 status, completed_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(measure_id) DO UPDATE SET
                description = ?3, responsible = ?4, due_date = ?5,
                status = ?6, completed_at = ?7
            "#,
            params![
                measure.measure_id,
                measure.hazard_id,
                measure.description,
                measure.responsible,
                measure.due_date.map(|d| d.format(DATE_FMT).to_string()),
                measure.status.to_db_str(),
                measure
                    .completed_at
                    .map(|ts| ts.format(DATETIME_FMT).to_string()),
                measure.created_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn find_measure(&self, measure_id: &str) -> RepositoryResult<Option<Measure>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT measure_id, hazard_id, description, responsible, due_date,
                    status, completed_at, created_at
             FROM measure WHERE measure_id = ?1",
            params![measure_id],
            Self::row_to_measure,
        );

        match result {
            Ok(measure) => Ok(Some(measure)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_measures(&self, hazard_id: &str) -> RepositoryResult<Vec<Measure>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT measure_id, hazard_id, description, responsible, due_date,
                    status, completed_at, created_at
             FROM measure
             WHERE hazard_id = ?1
             ORDER BY created_at ASC",
        )?;

        let measures = stmt
            .query_map(params![hazard_id], Self::row_to_measure)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(measures)
    }

    /// Open (not DONE) measures across all assessments.
    pub fn count_open_measures(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM measure WHERE status != 'DONE'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Open measures for one assessment.
    pub fn count_open_measures_for_assessment(&self, assessment_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*)
             FROM measure m
             JOIN hazard h ON h.hazard_id = m.hazard_id
             WHERE h.assessment_id = ?1 AND m.status != 'DONE'",
            params![assessment_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
