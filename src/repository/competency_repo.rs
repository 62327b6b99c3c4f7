// ==========================================
// HMS Manager - competency repository
// ==========================================
// Tables: employee, competency.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::competency::{Competency, Employee};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_date_opt(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|v| NaiveDate::parse_from_str(&v, DATE_FMT).ok())
}

// ==========================================
// CompetencyRepository
// ==========================================
pub struct CompetencyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CompetencyRepository {
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
    // Employees
    // ==========================================

    fn row_to_employee(row: &Row<'_>) -> rusqlite::Result<Employee> {
        Ok(Employee {
            employee_id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            role: row.get(3)?,
            active: row.get::<_, i64>(4)? != 0,
        })
    }

    pub fn upsert_employee(&self, employee: &Employee) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO employee (employee_id, name, email, role, active)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(employee_id) DO UPDATE SET
                name = ?2, email = ?3, role = ?4, active = ?5
            "#,
            params![
                employee.employee_id,
                employee.name,
                employee.email,
                employee.role,
                employee.active as i64,
            ],
        )?;
        Ok(())
    }

    pub fn find_employee(&self, employee_id: &str) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT employee_id, name, email, role, active FROM employee WHERE employee_id = ?1",
            params![employee_id],
            Self::row_to_employee,
        );

        match result {
            Ok(employee) => Ok(Some(employee)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Lookup by email, used by the importer to match rows to existing
    /// employees.
    pub fn find_employee_by_email(&self, email: &str) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT employee_id, name, email, role, active FROM employee WHERE email = ?1",
            params![email],
            Self::row_to_employee,
        );

        match result {
            Ok(employee) => Ok(Some(employee)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_employees(&self, include_inactive: bool) -> RepositoryResult<Vec<Employee>> {
        let conn = self.get_conn()?;
        let sql = if include_inactive {
            "SELECT employee_id, name, email, role, active FROM employee ORDER BY name ASC"
        } else {
            "SELECT employee_id, name, email, role, active FROM employee WHERE active = 1 ORDER BY name ASC"
        };
        let mut stmt = conn.prepare(sql)?;

        let employees = stmt
            .query_map([], Self::row_to_employee)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(employees)
    }

    // ==========================================
    // Competencies
    // ==========================================

    fn row_to_competency(row: &Row<'_>) -> rusqlite::Result<Competency> {
        Ok(Competency {
            competency_id: row.get(0)?,
            employee_id: row.get(1)?,
            title: row.get(2)?,
            category: row.get(3)?,
            issued_date: parse_date_opt(row.get(4)?),
            expiry_date: parse_date_opt(row.get(5)?),
            certificate_ref: row.get(6)?,
            created_at: NaiveDateTime::parse_from_str(&row.get::<_, String>(7)?, DATETIME_FMT)
                .unwrap_or_else(|_| NaiveDateTime::default()),
        })
    }

    pub fn upsert_competency(&self, competency: &Competency) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO competency
                (competency_id, employee_id, title, category, issued_date,
                 expiry_date, certificate_ref, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(competency_id) DO UPDATE SET
                title = ?3, category = ?4, issued_date = ?5,
                expiry_date = ?6, certificate_ref = ?7
            "#,
            params![
                competency.competency_id,
                competency.employee_id,
                competency.title,
                competency.category,
                competency.issued_date.map(|d| d.format(DATE_FMT).to_string()),
                competency.expiry_date.map(|d| d.format(DATE_FMT).to_string()),
                competency.certificate_ref,
                competency.created_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn find_competency(&self, competency_id: &str) -> RepositoryResult<Option<Competency>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT competency_id, employee_id, title, category, issued_date,
                    expiry_date, certificate_ref, created_at
             FROM competency WHERE competency_id = ?1",
            params![competency_id],
            Self::row_to_competency,
        );

        match result {
            Ok(competency) => Ok(Some(competency)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_competencies_for_employee(
        &self,
        employee_id: &str,
    ) -> RepositoryResult<Vec<Competency>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT competency_id, employee_id, title, category, issued_date,
                    expiry_date, certificate_ref, created_at
             FROM competency
             WHERE employee_id = ?1
             ORDER BY expiry_date ASC",
        )?;

        let competencies = stmt
            .query_map(params![employee_id], Self::row_to_competency)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(competencies)
    }

    /// All competencies with an expiry date on or before the cutoff,
    /// soonest first. Drives the expiry dashboard and reminder lists.
    pub fn list_expiring_on_or_before(
        &self,
        cutoff: NaiveDate,
    ) -> RepositoryResult<Vec<Competency>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT competency_id, employee_id, title, category, issued_date,
                    expiry_date, certificate_ref, created_at
             FROM competency
             WHERE expiry_date IS NOT NULL AND expiry_date <= ?1
             ORDER BY expiry_date ASC",
        )?;

        let competencies = stmt
            .query_map(params![cutoff.format(DATE_FMT).to_string()], Self::row_to_competency)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(competencies)
    }

    pub fn delete_competency(&self, competency_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count = conn.execute(
            "DELETE FROM competency WHERE competency_id = ?1",
            params![competency_id],
        )?;
        Ok(count)
    }
}
