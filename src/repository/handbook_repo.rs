// ==========================================
// HMS Manager - handbook repository
// ==========================================
// Tables: handbook, handbook_section, section_version.
// Repository rule: data access only, no business logic.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::handbook::{Handbook, Section, SectionVersion};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT).unwrap_or_else(|_| NaiveDateTime::default())
}

// ==========================================
// HandbookRepository
// ==========================================
pub struct HandbookRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HandbookRepository {
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
    // Handbook rows
    // ==========================================

    pub fn upsert_handbook(&self, handbook: &Handbook) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO handbook (handbook_id, title, description, revision, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(handbook_id) DO UPDATE SET
                title = ?2, description = ?3, revision = ?4, updated_at = ?5
            "#,
            params![
                handbook.handbook_id,
                handbook.title,
                handbook.description,
                handbook.revision,
                handbook.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn find_handbook(&self, handbook_id: &str) -> RepositoryResult<Option<Handbook>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT handbook_id, title, description, revision, updated_at
             FROM handbook WHERE handbook_id = ?1",
            params![handbook_id],
            |row| {
                Ok(Handbook {
                    handbook_id: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    revision: row.get(3)?,
                    updated_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            },
        );

        match result {
            Ok(handbook) => Ok(Some(handbook)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_handbooks(&self) -> RepositoryResult<Vec<Handbook>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT handbook_id, title, description, revision, updated_at
             FROM handbook ORDER BY title ASC",
        )?;

        let handbooks = stmt
            .query_map([], |row| {
                Ok(Handbook {
                    handbook_id: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    revision: row.get(3)?,
                    updated_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(handbooks)
    }

    // ==========================================
    // Section rows (flat)
    // ==========================================

    fn row_to_section(row: &Row<'_>) -> rusqlite::Result<Section> {
        Ok(Section {
            section_id: row.get(0)?,
            handbook_id: row.get(1)?,
            parent_section_id: row.get(2)?,
            title: row.get(3)?,
            body: row.get(4)?,
            sort_order: row.get(5)?,
            updated_at: parse_datetime(&row.get::<_, String>(6)?),
            subsections: Vec::new(),
        })
    }

    pub fn insert_section(&self, section: &Section) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO handbook_section
                (section_id, handbook_id, parent_section_id, title, body, sort_order, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                section.section_id,
                section.handbook_id,
                section.parent_section_id,
                section.title,
                section.body,
                section.sort_order,
                section.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn update_section(&self, section: &Section) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE handbook_section
            SET title = ?2, body = ?3, parent_section_id = ?4, sort_order = ?5, updated_at = ?6
            WHERE section_id = ?1
            "#,
            params![
                section.section_id,
                section.title,
                section.body,
                section.parent_section_id,
                section.sort_order,
                section.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Section".to_string(),
                id: section.section_id.clone(),
            });
        }
        Ok(())
    }

    /// Delete a section. Children go with it (ON DELETE CASCADE).
    pub fn delete_section(&self, section_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count = conn.execute(
            "DELETE FROM handbook_section WHERE section_id = ?1",
            params![section_id],
        )?;
        Ok(count)
    }

    pub fn find_section(&self, section_id: &str) -> RepositoryResult<Option<Section>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT section_id, handbook_id, parent_section_id, title, body, sort_order, updated_at
             FROM handbook_section WHERE section_id = ?1",
            params![section_id],
            Self::row_to_section,
        );

        match result {
            Ok(section) => Ok(Some(section)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All sections of a handbook as flat rows, ordered by sort_order.
    pub fn list_sections(&self, handbook_id: &str) -> RepositoryResult<Vec<Section>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT section_id, handbook_id, parent_section_id, title, body, sort_order, updated_at
             FROM handbook_section
             WHERE handbook_id = ?1
             ORDER BY sort_order ASC, title ASC",
        )?;

        let sections = stmt
            .query_map(params![handbook_id], Self::row_to_section)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(sections)
    }

    /// The handbook's section tree: root sections with nested subsections,
    /// assembled from the flat rows.
    pub fn load_tree(&self, handbook_id: &str) -> RepositoryResult<Vec<Section>> {
        let flat = self.list_sections(handbook_id)?;

        let mut children: HashMap<Option<String>, Vec<Section>> = HashMap::new();
        for section in flat {
            children
                .entry(section.parent_section_id.clone())
                .or_default()
                .push(section);
        }

        fn attach(children: &mut HashMap<Option<String>, Vec<Section>>, parent: Option<String>) -> Vec<Section> {
            let mut out = children.remove(&parent).unwrap_or_default();
            for section in &mut out {
                section.subsections = attach(children, Some(section.section_id.clone()));
            }
            out
        }

        Ok(attach(&mut children, None))
    }

    // ==========================================
    // Section versions
    // ==========================================

    /// The next free version_no for a section (starts at 1).
    pub fn next_version_no(&self, section_id: &str) -> RepositoryResult<i32> {
        let conn = self.get_conn()?;
        let max: Option<i32> = conn.query_row(
            "SELECT MAX(version_no) FROM section_version WHERE section_id = ?1",
            params![section_id],
            |row| row.get(0),
        )?;
        Ok(max.unwrap_or(0) + 1)
    }

    pub fn insert_section_version(&self, version: &SectionVersion) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO section_version
                (version_id, section_id, version_no, title, body, published_by, published_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                version.version_id,
                version.section_id,
                version.version_no,
                version.title,
                version.body,
                version.published_by,
                version.published_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// Published versions of a section, newest first.
    pub fn list_section_versions(&self, section_id: &str) -> RepositoryResult<Vec<SectionVersion>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT version_id, section_id, version_no, title, body, published_by, published_at
             FROM section_version
             WHERE section_id = ?1
             ORDER BY version_no DESC",
        )?;

        let versions = stmt
            .query_map(params![section_id], |row| {
                Ok(SectionVersion {
                    version_id: row.get(0)?,
                    section_id: row.get(1)?,
                    version_no: row.get(2)?,
                    title: row.get(3)?,
                    body: row.get(4)?,
                    published_by: row.get(5)?,
                    published_at: parse_datetime(&row.get::<_, String>(6)?),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(versions)
    }
}
