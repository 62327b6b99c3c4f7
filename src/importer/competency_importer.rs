// ==========================================
// HMS Manager - competency list importer
// ==========================================
// Imports employee competency lists from CSV/XLSX. Headers are matched
// against Norwegian and English aliases; bad rows are reported per row
// and never abort the rest of the file.
// ==========================================

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::competency::{Competency, Employee};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::parser_for;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::competency_repo::CompetencyRepository;

// Header aliases, lowercased. First column set that matches wins.
const NAME_ALIASES: &[&str] = &["navn", "ansatt", "name", "employee"];
const EMAIL_ALIASES: &[&str] = &["epost", "e-post", "email", "e-mail"];
const TITLE_ALIASES: &[&str] = &["kompetanse", "kurs", "tittel", "competency", "title", "course"];
const CATEGORY_ALIASES: &[&str] = &["kategori", "category", "type"];
const ISSUED_ALIASES: &[&str] = &["utstedt", "utstedt_dato", "issued", "issued_date"];
const EXPIRY_ALIASES: &[&str] = &["utløper", "utloper", "gyldig_til", "expiry", "expiry_date"];

// ==========================================
// Report types
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based data row number (header excluded).
    pub row_no: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
}

// ==========================================
// CompetencyImporter
// ==========================================
pub struct CompetencyImporter {
    competency_repo: Arc<CompetencyRepository>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl CompetencyImporter {
    pub fn new(
        competency_repo: Arc<CompetencyRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            competency_repo,
            action_log_repo,
        }
    }

    /// Import one file. Unknown employees are created (matched by email
    /// when present, else by exact name).
    pub fn import_file(&self, path: &Path, actor: &str) -> ImportResult<ImportReport> {
        let parser = parser_for(path)?;
        let records = parser.parse_to_raw_records(path)?;

        if records.is_empty() {
            return Ok(ImportReport {
                total_rows: 0,
                imported: 0,
                skipped: 0,
                errors: Vec::new(),
            });
        }

        // Resolve the column names once from the first record's keys.
        let columns = ColumnMap::resolve(records[0].keys())?;

        // Name -> employee_id cache so one file creates each person once.
        let mut known_by_name: HashMap<String, String> = HashMap::new();
        for employee in self
            .competency_repo
            .list_employees(true)
            .map_err(|e| ImportError::Aborted(e.to_string()))?
        {
            known_by_name.insert(employee.name.to_lowercase(), employee.employee_id);
        }

        let mut report = ImportReport {
            total_rows: records.len(),
            imported: 0,
            skipped: 0,
            errors: Vec::new(),
        };

        for (idx, record) in records.iter().enumerate() {
            let row_no = idx + 1;
            match self.import_row(record, &columns, &mut known_by_name) {
                Ok(()) => report.imported += 1,
                Err(message) => {
                    warn!(row_no, %message, "import row skipped");
                    report.skipped += 1;
                    report.errors.push(RowError { row_no, message });
                }
            }
        }

        let entry = ActionLog::new(
            ActionType::CompetencyImported,
            "IMPORT",
            &path.display().to_string(),
            actor,
            format!(
                "Imported {} of {} rows ({} skipped)",
                report.imported, report.total_rows, report.skipped
            ),
        );
        if let Err(e) = self.action_log_repo.insert(&entry) {
            warn!(error = %e, "failed to write action log entry");
        }

        info!(
            imported = report.imported,
            skipped = report.skipped,
            "competency import finished"
        );
        Ok(report)
    }

    fn import_row(
        &self,
        record: &HashMap<String, String>,
        columns: &ColumnMap,
        known_by_name: &mut HashMap<String, String>,
    ) -> Result<(), String> {
        let name = columns.value(record, &columns.name);
        if name.is_empty() {
            return Err("employee name is missing".to_string());
        }
        let title = columns.value(record, &columns.title);
        if title.is_empty() {
            return Err("competency title is missing".to_string());
        }

        let email = columns.opt_value(record, &columns.email);
        let category = columns.opt_value(record, &columns.category);
        let issued_date = columns
            .opt_value(record, &columns.issued)
            .map(|v| parse_date(&v))
            .transpose()?;
        let expiry_date = columns
            .opt_value(record, &columns.expiry)
            .map(|v| parse_date(&v))
            .transpose()?;

        if let (Some(issued), Some(expiry)) = (issued_date, expiry_date) {
            if expiry < issued {
                return Err(format!("expiry {} is before issued {}", expiry, issued));
            }
        }

        let employee_id = self.resolve_employee(&name, email.as_deref(), known_by_name)?;

        let competency = Competency {
            competency_id: Uuid::new_v4().to_string(),
            employee_id,
            title,
            category,
            issued_date,
            expiry_date,
            certificate_ref: None,
            created_at: Utc::now().naive_utc(),
        };
        self.competency_repo
            .upsert_competency(&competency)
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    fn resolve_employee(
        &self,
        name: &str,
        email: Option<&str>,
        known_by_name: &mut HashMap<String, String>,
    ) -> Result<String, String> {
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            if let Some(existing) = self
                .competency_repo
                .find_employee_by_email(email)
                .map_err(|e| e.to_string())?
            {
                return Ok(existing.employee_id);
            }
        }

        if let Some(id) = known_by_name.get(&name.to_lowercase()) {
            return Ok(id.clone());
        }

        let employee = Employee {
            employee_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.map(|s| s.to_string()).filter(|s| !s.is_empty()),
            role: None,
            active: true,
        };
        self.competency_repo
            .upsert_employee(&employee)
            .map_err(|e| e.to_string())?;
        known_by_name.insert(name.to_lowercase(), employee.employee_id.clone());

        Ok(employee.employee_id)
    }
}

// ==========================================
// Column resolution
// ==========================================
struct ColumnMap {
    name: String,
    email: Option<String>,
    title: String,
    category: Option<String>,
    issued: Option<String>,
    expiry: Option<String>,
}

impl ColumnMap {
    fn resolve<'a>(headers: impl Iterator<Item = &'a String>) -> ImportResult<Self> {
        let headers: Vec<&String> = headers.collect();

        let find = |aliases: &[&str]| -> Option<String> {
            headers
                .iter()
                .find(|h| aliases.contains(&h.to_lowercase().as_str()))
                .map(|h| (*h).clone())
        };

        let name = find(NAME_ALIASES)
            .ok_or_else(|| ImportError::MissingColumn("navn/name".to_string()))?;
        let title = find(TITLE_ALIASES)
            .ok_or_else(|| ImportError::MissingColumn("kompetanse/title".to_string()))?;

        Ok(Self {
            name,
            email: find(EMAIL_ALIASES),
            title,
            category: find(CATEGORY_ALIASES),
            issued: find(ISSUED_ALIASES),
            expiry: find(EXPIRY_ALIASES),
        })
    }

    fn value(&self, record: &HashMap<String, String>, column: &str) -> String {
        record.get(column).map(|v| v.trim().to_string()).unwrap_or_default()
    }

    fn opt_value(&self, record: &HashMap<String, String>, column: &Option<String>) -> Option<String> {
        column
            .as_ref()
            .and_then(|c| record.get(c))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Accepts ISO (2026-05-01) and Norwegian (01.05.2026) date forms.
fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d.%m.%Y"))
        .map_err(|_| format!("unparseable date: {}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(
            parse_date("2026-05-01").unwrap(),
            NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
        );
        assert_eq!(
            parse_date("01.05.2026").unwrap(),
            NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
        );
        assert!(parse_date("05/01/2026").is_err());
    }

    #[test]
    fn test_column_resolution_norwegian_headers() {
        let headers = vec![
            "Navn".to_string(),
            "Epost".to_string(),
            "Kompetanse".to_string(),
            "Utløper".to_string(),
        ];
        let columns = ColumnMap::resolve(headers.iter()).unwrap();
        assert_eq!(columns.name, "Navn");
        assert_eq!(columns.title, "Kompetanse");
        assert_eq!(columns.expiry.as_deref(), Some("Utløper"));
        assert!(columns.category.is_none());
    }

    #[test]
    fn test_missing_required_column() {
        let headers = vec!["Epost".to_string(), "Kategori".to_string()];
        assert!(matches!(
            ColumnMap::resolve(headers.iter()),
            Err(ImportError::MissingColumn(_))
        ));
    }
}
