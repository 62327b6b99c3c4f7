// ==========================================
// HMS Manager - competency API
// ==========================================
// Responsibility: employee/competency CRUD plus the derived expiry status
// views. Status is computed on read with the configured warning window.
// ==========================================

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{validate_id, validate_optional_text, validate_required_text, MAX_TITLE_LEN};
use crate::config::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::competency::{Competency, Employee};
use crate::domain::types::CompetencyStatus;
use crate::engine::competency::CompetencyStatusEngine;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::competency_repo::CompetencyRepository;

// ==========================================
// View types
// ==========================================

/// Competency plus its derived status, for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyWithStatus {
    #[serde(flatten)]
    pub competency: Competency,
    pub status: CompetencyStatus,
}

/// One employee with all competencies and the worst status among them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeOverview {
    pub employee: Employee,
    pub competencies: Vec<CompetencyWithStatus>,
    pub worst_status: Option<CompetencyStatus>,
}

// ==========================================
// Inputs
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeInput {
    pub employee_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyInput {
    pub competency_id: Option<String>,
    pub employee_id: String,
    pub title: String,
    pub category: Option<String>,
    pub issued_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub certificate_ref: Option<String>,
}

// ==========================================
// CompetencyApi
// ==========================================
pub struct CompetencyApi {
    competency_repo: Arc<CompetencyRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<ConfigManager>,
}

impl CompetencyApi {
    pub fn new(
        competency_repo: Arc<CompetencyRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            competency_repo,
            action_log_repo,
            config,
        }
    }

    fn status_engine(&self) -> CompetencyStatusEngine {
        let warning_days = self.config.get_competency_warning_days().unwrap_or(90);
        CompetencyStatusEngine::with_warning_days(warning_days)
    }

    // ==========================================
    // Employees
    // ==========================================

    pub fn save_employee(&self, input: EmployeeInput, actor: &str) -> ApiResult<Employee> {
        validate_required_text("name", &input.name, MAX_TITLE_LEN)?;
        validate_optional_text("email", input.email.as_deref(), MAX_TITLE_LEN)?;
        validate_optional_text("role", input.role.as_deref(), MAX_TITLE_LEN)?;

        let employee = Employee {
            employee_id: input
                .employee_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: input.name,
            email: input.email,
            role: input.role,
            active: input.active,
        };
        self.competency_repo.upsert_employee(&employee)?;

        self.log(
            ActionType::EmployeeSaved,
            "EMPLOYEE",
            &employee.employee_id,
            actor,
            format!("Saved employee '{}'", employee.name),
        );

        Ok(employee)
    }

    pub fn list_employees(&self, include_inactive: bool) -> ApiResult<Vec<Employee>> {
        Ok(self.competency_repo.list_employees(include_inactive)?)
    }

    // ==========================================
    // Competencies
    // ==========================================

    pub fn save_competency(&self, input: CompetencyInput, actor: &str) -> ApiResult<Competency> {
        validate_id("employee_id", &input.employee_id)?;
        validate_required_text("title", &input.title, MAX_TITLE_LEN)?;
        validate_optional_text("category", input.category.as_deref(), MAX_TITLE_LEN)?;

        if self
            .competency_repo
            .find_employee(&input.employee_id)?
            .is_none()
        {
            return Err(ApiError::NotFound(format!(
                "Employee (id={}) does not exist",
                input.employee_id
            )));
        }
        if let (Some(issued), Some(expiry)) = (input.issued_date, input.expiry_date) {
            if expiry < issued {
                return Err(ApiError::ValidationError(
                    "expiry_date is before issued_date".to_string(),
                ));
            }
        }

        let competency = Competency {
            competency_id: input
                .competency_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            employee_id: input.employee_id,
            title: input.title,
            category: input.category,
            issued_date: input.issued_date,
            expiry_date: input.expiry_date,
            certificate_ref: input.certificate_ref,
            created_at: Utc::now().naive_utc(),
        };
        self.competency_repo.upsert_competency(&competency)?;

        self.log(
            ActionType::CompetencySaved,
            "COMPETENCY",
            &competency.competency_id,
            actor,
            format!("Saved competency '{}'", competency.title),
        );

        Ok(competency)
    }

    pub fn delete_competency(&self, competency_id: &str, actor: &str) -> ApiResult<()> {
        validate_id("competency_id", competency_id)?;
        let deleted = self.competency_repo.delete_competency(competency_id)?;
        if deleted == 0 {
            return Err(ApiError::NotFound(format!(
                "Competency (id={}) does not exist",
                competency_id
            )));
        }

        self.log(
            ActionType::CompetencyDeleted,
            "COMPETENCY",
            competency_id,
            actor,
            "Deleted competency".to_string(),
        );
        Ok(())
    }

    // ==========================================
    // Derived views
    // ==========================================

    /// One employee with statuses derived relative to `today`.
    pub fn get_employee_overview(
        &self,
        employee_id: &str,
        today: NaiveDate,
    ) -> ApiResult<EmployeeOverview> {
        validate_id("employee_id", employee_id)?;

        let employee = self
            .competency_repo
            .find_employee(employee_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Employee (id={}) does not exist", employee_id))
            })?;

        let engine = self.status_engine();
        let competencies: Vec<CompetencyWithStatus> = self
            .competency_repo
            .list_competencies_for_employee(employee_id)?
            .into_iter()
            .map(|competency| {
                let status = engine.classify(competency.expiry_date, today);
                CompetencyWithStatus { competency, status }
            })
            .collect();

        // Worst = Expired > ExpiringSoon > Valid.
        let worst_status = competencies
            .iter()
            .map(|c| c.status)
            .max_by_key(|s| match s {
                CompetencyStatus::Valid => 0,
                CompetencyStatus::ExpiringSoon => 1,
                CompetencyStatus::Expired => 2,
            });

        Ok(EmployeeOverview {
            employee,
            competencies,
            worst_status,
        })
    }

    /// Competencies that are expired or inside the warning window, soonest
    /// first.
    pub fn list_expiring(&self, today: NaiveDate) -> ApiResult<Vec<CompetencyWithStatus>> {
        let engine = self.status_engine();
        let warning_days = self.config.get_competency_warning_days().unwrap_or(90);
        let cutoff = today + Duration::days(warning_days);

        let expiring = self
            .competency_repo
            .list_expiring_on_or_before(cutoff)?
            .into_iter()
            .map(|competency| {
                let status = engine.classify(competency.expiry_date, today);
                CompetencyWithStatus { competency, status }
            })
            .collect();

        Ok(expiring)
    }

    // ==========================================
    // Helpers
    // ==========================================

    fn log(
        &self,
        action_type: ActionType,
        entity_kind: &str,
        entity_id: &str,
        actor: &str,
        summary: String,
    ) {
        let entry = ActionLog::new(action_type, entity_kind, entity_id, actor, summary);
        if let Err(e) = self.action_log_repo.insert(&entry) {
            tracing::warn!(error = %e, "failed to write action log entry");
        }
    }
}
