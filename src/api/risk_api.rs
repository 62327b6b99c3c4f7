// ==========================================
// HMS Manager - risk assessment API
// ==========================================
// Responsibility: assessment/hazard/measure CRUD. The stored risk value
// and level are recomputed from probability x severity on every hazard
// write; client-supplied derived values are never trusted, so the stored
// column can never drift from its factors.
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    validate_id, validate_optional_text, validate_required_text, MAX_TEXT_LEN, MAX_TITLE_LEN,
};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::risk_assessment::{AssessmentSummary, Hazard, Measure, RiskAssessment};
use crate::domain::types::{AssessmentStatus, MeasureStatus};
use crate::engine::risk::RiskScoreEngine;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::risk_repo::RiskAssessmentRepository;

// ==========================================
// Inputs
// ==========================================

/// Hazard form payload. Note the absence of risk_value/risk_level: the
/// derived fields are computed here, never accepted from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardInput {
    /// None for a new hazard, Some(id) for an update.
    pub hazard_id: Option<String>,
    pub assessment_id: String,
    pub description: String,
    pub probability: i32,
    pub severity: i32,
    pub existing_controls: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureInput {
    pub measure_id: Option<String>,
    pub hazard_id: String,
    pub description: String,
    pub responsible: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: MeasureStatus,
}

// ==========================================
// RiskApi
// ==========================================
pub struct RiskApi {
    risk_repo: Arc<RiskAssessmentRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    risk_engine: RiskScoreEngine,
}

impl RiskApi {
    pub fn new(
        risk_repo: Arc<RiskAssessmentRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            risk_repo,
            action_log_repo,
            risk_engine: RiskScoreEngine::new(),
        }
    }

    // ==========================================
    // Assessments
    // ==========================================

    pub fn create_assessment(
        &self,
        title: &str,
        area: Option<&str>,
        created_by: &str,
    ) -> ApiResult<RiskAssessment> {
        validate_required_text("title", title, MAX_TITLE_LEN)?;
        validate_optional_text("area", area, MAX_TITLE_LEN)?;
        validate_id("created_by", created_by)?;

        let now = Utc::now().naive_utc();
        let assessment = RiskAssessment {
            assessment_id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            area: area.map(|s| s.to_string()),
            status: AssessmentStatus::Draft,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.risk_repo.insert_assessment(&assessment)?;

        self.log(
            ActionType::AssessmentCreated,
            "ASSESSMENT",
            &assessment.assessment_id,
            created_by,
            format!("Created risk assessment '{}'", assessment.title),
        );

        Ok(assessment)
    }

    pub fn set_assessment_status(
        &self,
        assessment_id: &str,
        status: AssessmentStatus,
        actor: &str,
    ) -> ApiResult<RiskAssessment> {
        validate_id("assessment_id", assessment_id)?;

        let mut assessment = self.require_assessment(assessment_id)?;
        assessment.status = status;
        assessment.updated_at = Utc::now().naive_utc();
        self.risk_repo.update_assessment(&assessment)?;

        self.log(
            ActionType::AssessmentUpdated,
            "ASSESSMENT",
            assessment_id,
            actor,
            format!("Set status to {}", status.to_db_str()),
        );

        Ok(assessment)
    }

    pub fn get_assessment(&self, assessment_id: &str) -> ApiResult<Option<RiskAssessment>> {
        validate_id("assessment_id", assessment_id)?;
        Ok(self.risk_repo.find_assessment(assessment_id)?)
    }

    pub fn list_assessments(&self) -> ApiResult<Vec<RiskAssessment>> {
        Ok(self.risk_repo.list_assessments()?)
    }

    /// Aggregate view for the assessment list.
    pub fn get_assessment_summary(&self, assessment_id: &str) -> ApiResult<AssessmentSummary> {
        let assessment = self.require_assessment(assessment_id)?;
        let hazards = self.risk_repo.list_hazards(assessment_id)?;
        let open_measures = self
            .risk_repo
            .count_open_measures_for_assessment(assessment_id)?;

        Ok(AssessmentSummary {
            assessment_id: assessment.assessment_id,
            title: assessment.title,
            status: assessment.status,
            hazard_count: hazards.len(),
            highest_risk_level: hazards.iter().map(|h| h.risk_level).max(),
            open_measure_count: open_measures as usize,
        })
    }

    // ==========================================
    // Hazards
    // ==========================================

    /// Create or update a hazard. Probability and severity are validated
    /// (1-5, rejected when outside) and the risk score is recomputed here.
    pub fn save_hazard(&self, input: HazardInput, actor: &str) -> ApiResult<Hazard> {
        validate_id("assessment_id", &input.assessment_id)?;
        validate_required_text("description", &input.description, MAX_TEXT_LEN)?;
        validate_optional_text("existing_controls", input.existing_controls.as_deref(), MAX_TEXT_LEN)?;

        self.require_assessment(&input.assessment_id)?;

        // The write boundary: derived fields come from the shared scorer.
        let score = self.risk_engine.score(input.probability, input.severity)?;

        let now = Utc::now().naive_utc();
        let hazard = match input.hazard_id {
            Some(ref hazard_id) => {
                let existing = self.risk_repo.find_hazard(hazard_id)?.ok_or_else(|| {
                    ApiError::NotFound(format!("Hazard (id={}) does not exist", hazard_id))
                })?;
                if existing.assessment_id != input.assessment_id {
                    return Err(ApiError::BusinessRuleViolation(
                        "hazard belongs to a different assessment".to_string(),
                    ));
                }
                Hazard {
                    hazard_id: hazard_id.clone(),
                    assessment_id: input.assessment_id,
                    description: input.description,
                    probability: input.probability,
                    severity: input.severity,
                    risk_value: score.value,
                    risk_level: score.level,
                    existing_controls: input.existing_controls,
                    created_at: existing.created_at,
                    updated_at: now,
                }
            }
            None => Hazard {
                hazard_id: Uuid::new_v4().to_string(),
                assessment_id: input.assessment_id,
                description: input.description,
                probability: input.probability,
                severity: input.severity,
                risk_value: score.value,
                risk_level: score.level,
                existing_controls: input.existing_controls,
                created_at: now,
                updated_at: now,
            },
        };

        self.risk_repo.upsert_hazard(&hazard)?;
        self.touch_assessment(&hazard.assessment_id)?;

        self.log(
            ActionType::HazardSaved,
            "HAZARD",
            &hazard.hazard_id,
            actor,
            format!(
                "Saved hazard ({}x{} = {} {})",
                hazard.probability, hazard.severity, hazard.risk_value, hazard.risk_level
            ),
        );
        info!(hazard_id = %hazard.hazard_id, risk_value = hazard.risk_value, "hazard saved");

        Ok(hazard)
    }

    pub fn list_hazards(&self, assessment_id: &str) -> ApiResult<Vec<Hazard>> {
        validate_id("assessment_id", assessment_id)?;
        Ok(self.risk_repo.list_hazards(assessment_id)?)
    }

    pub fn delete_hazard(&self, hazard_id: &str, actor: &str) -> ApiResult<()> {
        validate_id("hazard_id", hazard_id)?;

        let hazard = self.risk_repo.find_hazard(hazard_id)?.ok_or_else(|| {
            ApiError::NotFound(format!("Hazard (id={}) does not exist", hazard_id))
        })?;

        self.risk_repo.delete_hazard(hazard_id)?;
        self.touch_assessment(&hazard.assessment_id)?;

        self.log(
            ActionType::HazardDeleted,
            "HAZARD",
            hazard_id,
            actor,
            format!("Deleted hazard '{}'", hazard.description),
        );

        Ok(())
    }

    // ==========================================
    // Measures
    // ==========================================

    pub fn save_measure(&self, input: MeasureInput, actor: &str) -> ApiResult<Measure> {
        validate_id("hazard_id", &input.hazard_id)?;
        validate_required_text("description", &input.description, MAX_TEXT_LEN)?;

        if self.risk_repo.find_hazard(&input.hazard_id)?.is_none() {
            return Err(ApiError::NotFound(format!(
                "Hazard (id={}) does not exist",
                input.hazard_id
            )));
        }

        let now = Utc::now().naive_utc();
        let measure = match input.measure_id {
            Some(ref measure_id) => {
                let existing = self.risk_repo.find_measure(measure_id)?.ok_or_else(|| {
                    ApiError::NotFound(format!("Measure (id={}) does not exist", measure_id))
                })?;
                Measure {
                    measure_id: measure_id.clone(),
                    hazard_id: input.hazard_id,
                    description: input.description,
                    responsible: input.responsible,
                    due_date: input.due_date,
                    status: input.status,
                    completed_at: match input.status {
                        MeasureStatus::Done => existing.completed_at.or(Some(now)),
                        _ => None,
                    },
                    created_at: existing.created_at,
                }
            }
            None => Measure {
                measure_id: Uuid::new_v4().to_string(),
                hazard_id: input.hazard_id,
                description: input.description,
                responsible: input.responsible,
                due_date: input.due_date,
                status: input.status,
                completed_at: match input.status {
                    MeasureStatus::Done => Some(now),
                    _ => None,
                },
                created_at: now,
            },
        };

        self.risk_repo.upsert_measure(&measure)?;

        let action_type = if measure.status == MeasureStatus::Done {
            ActionType::MeasureCompleted
        } else {
            ActionType::MeasureSaved
        };
        self.log(
            action_type,
            "MEASURE",
            &measure.measure_id,
            actor,
            format!("Saved measure '{}'", measure.description),
        );

        Ok(measure)
    }

    pub fn list_measures(&self, hazard_id: &str) -> ApiResult<Vec<Measure>> {
        validate_id("hazard_id", hazard_id)?;
        Ok(self.risk_repo.list_measures(hazard_id)?)
    }

    // ==========================================
    // Helpers
    // ==========================================

    fn require_assessment(&self, assessment_id: &str) -> ApiResult<RiskAssessment> {
        self.risk_repo
            .find_assessment(assessment_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "RiskAssessment (id={}) does not exist",
                    assessment_id
                ))
            })
    }

    fn touch_assessment(&self, assessment_id: &str) -> ApiResult<()> {
        if let Some(mut assessment) = self.risk_repo.find_assessment(assessment_id)? {
            assessment.updated_at = Utc::now().naive_utc();
            self.risk_repo.update_assessment(&assessment)?;
        }
        Ok(())
    }

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
