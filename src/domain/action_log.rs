// ==========================================
// HMS Manager - audit log domain model
// ==========================================
// Every mutating API operation appends an entry; the log is append-only
// and read by the dashboard feed.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ActionType
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    SectionCreated,
    SectionUpdated,
    SectionDeleted,
    SectionPublished,
    AssessmentCreated,
    AssessmentUpdated,
    HazardSaved,
    HazardDeleted,
    MeasureSaved,
    MeasureCompleted,
    SjaCreated,
    SjaUpdated,
    SjaStatusChanged,
    SjaWeatherCaptured,
    EmployeeSaved,
    CompetencySaved,
    CompetencyDeleted,
    CompetencyImported,
    ConfigUpdated,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ActionType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ActionType::SectionCreated => "SECTION_CREATED",
            ActionType::SectionUpdated => "SECTION_UPDATED",
            ActionType::SectionDeleted => "SECTION_DELETED",
            ActionType::SectionPublished => "SECTION_PUBLISHED",
            ActionType::AssessmentCreated => "ASSESSMENT_CREATED",
            ActionType::AssessmentUpdated => "ASSESSMENT_UPDATED",
            ActionType::HazardSaved => "HAZARD_SAVED",
            ActionType::HazardDeleted => "HAZARD_DELETED",
            ActionType::MeasureSaved => "MEASURE_SAVED",
            ActionType::MeasureCompleted => "MEASURE_COMPLETED",
            ActionType::SjaCreated => "SJA_CREATED",
            ActionType::SjaUpdated => "SJA_UPDATED",
            ActionType::SjaStatusChanged => "SJA_STATUS_CHANGED",
            ActionType::SjaWeatherCaptured => "SJA_WEATHER_CAPTURED",
            ActionType::EmployeeSaved => "EMPLOYEE_SAVED",
            ActionType::CompetencySaved => "COMPETENCY_SAVED",
            ActionType::CompetencyDeleted => "COMPETENCY_DELETED",
            ActionType::CompetencyImported => "COMPETENCY_IMPORTED",
            ActionType::ConfigUpdated => "CONFIG_UPDATED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let t = match s.to_uppercase().as_str() {
            "SECTION_CREATED" => ActionType::SectionCreated,
            "SECTION_UPDATED" => ActionType::SectionUpdated,
            "SECTION_DELETED" => ActionType::SectionDeleted,
            "SECTION_PUBLISHED" => ActionType::SectionPublished,
            "ASSESSMENT_CREATED" => ActionType::AssessmentCreated,
            "ASSESSMENT_UPDATED" => ActionType::AssessmentUpdated,
            "HAZARD_SAVED" => ActionType::HazardSaved,
            "HAZARD_DELETED" => ActionType::HazardDeleted,
            "MEASURE_SAVED" => ActionType::MeasureSaved,
            "MEASURE_COMPLETED" => ActionType::MeasureCompleted,
            "SJA_CREATED" => ActionType::SjaCreated,
            "SJA_UPDATED" => ActionType::SjaUpdated,
            "SJA_STATUS_CHANGED" => ActionType::SjaStatusChanged,
            "SJA_WEATHER_CAPTURED" => ActionType::SjaWeatherCaptured,
            "EMPLOYEE_SAVED" => ActionType::EmployeeSaved,
            "COMPETENCY_SAVED" => ActionType::CompetencySaved,
            "COMPETENCY_DELETED" => ActionType::CompetencyDeleted,
            "COMPETENCY_IMPORTED" => ActionType::CompetencyImported,
            "CONFIG_UPDATED" => ActionType::ConfigUpdated,
            _ => return None,
        };
        Some(t)
    }
}

// ==========================================
// ActionLog
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,
    pub action_type: ActionType,
    /// Entity kind the action touched ("SECTION", "HAZARD", "SJA", ...).
    pub entity_kind: String,
    pub entity_id: String,
    pub actor: String,
    pub summary: String,
    pub action_ts: NaiveDateTime,
}

impl ActionLog {
    /// Build a new entry stamped with the current time.
    pub fn new(
        action_type: ActionType,
        entity_kind: &str,
        entity_id: &str,
        actor: &str,
        summary: String,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type,
            entity_kind: entity_kind.to_string(),
            entity_id: entity_id.to_string(),
            actor: actor.to_string(),
            summary,
            action_ts: chrono::Utc::now().naive_utc(),
        }
    }
}
