// ==========================================
// HMS Manager - SJA API
// ==========================================
// Responsibility: SJA record/hazard CRUD, the approval workflow and the
// weather snapshot. SJA hazards go through the same shared risk scorer
// as the risk-matrix hazards.
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    validate_coordinates, validate_id, validate_optional_text, validate_required_text,
    MAX_TEXT_LEN, MAX_TITLE_LEN,
};
use crate::api::weather_api::WeatherApi;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::sja::{SjaHazard, SjaRecord};
use crate::domain::types::SjaStatus;
use crate::domain::weather::{ForecastContext, StoredWeatherSnapshot};
use crate::engine::risk::RiskScoreEngine;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::sja_repo::SjaRepository;

// ==========================================
// Inputs
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SjaInput {
    pub title: String,
    pub work_description: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub planned_date: Option<NaiveDate>,
}

/// SJA hazard payload; derived risk fields are computed server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SjaHazardInput {
    pub sja_hazard_id: Option<String>,
    pub sja_id: String,
    pub description: String,
    pub probability: i32,
    pub severity: i32,
    pub mitigation: Option<String>,
}

// ==========================================
// SjaApi
// ==========================================
pub struct SjaApi {
    sja_repo: Arc<SjaRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    weather_api: Arc<WeatherApi>,
    risk_engine: RiskScoreEngine,
}

impl SjaApi {
    pub fn new(
        sja_repo: Arc<SjaRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        weather_api: Arc<WeatherApi>,
    ) -> Self {
        Self {
            sja_repo,
            action_log_repo,
            weather_api,
            risk_engine: RiskScoreEngine::new(),
        }
    }

    // ==========================================
    // Records
    // ==========================================

    pub fn create_sja(&self, input: SjaInput, actor: &str) -> ApiResult<SjaRecord> {
        self.validate_input(&input)?;
        validate_id("actor", actor)?;

        let now = Utc::now().naive_utc();
        let record = SjaRecord {
            sja_id: Uuid::new_v4().to_string(),
            title: input.title,
            work_description: input.work_description,
            location: input.location,
            latitude: input.latitude,
            longitude: input.longitude,
            planned_date: input.planned_date,
            status: SjaStatus::Draft,
            created_by: actor.to_string(),
            approved_by: None,
            approved_at: None,
            weather_snapshot_json: None,
            created_at: now,
            updated_at: now,
        };
        self.sja_repo.insert_record(&record)?;

        self.log(
            ActionType::SjaCreated,
            &record.sja_id,
            actor,
            format!("Created SJA '{}'", record.title),
        );
        info!(sja_id = %record.sja_id, "SJA created");

        Ok(record)
    }

    /// Update the editable fields. Only DRAFT and REJECTED records can be
    /// edited.
    pub fn update_sja(&self, sja_id: &str, input: SjaInput, actor: &str) -> ApiResult<SjaRecord> {
        validate_id("sja_id", sja_id)?;
        self.validate_input(&input)?;

        let mut record = self.require_record(sja_id)?;
        if !record.is_editable() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "SJA in status {} is read-only",
                record.status
            )));
        }

        record.title = input.title;
        record.work_description = input.work_description;
        record.location = input.location;
        record.latitude = input.latitude;
        record.longitude = input.longitude;
        record.planned_date = input.planned_date;
        record.updated_at = Utc::now().naive_utc();
        self.sja_repo.update_record(&record)?;

        self.log(
            ActionType::SjaUpdated,
            sja_id,
            actor,
            format!("Updated SJA '{}'", record.title),
        );

        Ok(record)
    }

    pub fn get_sja(&self, sja_id: &str) -> ApiResult<Option<SjaRecord>> {
        validate_id("sja_id", sja_id)?;
        Ok(self.sja_repo.find_record(sja_id)?)
    }

    pub fn list_sjas(&self) -> ApiResult<Vec<SjaRecord>> {
        Ok(self.sja_repo.list_records()?)
    }

    pub fn list_sjas_by_status(&self, status: SjaStatus) -> ApiResult<Vec<SjaRecord>> {
        Ok(self.sja_repo.list_records_by_status(status)?)
    }

    // ==========================================
    // Approval workflow
    // ==========================================

    /// Move a record along the approval workflow. Illegal transitions are
    /// rejected with the from/to pair in the error.
    pub fn transition_status(
        &self,
        sja_id: &str,
        to: SjaStatus,
        actor: &str,
    ) -> ApiResult<SjaRecord> {
        validate_id("sja_id", sja_id)?;
        validate_id("actor", actor)?;

        let mut record = self.require_record(sja_id)?;
        if !record.status.can_transition_to(to) {
            return Err(ApiError::InvalidStateTransition {
                from: record.status.to_db_str().to_string(),
                to: to.to_db_str().to_string(),
            });
        }

        let now = Utc::now().naive_utc();
        match to {
            SjaStatus::Approved => {
                record.approved_by = Some(actor.to_string());
                record.approved_at = Some(now);
            }
            SjaStatus::Draft => {
                // Back to rework: the previous approval no longer applies.
                record.approved_by = None;
                record.approved_at = None;
            }
            _ => {}
        }
        let from = record.status;
        record.status = to;
        record.updated_at = now;
        self.sja_repo.update_record(&record)?;

        self.log(
            ActionType::SjaStatusChanged,
            sja_id,
            actor,
            format!("Status {} -> {}", from.to_db_str(), to.to_db_str()),
        );
        info!(sja_id = %sja_id, from = %from, to = %to, "SJA status changed");

        Ok(record)
    }

    // ==========================================
    // Hazards
    // ==========================================

    pub fn save_hazard(&self, input: SjaHazardInput, actor: &str) -> ApiResult<SjaHazard> {
        validate_id("sja_id", &input.sja_id)?;
        validate_required_text("description", &input.description, MAX_TEXT_LEN)?;
        validate_optional_text("mitigation", input.mitigation.as_deref(), MAX_TEXT_LEN)?;

        let record = self.require_record(&input.sja_id)?;
        if !record.is_editable() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "SJA in status {} is read-only",
                record.status
            )));
        }

        // Same scorer as the risk matrix; rejects out-of-range ratings.
        let score = self.risk_engine.score(input.probability, input.severity)?;

        let hazard = SjaHazard {
            sja_hazard_id: input
                .sja_hazard_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            sja_id: input.sja_id,
            description: input.description,
            probability: input.probability,
            severity: input.severity,
            risk_value: score.value,
            risk_level: score.level,
            mitigation: input.mitigation,
        };
        self.sja_repo.upsert_hazard(&hazard)?;

        self.log(
            ActionType::SjaUpdated,
            &hazard.sja_id,
            actor,
            format!(
                "Saved SJA hazard ({}x{} = {} {})",
                hazard.probability, hazard.severity, hazard.risk_value, hazard.risk_level
            ),
        );

        Ok(hazard)
    }

    pub fn list_hazards(&self, sja_id: &str) -> ApiResult<Vec<SjaHazard>> {
        validate_id("sja_id", sja_id)?;
        Ok(self.sja_repo.list_hazards(sja_id)?)
    }

    pub fn delete_hazard(&self, sja_hazard_id: &str, actor: &str) -> ApiResult<()> {
        validate_id("sja_hazard_id", sja_hazard_id)?;
        let deleted = self.sja_repo.delete_hazard(sja_hazard_id)?;
        if deleted == 0 {
            return Err(ApiError::NotFound(format!(
                "SjaHazard (id={}) does not exist",
                sja_hazard_id
            )));
        }

        self.log(
            ActionType::SjaUpdated,
            sja_hazard_id,
            actor,
            "Deleted SJA hazard".to_string(),
        );
        Ok(())
    }

    // ==========================================
    // Weather
    // ==========================================

    /// Fetch the current forecast for the record's position and persist it
    /// as the record's snapshot. Requires coordinates on the record.
    pub async fn capture_weather_snapshot(
        &self,
        sja_id: &str,
        actor: &str,
    ) -> ApiResult<ForecastContext> {
        validate_id("sja_id", sja_id)?;

        let mut record = self.require_record(sja_id)?;
        let (lat, lon) = match (record.latitude, record.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(ApiError::BusinessRuleViolation(
                    "SJA has no coordinates to fetch a forecast for".to_string(),
                ))
            }
        };

        let days = self.weather_api.get_daily_forecast(lat, lon).await?;
        let snapshot = StoredWeatherSnapshot {
            captured_at: Utc::now(),
            days,
        };

        record.weather_snapshot_json = Some(
            serde_json::to_string(&snapshot)
                .map_err(|e| ApiError::InternalError(format!("snapshot encoding failed: {}", e)))?,
        );
        record.updated_at = Utc::now().naive_utc();
        self.sja_repo.update_record(&record)?;

        self.log(
            ActionType::SjaWeatherCaptured,
            sja_id,
            actor,
            format!("Captured weather snapshot ({} days)", snapshot.days.len()),
        );

        Ok(snapshot.into_context())
    }

    /// The forecast for a record: the persisted snapshot when one exists,
    /// otherwise a live fetch (when the record has coordinates). Returns
    /// None for records without snapshot and without coordinates.
    pub async fn forecast_context(&self, sja_id: &str) -> ApiResult<Option<ForecastContext>> {
        validate_id("sja_id", sja_id)?;
        let record = self.require_record(sja_id)?;

        // The snapshot wins: historical reports must show the forecast as
        // it was at capture time.
        if let Some(ref json) = record.weather_snapshot_json {
            let snapshot: StoredWeatherSnapshot = serde_json::from_str(json)
                .map_err(|e| ApiError::InternalError(format!("snapshot decoding failed: {}", e)))?;
            return Ok(Some(snapshot.into_context()));
        }

        match (record.latitude, record.longitude) {
            (Some(lat), Some(lon)) => {
                let days = self.weather_api.get_daily_forecast(lat, lon).await?;
                Ok(Some(ForecastContext::Live {
                    fetched_at: Utc::now(),
                    days,
                }))
            }
            _ => Ok(None),
        }
    }

    // ==========================================
    // Helpers
    // ==========================================

    fn validate_input(&self, input: &SjaInput) -> ApiResult<()> {
        validate_required_text("title", &input.title, MAX_TITLE_LEN)?;
        validate_optional_text("work_description", Some(&input.work_description), MAX_TEXT_LEN)?;
        validate_optional_text("location", input.location.as_deref(), MAX_TITLE_LEN)?;
        match (input.latitude, input.longitude) {
            (Some(lat), Some(lon)) => validate_coordinates(lat, lon)?,
            (None, None) => {}
            _ => {
                return Err(ApiError::InvalidInput(
                    "latitude and longitude must be given together".to_string(),
                ))
            }
        }
        Ok(())
    }

    fn require_record(&self, sja_id: &str) -> ApiResult<SjaRecord> {
        self.sja_repo.find_record(sja_id)?.ok_or_else(|| {
            ApiError::NotFound(format!("SjaRecord (id={}) does not exist", sja_id))
        })
    }

    fn log(&self, action_type: ActionType, entity_id: &str, actor: &str, summary: String) {
        let entry = ActionLog::new(action_type, "SJA", entity_id, actor, summary);
        if let Err(e) = self.action_log_repo.insert(&entry) {
            tracing::warn!(error = %e, "failed to write action log entry");
        }
    }
}
