// ==========================================
// HMS Manager - Safe Job Analysis (SJA) domain model
// ==========================================
// An SJA is a pre-task risk review. It carries its own hazard rows (same
// 1-5 rating axes as the risk matrix) and optionally a persisted weather
// snapshot so a historical report shows the forecast as it was when the
// record was created.
// ==========================================

use crate::domain::types::{RiskLevel, SjaStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// SjaRecord
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SjaRecord {
    pub sja_id: String,
    pub title: String,
    pub work_description: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub planned_date: Option<NaiveDate>,
    pub status: SjaStatus,
    pub created_by: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<NaiveDateTime>,
    /// Aggregated daily forecast captured at snapshot time, stored as JSON.
    pub weather_snapshot_json: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl SjaRecord {
    /// Whether the record can still be edited. Approved and archived
    /// records are read-only.
    pub fn is_editable(&self) -> bool {
        matches!(self.status, SjaStatus::Draft | SjaStatus::Rejected)
    }
}

// ==========================================
// SjaHazard
// ==========================================
// Same rating semantics as the risk-matrix hazard; scored by the same
// shared risk scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SjaHazard {
    pub sja_hazard_id: String,
    pub sja_id: String,
    pub description: String,
    pub probability: i32,
    pub severity: i32,
    pub risk_value: i32,
    pub risk_level: RiskLevel,
    pub mitigation: Option<String>,
}
