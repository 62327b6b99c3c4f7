// ==========================================
// HMS Manager - weather domain model
// ==========================================
// ForecastSample is the normalized in-memory shape of one timeseries entry
// from the forecast API. DailyForecastSummary is the aggregated per-day
// view shown in the weather widget and embedded in SJA snapshots.
// ==========================================

use crate::domain::types::RiskLevel;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Symbol used when no sample of a day carries any icon information.
pub const DEFAULT_SYMBOL_CODE: &str = "clearsky_day";

// ==========================================
// ForecastSample
// ==========================================
// Optional fields mirror the upstream API: a sample can carry a 1-hour
// block, a 6-hour block, both, or neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    /// Instantaneous air temperature (deg C).
    pub air_temperature: f64,
    /// Instantaneous wind speed (m/s).
    pub wind_speed: f64,
    /// Precipitation over the next hour (mm).
    pub precipitation_1h: Option<f64>,
    /// Precipitation over the next six hours (mm).
    pub precipitation_6h: Option<f64>,
    /// Symbol code for the next hour.
    pub symbol_1h: Option<String>,
    /// Symbol code for the next six hours.
    pub symbol_6h: Option<String>,
}

impl ForecastSample {
    /// Preferred symbol for this sample: the 1-hour symbol when present,
    /// else the 6-hour one.
    pub fn symbol(&self) -> Option<&str> {
        self.symbol_1h.as_deref().or(self.symbol_6h.as_deref())
    }
}

// ==========================================
// DailyForecastSummary
// ==========================================
// Derived, never persisted on its own; SJA records may embed a JSON copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastSummary {
    pub date: NaiveDate,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub max_wind_speed: f64,
    pub total_precipitation: f64,
    pub symbol_code: String,
    pub risk_level: RiskLevel,
}

// ==========================================
// ForecastContext
// ==========================================
// Explicit, typed choice between live data and a persisted snapshot.
// Callers must handle both; historical reports always prefer Snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForecastContext {
    Live {
        fetched_at: DateTime<Utc>,
        days: Vec<DailyForecastSummary>,
    },
    Snapshot {
        captured_at: DateTime<Utc>,
        days: Vec<DailyForecastSummary>,
    },
}

impl ForecastContext {
    pub fn days(&self) -> &[DailyForecastSummary] {
        match self {
            ForecastContext::Live { days, .. } => days,
            ForecastContext::Snapshot { days, .. } => days,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self, ForecastContext::Snapshot { .. })
    }
}

// ==========================================
// StoredWeatherSnapshot
// ==========================================
// Persisted JSON payload on an SJA record. Kept as its own struct (not the
// ForecastContext enum) so the stored format stays stable if the enum
// grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredWeatherSnapshot {
    pub captured_at: DateTime<Utc>,
    pub days: Vec<DailyForecastSummary>,
}

impl StoredWeatherSnapshot {
    pub fn into_context(self) -> ForecastContext {
        ForecastContext::Snapshot {
            captured_at: self.captured_at,
            days: self.days,
        }
    }
}
