// ==========================================
// HMS Manager - domain layer
// ==========================================

pub mod action_log;
pub mod competency;
pub mod handbook;
pub mod risk_assessment;
pub mod sja;
pub mod types;
pub mod weather;

pub use action_log::{ActionLog, ActionType};
pub use competency::{Competency, Employee};
pub use handbook::{Handbook, Section, SectionVersion};
pub use risk_assessment::{AssessmentSummary, Hazard, Measure, RiskAssessment};
pub use sja::{SjaHazard, SjaRecord};
pub use weather::{DailyForecastSummary, ForecastContext, ForecastSample, StoredWeatherSnapshot};
