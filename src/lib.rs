// ==========================================
// HMS Manager - core library
// ==========================================
// HSE management backend: HMS handbooks with versioned sections, risk
// assessments, Safe Job Analysis with weather overlays, and employee
// competency tracking.
// Stack: Rust + SQLite
// ==========================================

// Internationalization (Norwegian Bokmål default)
rust_i18n::i18n!("locales", fallback = "nb-NO");

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - business rules
pub mod engine;

// Import layer - external files
pub mod importer;

// Weather - forecast client and wire types
pub mod weather;

// Configuration layer
pub mod config;

// Database infrastructure (connection init / PRAGMAs / schema)
pub mod db;

// Logging
pub mod logging;

// Internationalization helpers
pub mod i18n;

// API layer - service interfaces
pub mod api;

// Application layer - state wiring
pub mod app;

// ==========================================
// Re-exports
// ==========================================

// Domain types
pub use domain::types::{
    AssessmentStatus, CompetencyStatus, MeasureStatus, RiskLevel, SjaStatus,
};

// Domain entities
pub use domain::{
    ActionLog, ActionType, Competency, DailyForecastSummary, Employee, ForecastContext,
    ForecastSample, Handbook, Hazard, Measure, RiskAssessment, Section, SectionVersion,
    SjaHazard, SjaRecord, StoredWeatherSnapshot,
};

// Engines
pub use engine::{
    CompetencyStatusEngine, ForecastAggregator, RiskScore, RiskScoreEngine, SectionSearchEngine,
};

// API
pub use api::{
    CompetencyApi, DashboardApi, HandbookApi, RiskApi, SjaApi, WeatherApi,
};

// ==========================================
// Constants
// ==========================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "HMS Manager";
