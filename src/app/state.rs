// ==========================================
// HMS Manager - application state
// ==========================================
// Responsibility: open the shared connection, run schema init, wire
// repositories -> engines -> APIs. One instance per process.
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{
    CompetencyApi, DashboardApi, HandbookApi, RiskApi, SjaApi, WeatherApi,
};
use crate::config::ConfigManager;
use crate::db::{self, open_sqlite_connection};
use crate::importer::CompetencyImporter;
use crate::repository::{
    ActionLogRepository, CompetencyRepository, HandbookRepository, RiskAssessmentRepository,
    SjaRepository,
};
use crate::weather::{ForecastClient, ForecastProvider};

/// Application state: all API instances over one shared connection.
pub struct AppState {
    pub db_path: String,

    pub handbook_api: Arc<HandbookApi>,
    pub risk_api: Arc<RiskApi>,
    pub sja_api: Arc<SjaApi>,
    pub competency_api: Arc<CompetencyApi>,
    pub weather_api: Arc<WeatherApi>,
    pub dashboard_api: Arc<DashboardApi>,
    pub competency_importer: Arc<CompetencyImporter>,

    pub action_log_repo: Arc<ActionLogRepository>,
    pub config: Arc<ConfigManager>,
}

impl AppState {
    /// Wire everything against the given database file, with the real
    /// forecast client.
    pub fn new(db_path: String) -> Result<Self, String> {
        let client: Arc<dyn ForecastProvider> = Arc::new(ForecastClient::new());
        Self::with_forecast_provider(db_path, client)
    }

    /// Wiring with an injected forecast provider (tests use a stub).
    pub fn with_forecast_provider(
        db_path: String,
        forecast_provider: Arc<dyn ForecastProvider>,
    ) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "initializing AppState");

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("unable to open database: {}", e))?;
        db::init_schema(&conn).map_err(|e| format!("schema init failed: {}", e))?;

        match db::read_schema_version(&conn) {
            Ok(Some(version)) if version != db::CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    found = version,
                    expected = db::CURRENT_SCHEMA_VERSION,
                    "schema version mismatch"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "unable to read schema version"),
        }

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Repository layer
        // ==========================================
        let handbook_repo = Arc::new(HandbookRepository::from_connection(conn.clone()));
        let risk_repo = Arc::new(RiskAssessmentRepository::from_connection(conn.clone()));
        let sja_repo = Arc::new(SjaRepository::from_connection(conn.clone()));
        let competency_repo = Arc::new(CompetencyRepository::from_connection(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::from_connection(conn.clone()));

        let config = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("unable to create ConfigManager: {}", e))?,
        );

        // ==========================================
        // API layer
        // ==========================================
        let weather_api = Arc::new(WeatherApi::new(forecast_provider, config.clone()));

        let handbook_api = Arc::new(HandbookApi::new(
            handbook_repo,
            action_log_repo.clone(),
        ));

        let risk_api = Arc::new(RiskApi::new(risk_repo.clone(), action_log_repo.clone()));

        let sja_api = Arc::new(SjaApi::new(
            sja_repo.clone(),
            action_log_repo.clone(),
            weather_api.clone(),
        ));

        let competency_api = Arc::new(CompetencyApi::new(
            competency_repo.clone(),
            action_log_repo.clone(),
            config.clone(),
        ));

        let dashboard_api = Arc::new(DashboardApi::new(
            risk_repo,
            sja_repo,
            competency_repo.clone(),
            action_log_repo.clone(),
            config.clone(),
        ));

        let competency_importer = Arc::new(CompetencyImporter::new(
            competency_repo,
            action_log_repo.clone(),
        ));

        tracing::info!("AppState initialized");

        Ok(Self {
            db_path,
            handbook_api,
            risk_api,
            sja_api,
            competency_api,
            weather_api,
            dashboard_api,
            competency_importer,
            action_log_repo,
            config,
        })
    }

    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// Default database path
// ==========================================

/// Default database path.
///
/// Honors HMS_MANAGER_DB_PATH; otherwise the user data directory
/// (hms-manager-dev in debug builds, hms-manager in release), falling back
/// to ./hms_manager.db.
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("HMS_MANAGER_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./hms_manager.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("hms-manager-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("hms-manager");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("hms_manager.db");
    }

    path.to_string_lossy().to_string()
}
