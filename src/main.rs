// ==========================================
// HMS Manager - headless entry point
// ==========================================
// Opens (and if needed creates) the database, wires the application state
// and prints a dashboard summary. The UI layer is a separate deliverable;
// this binary exists for bootstrap, smoke checks and cron-style use.
// ==========================================

use chrono::Utc;
use hms_manager::app::{get_default_db_path, AppState};

fn main() {
    hms_manager::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", hms_manager::APP_NAME);
    tracing::info!("version: {}", hms_manager::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("database: {}", db_path);

    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("AppState initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    let today = Utc::now().date_naive();
    match app_state.dashboard_api.get_overview(today) {
        Ok(overview) => {
            tracing::info!(
                open_measures = overview.open_measure_count,
                high_risk_hazards = overview.high_risk_hazard_count,
                sja_awaiting_approval = overview.sja_awaiting_approval_count,
                expired_competencies = overview.expired_competency_count,
                expiring_competencies = overview.expiring_competency_count,
                "dashboard overview"
            );
        }
        Err(e) => {
            tracing::error!("unable to read dashboard overview: {}", e);
            std::process::exit(1);
        }
    }
}
