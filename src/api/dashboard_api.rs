// ==========================================
// HMS Manager - dashboard API
// ==========================================
// Responsibility: the read-only overview numbers and the recent-activity
// feed. No mutations.
// ==========================================

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::config::ConfigManager;
use crate::domain::action_log::ActionLog;
use crate::domain::types::{CompetencyStatus, RiskLevel, SjaStatus};
use crate::engine::competency::CompetencyStatusEngine;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::competency_repo::CompetencyRepository;
use crate::repository::risk_repo::RiskAssessmentRepository;
use crate::repository::sja_repo::SjaRepository;

// ==========================================
// DashboardOverview
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub open_measure_count: i64,
    pub high_risk_hazard_count: usize,
    pub sja_awaiting_approval_count: usize,
    pub expired_competency_count: usize,
    pub expiring_competency_count: usize,
    pub recent_actions: Vec<ActionLog>,
}

// ==========================================
// DashboardApi
// ==========================================
pub struct DashboardApi {
    risk_repo: Arc<RiskAssessmentRepository>,
    sja_repo: Arc<SjaRepository>,
    competency_repo: Arc<CompetencyRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<ConfigManager>,
}

impl DashboardApi {
    pub fn new(
        risk_repo: Arc<RiskAssessmentRepository>,
        sja_repo: Arc<SjaRepository>,
        competency_repo: Arc<CompetencyRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            risk_repo,
            sja_repo,
            competency_repo,
            action_log_repo,
            config,
        }
    }

    /// The numbers behind the dashboard cards, relative to `today`.
    pub fn get_overview(&self, today: NaiveDate) -> ApiResult<DashboardOverview> {
        let open_measure_count = self.risk_repo.count_open_measures()?;
        let high_risk_hazard_count = self.risk_repo.list_hazards_by_level(RiskLevel::High)?.len();
        let sja_awaiting_approval_count = self
            .sja_repo
            .list_records_by_status(SjaStatus::AwaitingApproval)?
            .len();

        let warning_days = self.config.get_competency_warning_days().unwrap_or(90);
        let engine = CompetencyStatusEngine::with_warning_days(warning_days);
        let cutoff = today + Duration::days(warning_days);

        let mut expired_competency_count = 0;
        let mut expiring_competency_count = 0;
        for competency in self.competency_repo.list_expiring_on_or_before(cutoff)? {
            match engine.classify(competency.expiry_date, today) {
                CompetencyStatus::Expired => expired_competency_count += 1,
                CompetencyStatus::ExpiringSoon => expiring_competency_count += 1,
                CompetencyStatus::Valid => {}
            }
        }

        let feed_limit = self.config.get_dashboard_feed_limit().unwrap_or(20);
        let recent_actions = self.action_log_repo.list_recent(feed_limit)?;

        Ok(DashboardOverview {
            open_measure_count,
            high_risk_hazard_count,
            sja_awaiting_approval_count,
            expired_competency_count,
            expiring_competency_count,
            recent_actions,
        })
    }
}
