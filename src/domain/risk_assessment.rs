// ==========================================
// HMS Manager - risk assessment domain model
// ==========================================
// A risk assessment groups hazards; each hazard carries probability and
// severity ratings (1-5) plus the derived risk value/level, and can have
// follow-up measures.
// ==========================================

use crate::domain::types::{AssessmentStatus, MeasureStatus, RiskLevel};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// RiskAssessment
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub assessment_id: String,
    pub title: String,
    pub area: Option<String>,
    pub status: AssessmentStatus,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// ==========================================
// Hazard
// ==========================================
// risk_value/risk_level are stored redundantly for reporting queries but
// are always recomputed from probability x severity at the write boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub hazard_id: String,
    pub assessment_id: String,
    pub description: String,
    pub probability: i32,
    pub severity: i32,
    pub risk_value: i32,
    pub risk_level: RiskLevel,
    pub existing_controls: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// ==========================================
// Measure - follow-up action for a hazard
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measure {
    pub measure_id: String,
    pub hazard_id: String,
    pub description: String,
    pub responsible: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: MeasureStatus,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Measure {
    /// A measure is overdue when it has a due date in the past and is not
    /// done.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match (self.status, self.due_date) {
            (MeasureStatus::Done, _) => false,
            (_, Some(due)) => due < today,
            (_, None) => false,
        }
    }
}

// ==========================================
// AssessmentSummary - aggregate view for listings
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub assessment_id: String,
    pub title: String,
    pub status: AssessmentStatus,
    pub hazard_count: usize,
    /// Highest risk level among the hazards, None when there are no hazards.
    pub highest_risk_level: Option<RiskLevel>,
    pub open_measure_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure(status: MeasureStatus, due: Option<NaiveDate>) -> Measure {
        Measure {
            measure_id: "M1".to_string(),
            hazard_id: "F1".to_string(),
            description: "Install guard rail".to_string(),
            responsible: None,
            due_date: due,
            status,
            completed_at: None,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_measure_overdue() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let past = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let future = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();

        assert!(measure(MeasureStatus::Planned, Some(past)).is_overdue(today));
        assert!(!measure(MeasureStatus::Planned, Some(future)).is_overdue(today));
        assert!(!measure(MeasureStatus::Done, Some(past)).is_overdue(today));
        assert!(!measure(MeasureStatus::InProgress, None).is_overdue(today));
    }
}
