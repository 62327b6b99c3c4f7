// ==========================================
// HMS Manager - domain type definitions
// ==========================================
// Serialized form: SCREAMING_SNAKE_CASE (matches the database)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Risk level
// ==========================================
// One shared bucket type for the risk matrix (probability x severity) and
// the weather overlay. Order: Low < Medium < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

impl RiskLevel {
    /// Parse from a database string.
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "HIGH" => RiskLevel::High,
            "MEDIUM" => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    /// String stored in the database.
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

// ==========================================
// Risk assessment status
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentStatus {
    Draft,
    Completed,
    Archived,
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl AssessmentStatus {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "COMPLETED" => AssessmentStatus::Completed,
            "ARCHIVED" => AssessmentStatus::Archived,
            _ => AssessmentStatus::Draft,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Draft => "DRAFT",
            AssessmentStatus::Completed => "COMPLETED",
            AssessmentStatus::Archived => "ARCHIVED",
        }
    }
}

// ==========================================
// SJA status
// ==========================================
// Transitions: DRAFT -> AWAITING_APPROVAL -> (APPROVED | REJECTED),
// APPROVED -> ARCHIVED, REJECTED -> DRAFT (rework).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SjaStatus {
    Draft,
    AwaitingApproval,
    Approved,
    Rejected,
    Archived,
}

impl fmt::Display for SjaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl SjaStatus {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "AWAITING_APPROVAL" => SjaStatus::AwaitingApproval,
            "APPROVED" => SjaStatus::Approved,
            "REJECTED" => SjaStatus::Rejected,
            "ARCHIVED" => SjaStatus::Archived,
            _ => SjaStatus::Draft,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            SjaStatus::Draft => "DRAFT",
            SjaStatus::AwaitingApproval => "AWAITING_APPROVAL",
            SjaStatus::Approved => "APPROVED",
            SjaStatus::Rejected => "REJECTED",
            SjaStatus::Archived => "ARCHIVED",
        }
    }

    /// Whether the transition `self -> to` is allowed.
    pub fn can_transition_to(&self, to: SjaStatus) -> bool {
        use SjaStatus::*;
        matches!(
            (self, to),
            (Draft, AwaitingApproval)
                | (AwaitingApproval, Approved)
                | (AwaitingApproval, Rejected)
                | (Approved, Archived)
                | (Rejected, Draft)
        )
    }
}

// ==========================================
// Measure status
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasureStatus {
    Planned,
    InProgress,
    Done,
}

impl fmt::Display for MeasureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl MeasureStatus {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "IN_PROGRESS" => MeasureStatus::InProgress,
            "DONE" => MeasureStatus::Done,
            _ => MeasureStatus::Planned,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MeasureStatus::Planned => "PLANNED",
            MeasureStatus::InProgress => "IN_PROGRESS",
            MeasureStatus::Done => "DONE",
        }
    }
}

// ==========================================
// Competency status
// ==========================================
// Derived from the expiry date, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompetencyStatus {
    Valid,
    ExpiringSoon,
    Expired,
}

impl fmt::Display for CompetencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompetencyStatus::Valid => write!(f, "VALID"),
            CompetencyStatus::ExpiringSoon => write!(f, "EXPIRING_SOON"),
            CompetencyStatus::Expired => write!(f, "EXPIRED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }

    #[test]
    fn test_risk_level_db_round_trip() {
        for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            assert_eq!(RiskLevel::from_str(level.to_db_str()), level);
        }
    }

    #[test]
    fn test_sja_transitions() {
        assert!(SjaStatus::Draft.can_transition_to(SjaStatus::AwaitingApproval));
        assert!(SjaStatus::AwaitingApproval.can_transition_to(SjaStatus::Approved));
        assert!(SjaStatus::AwaitingApproval.can_transition_to(SjaStatus::Rejected));
        assert!(SjaStatus::Approved.can_transition_to(SjaStatus::Archived));
        assert!(SjaStatus::Rejected.can_transition_to(SjaStatus::Draft));

        assert!(!SjaStatus::Draft.can_transition_to(SjaStatus::Approved));
        assert!(!SjaStatus::Archived.can_transition_to(SjaStatus::Draft));
        assert!(!SjaStatus::Approved.can_transition_to(SjaStatus::Draft));
    }
}
