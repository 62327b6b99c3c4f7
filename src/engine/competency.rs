// ==========================================
// HMS Manager - competency status engine
// ==========================================
// Responsibility: derive VALID / EXPIRING_SOON / EXPIRED from the expiry
// date. The warning window is configurable; the status itself is never
// stored.
// ==========================================

use crate::domain::types::CompetencyStatus;
use chrono::{Duration, NaiveDate};

/// Default warning window before expiry (days).
pub const DEFAULT_WARNING_DAYS: i64 = 90;

// ==========================================
// CompetencyStatusEngine
// ==========================================
pub struct CompetencyStatusEngine {
    warning_days: i64,
}

impl CompetencyStatusEngine {
    pub fn new() -> Self {
        Self {
            warning_days: DEFAULT_WARNING_DAYS,
        }
    }

    pub fn with_warning_days(warning_days: i64) -> Self {
        Self { warning_days }
    }

    /// Classify an expiry date relative to `today`.
    ///
    /// No expiry date means the competency never expires and is VALID.
    /// Expiry on `today` itself still counts as valid-but-expiring.
    pub fn classify(&self, expiry_date: Option<NaiveDate>, today: NaiveDate) -> CompetencyStatus {
        match expiry_date {
            None => CompetencyStatus::Valid,
            Some(expiry) => {
                if expiry < today {
                    CompetencyStatus::Expired
                } else if expiry <= today + Duration::days(self.warning_days) {
                    CompetencyStatus::ExpiringSoon
                } else {
                    CompetencyStatus::Valid
                }
            }
        }
    }
}

impl Default for CompetencyStatusEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_no_expiry_is_valid() {
        let engine = CompetencyStatusEngine::new();
        assert_eq!(engine.classify(None, d(2026, 8, 1)), CompetencyStatus::Valid);
    }

    #[test]
    fn test_expired_yesterday() {
        let engine = CompetencyStatusEngine::new();
        assert_eq!(
            engine.classify(Some(d(2026, 7, 31)), d(2026, 8, 1)),
            CompetencyStatus::Expired
        );
    }

    #[test]
    fn test_window_boundaries() {
        let engine = CompetencyStatusEngine::with_warning_days(30);
        let today = d(2026, 8, 1);

        // Expiry today: still within the window, not expired.
        assert_eq!(engine.classify(Some(today), today), CompetencyStatus::ExpiringSoon);
        // Exactly 30 days out: last day of the window.
        assert_eq!(
            engine.classify(Some(d(2026, 8, 31)), today),
            CompetencyStatus::ExpiringSoon
        );
        // 31 days out: valid.
        assert_eq!(
            engine.classify(Some(d(2026, 9, 1)), today),
            CompetencyStatus::Valid
        );
    }
}
