// ==========================================
// HMS Manager - risk scoring engine
// ==========================================
// Responsibility: the ONE shared probability x severity scorer. Both the
// risk-matrix hazards and the SJA hazards are scored here; no caller may
// re-derive the formula.
// Output: risk value (1-25) and Low/Medium/High bucket.
// ==========================================

use crate::domain::types::RiskLevel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest accepted rating.
pub const MIN_RATING: i32 = 1;
/// Highest accepted rating.
pub const MAX_RATING: i32 = 5;

// Bucket thresholds (exclusive lower bounds). Fixed constants, not
// configuration: value > 15 is High, value > 8 is Medium, the rest is Low.
const HIGH_OVER: i32 = 15;
const MEDIUM_OVER: i32 = 8;

// ==========================================
// RiskScore
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    pub value: i32,
    pub level: RiskLevel,
}

// ==========================================
// Errors
// ==========================================
// Out-of-range ratings are rejected, never clamped: a clamp would mask
// upstream form-validation bugs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RiskScoreError {
    #[error("rating out of range (field={field}): {value} is not within {MIN_RATING}..={MAX_RATING}")]
    OutOfRange { field: &'static str, value: i32 },
}

// ==========================================
// RiskScoreEngine
// ==========================================
pub struct RiskScoreEngine;

impl RiskScoreEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score a probability/severity pair.
    ///
    /// # Arguments
    /// - `probability`: 1 (rare) to 5 (near-certain)
    /// - `severity`: 1 (negligible) to 5 (catastrophic)
    ///
    /// # Returns
    /// RiskScore with `value = probability * severity` and the derived
    /// bucket, or RiskScoreError for ratings outside 1..=5.
    pub fn score(&self, probability: i32, severity: i32) -> Result<RiskScore, RiskScoreError> {
        Self::check_rating("probability", probability)?;
        Self::check_rating("severity", severity)?;

        let value = probability * severity;
        Ok(RiskScore {
            value,
            level: Self::level_for_value(value),
        })
    }

    /// Bucket a precomputed risk value.
    pub fn level_for_value(value: i32) -> RiskLevel {
        if value > HIGH_OVER {
            RiskLevel::High
        } else if value > MEDIUM_OVER {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    fn check_rating(field: &'static str, value: i32) -> Result<(), RiskScoreError> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(())
        } else {
            Err(RiskScoreError::OutOfRange { field, value })
        }
    }
}

impl Default for RiskScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}
