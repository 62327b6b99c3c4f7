// ==========================================
// HMS Manager - input validation helpers
// ==========================================
// Form-level checks shared by the API structs: required fields, length
// limits, coordinate ranges. Rating ranges are checked by the risk
// engine itself.
// ==========================================

use crate::api::error::{ApiError, ApiResult};

/// Maximum title length for sections, assessments and SJA records.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum body length for handbook sections.
pub const MAX_BODY_LEN: usize = 50_000;

/// Maximum length for free-text description fields.
pub const MAX_TEXT_LEN: usize = 10_000;

/// Required, non-blank text within a length limit.
pub fn validate_required_text(field: &str, value: &str, max_len: usize) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("{} must not be empty", field)));
    }
    if value.chars().count() > max_len {
        return Err(ApiError::InvalidInput(format!(
            "{} exceeds {} characters",
            field, max_len
        )));
    }
    Ok(())
}

/// Optional text within a length limit.
pub fn validate_optional_text(field: &str, value: Option<&str>, max_len: usize) -> ApiResult<()> {
    match value {
        None => Ok(()),
        Some(v) if v.chars().count() > max_len => Err(ApiError::InvalidInput(format!(
            "{} exceeds {} characters",
            field, max_len
        ))),
        Some(_) => Ok(()),
    }
}

/// Required non-blank id.
pub fn validate_id(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// WGS84 coordinate pair.
pub fn validate_coordinates(lat: f64, lon: f64) -> ApiResult<()> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ApiError::InvalidInput(format!(
            "latitude {} outside -90..=90",
            lat
        )));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(ApiError::InvalidInput(format!(
            "longitude {} outside -180..=180",
            lon
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("title", "Stillasarbeid", MAX_TITLE_LEN).is_ok());
        assert!(validate_required_text("title", "   ", MAX_TITLE_LEN).is_err());
        assert!(validate_required_text("title", &"x".repeat(MAX_TITLE_LEN + 1), MAX_TITLE_LEN).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text("area", None, 10).is_ok());
        assert!(validate_optional_text("area", Some("verksted"), 10).is_ok());
        assert!(validate_optional_text("area", Some("x".repeat(11).as_str()), 10).is_err());
    }

    #[test]
    fn test_coordinates() {
        assert!(validate_coordinates(59.91, 10.75).is_ok());
        assert!(validate_coordinates(-91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, 181.0).is_err());
    }
}
