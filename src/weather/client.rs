// ==========================================
// HMS Manager - forecast HTTP client
// ==========================================
// Fetches the locationforecast compact endpoint and normalizes the
// response into ForecastSample rows. The provider trait is the seam the
// API layer and the tests mock.
// ==========================================

use crate::domain::weather::ForecastSample;
use crate::weather::dto::LocationForecastResponse;
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// The upstream requires an identifying User-Agent; anonymous requests are
/// rejected.
pub const DEFAULT_USER_AGENT: &str = "hms-manager/0.1 hms-manager@example.com";

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.met.no/weatherapi";

// ==========================================
// Errors
// ==========================================
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("invalid coordinates: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("forecast request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("forecast upstream returned status {0}")]
    UpstreamStatus(u16),
}

/// Result alias
pub type WeatherResult<T> = Result<T, WeatherError>;

// ==========================================
// ForecastProvider - fetch seam
// ==========================================
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch the hourly/6-hourly samples for a position.
    async fn fetch_samples(&self, lat: f64, lon: f64) -> WeatherResult<Vec<ForecastSample>>;
}

// ==========================================
// ForecastClient
// ==========================================
pub struct ForecastClient {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl ForecastClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client against an alternative root (test servers, proxies).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    fn check_coordinates(lat: f64, lon: f64) -> WeatherResult<()> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(WeatherError::InvalidCoordinates { lat, lon });
        }
        Ok(())
    }
}

impl Default for ForecastClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ForecastProvider for ForecastClient {
    async fn fetch_samples(&self, lat: f64, lon: f64) -> WeatherResult<Vec<ForecastSample>> {
        Self::check_coordinates(lat, lon)?;

        let url = format!(
            "{}/locationforecast/2.0/compact?lat={:.4}&lon={:.4}",
            self.base_url, lat, lon
        );
        debug!(url = %url, "fetching forecast");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::UpstreamStatus(status.as_u16()));
        }

        let decoded: LocationForecastResponse = response.json().await?;
        let samples = decoded.into_samples();
        debug!(sample_count = samples.len(), "forecast fetched");

        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(ForecastClient::check_coordinates(59.91, 10.75).is_ok());
        assert!(ForecastClient::check_coordinates(91.0, 10.0).is_err());
        assert!(ForecastClient::check_coordinates(59.0, -181.0).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ForecastClient::with_base_url("http://localhost:9999/");
        assert_eq!(client.base_url, "http://localhost:9999");
    }
}
