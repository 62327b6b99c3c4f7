// ==========================================
// HMS Manager - weather API
// ==========================================
// Responsibility: fetch the raw forecast through the provider seam,
// aggregate it into daily summaries and truncate to the configured
// display window.
// ==========================================

use std::sync::Arc;

use tracing::debug;

use crate::api::error::ApiResult;
use crate::api::validator::validate_coordinates;
use crate::config::ConfigManager;
use crate::domain::weather::DailyForecastSummary;
use crate::engine::forecast::ForecastAggregator;
use crate::weather::ForecastProvider;

// ==========================================
// WeatherApi
// ==========================================
pub struct WeatherApi {
    provider: Arc<dyn ForecastProvider>,
    aggregator: ForecastAggregator,
    config: Arc<ConfigManager>,
}

impl WeatherApi {
    pub fn new(provider: Arc<dyn ForecastProvider>, config: Arc<ConfigManager>) -> Self {
        Self {
            provider,
            aggregator: ForecastAggregator::new(),
            config,
        }
    }

    /// Daily forecast for a position, truncated to the configured window
    /// (default 3 days). An empty upstream timeseries is "no forecast
    /// available" and returns an empty list, not an error.
    pub async fn get_daily_forecast(
        &self,
        lat: f64,
        lon: f64,
    ) -> ApiResult<Vec<DailyForecastSummary>> {
        validate_coordinates(lat, lon)?;

        let samples = self.provider.fetch_samples(lat, lon).await?;
        let mut days = self.aggregator.aggregate(&samples);

        let window = self.config.get_forecast_window_days().unwrap_or(3);
        days.truncate(window);

        debug!(lat, lon, day_count = days.len(), "daily forecast aggregated");
        Ok(days)
    }

    /// Forecasts for several positions, fetched concurrently. One failing
    /// position fails the batch.
    pub async fn get_daily_forecasts(
        &self,
        positions: &[(f64, f64)],
    ) -> ApiResult<Vec<Vec<DailyForecastSummary>>> {
        futures::future::try_join_all(
            positions
                .iter()
                .map(|&(lat, lon)| self.get_daily_forecast(lat, lon)),
        )
        .await
    }
}
