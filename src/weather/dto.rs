// ==========================================
// HMS Manager - forecast wire format
// ==========================================
// Shapes for the locationforecast "compact" JSON:
// properties.timeseries[].data.instant.details plus optional next_1_hours
// and next_6_hours blocks. Only the fields we read are modeled; serde
// skips the rest.
// ==========================================

use crate::domain::weather::ForecastSample;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LocationForecastResponse {
    pub properties: ForecastProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastProperties {
    #[serde(default)]
    pub timeseries: Vec<TimeseriesEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesEntry {
    pub time: DateTime<Utc>,
    pub data: TimeseriesData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesData {
    pub instant: InstantBlock,
    #[serde(default)]
    pub next_1_hours: Option<PeriodBlock>,
    #[serde(default)]
    pub next_6_hours: Option<PeriodBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstantBlock {
    #[serde(default)]
    pub details: InstantDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstantDetails {
    #[serde(default)]
    pub air_temperature: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeriodBlock {
    #[serde(default)]
    pub summary: Option<PeriodSummary>,
    #[serde(default)]
    pub details: Option<PeriodDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeriodSummary {
    #[serde(default)]
    pub symbol_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeriodDetails {
    #[serde(default)]
    pub precipitation_amount: Option<f64>,
}

impl LocationForecastResponse {
    /// Normalize the wire entries into in-memory samples. Missing optional
    /// fields become zero contributions; a degenerate instant block (no
    /// temperature/wind) becomes 0.0 rather than an error.
    pub fn into_samples(self) -> Vec<ForecastSample> {
        self.properties
            .timeseries
            .into_iter()
            .map(|entry| {
                let details = entry.data.instant.details;
                let (precipitation_1h, symbol_1h) = split_period(entry.data.next_1_hours);
                let (precipitation_6h, symbol_6h) = split_period(entry.data.next_6_hours);

                ForecastSample {
                    time: entry.time,
                    air_temperature: details.air_temperature.unwrap_or(0.0),
                    wind_speed: details.wind_speed.unwrap_or(0.0),
                    precipitation_1h,
                    precipitation_6h,
                    symbol_1h,
                    symbol_6h,
                }
            })
            .collect()
    }
}

fn split_period(block: Option<PeriodBlock>) -> (Option<f64>, Option<String>) {
    match block {
        None => (None, None),
        Some(block) => (
            block.details.and_then(|d| d.precipitation_amount),
            block.summary.and_then(|s| s.symbol_code),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_and_normalize() {
        let json = r#"
        {
            "properties": {
                "timeseries": [
                    {
                        "time": "2026-06-01T10:00:00Z",
                        "data": {
                            "instant": { "details": { "air_temperature": 12.5, "wind_speed": 4.2 } },
                            "next_1_hours": {
                                "summary": { "symbol_code": "lightrain" },
                                "details": { "precipitation_amount": 0.4 }
                            }
                        }
                    },
                    {
                        "time": "2026-06-01T16:00:00Z",
                        "data": {
                            "instant": { "details": { "air_temperature": 14.0, "wind_speed": 6.0 } },
                            "next_6_hours": {
                                "summary": { "symbol_code": "cloudy" },
                                "details": { "precipitation_amount": 3.0 }
                            }
                        }
                    }
                ]
            }
        }
        "#;

        let response: LocationForecastResponse = serde_json::from_str(json).unwrap();
        let samples = response.into_samples();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].air_temperature, 12.5);
        assert_eq!(samples[0].precipitation_1h, Some(0.4));
        assert_eq!(samples[0].symbol_1h.as_deref(), Some("lightrain"));
        assert_eq!(samples[1].precipitation_6h, Some(3.0));
        assert_eq!(samples[1].symbol_6h.as_deref(), Some("cloudy"));
        assert!(samples[1].precipitation_1h.is_none());
    }

    #[test]
    fn test_missing_blocks_tolerated() {
        let json = r#"
        {
            "properties": {
                "timeseries": [
                    {
                        "time": "2026-06-01T10:00:00Z",
                        "data": { "instant": { "details": {} } }
                    }
                ]
            }
        }
        "#;

        let response: LocationForecastResponse = serde_json::from_str(json).unwrap();
        let samples = response.into_samples();

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].air_temperature, 0.0);
        assert!(samples[0].precipitation_1h.is_none());
        assert!(samples[0].symbol().is_none());
    }
}
