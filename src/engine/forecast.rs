// ==========================================
// HMS Manager - forecast aggregation engine
// ==========================================
// Responsibility: collapse the chronological hourly/6-hourly samples from
// the forecast API into per-day summaries (min/max temperature, max wind,
// precipitation total, display symbol, risk bucket).
// Pure single-pass fold; empty input gives an empty result, never an
// error.
// ==========================================

use crate::domain::types::RiskLevel;
use crate::domain::weather::{DailyForecastSummary, ForecastSample, DEFAULT_SYMBOL_CODE};
use chrono::{FixedOffset, NaiveDate, Timelike};
use std::collections::BTreeMap;

// Day risk thresholds. Fixed constants, not configuration.
const WIND_HIGH_MS: f64 = 15.0;
const WIND_MEDIUM_MS: f64 = 8.0;
const PRECIP_HIGH_MM: f64 = 5.0;
const PRECIP_MEDIUM_MM: f64 = 1.0;
const COLD_HIGH_C: f64 = -10.0;
const COLD_MEDIUM_C: f64 = 0.0;
const HEAT_HIGH_C: f64 = 30.0;
const HEAT_MEDIUM_C: f64 = 25.0;

// Symbol preference window: a sample whose local hour falls in [12,15]
// represents the day better than an early-morning one.
const SYMBOL_HOUR_FROM: u32 = 12;
const SYMBOL_HOUR_TO: u32 = 15;

// ==========================================
// ForecastAggregator
// ==========================================
pub struct ForecastAggregator {
    /// Offset used to assign samples to local calendar days.
    offset: FixedOffset,
}

impl ForecastAggregator {
    /// Aggregator for Norwegian local time (CET, +01:00).
    pub fn new() -> Self {
        Self {
            offset: FixedOffset::east_opt(3600).unwrap(),
        }
    }

    /// Aggregator with an explicit local-time offset.
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Aggregate samples into one summary per calendar day, ascending by
    /// date.
    ///
    /// Per-sample precipitation: the 1-hour figure counts in full; a
    /// sample carrying only a 6-hour figure contributes value/6 for its
    /// hour. This spreading is an approximation kept for behavioral
    /// parity with the upstream widget, not a measurement.
    pub fn aggregate(&self, samples: &[ForecastSample]) -> Vec<DailyForecastSummary> {
        let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

        for sample in samples {
            let local = sample.time.with_timezone(&self.offset);
            let date = local.date_naive();
            let hour = local.hour();

            days.entry(date).or_default().fold(sample, hour);
        }

        days.into_iter()
            .map(|(date, acc)| acc.into_summary(date))
            .collect()
    }

    /// Risk bucket for one aggregated day.
    ///
    /// High: wind > 15 m/s, precipitation > 5 mm, below -10 C or above
    /// 30 C. Medium: wind > 8 m/s, precipitation > 1 mm, below 0 C or
    /// above 25 C. Otherwise Low.
    pub fn day_risk_level(
        min_temperature: f64,
        max_temperature: f64,
        max_wind_speed: f64,
        total_precipitation: f64,
    ) -> RiskLevel {
        if max_wind_speed > WIND_HIGH_MS
            || total_precipitation > PRECIP_HIGH_MM
            || min_temperature < COLD_HIGH_C
            || max_temperature > HEAT_HIGH_C
        {
            RiskLevel::High
        } else if max_wind_speed > WIND_MEDIUM_MS
            || total_precipitation > PRECIP_MEDIUM_MM
            || min_temperature < COLD_MEDIUM_C
            || max_temperature > HEAT_MEDIUM_C
        {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl Default for ForecastAggregator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// DayAccumulator - per-day fold state
// ==========================================
#[derive(Default)]
struct DayAccumulator {
    min_temperature: Option<f64>,
    max_temperature: Option<f64>,
    max_wind_speed: f64,
    total_precipitation: f64,
    midday_symbol: Option<String>,
    first_symbol: Option<String>,
}

impl DayAccumulator {
    fn fold(&mut self, sample: &ForecastSample, local_hour: u32) {
        let t = sample.air_temperature;
        self.min_temperature = Some(self.min_temperature.map_or(t, |m| m.min(t)));
        self.max_temperature = Some(self.max_temperature.map_or(t, |m| m.max(t)));

        if sample.wind_speed > self.max_wind_speed {
            self.max_wind_speed = sample.wind_speed;
        }

        // Missing precipitation blocks contribute zero.
        if let Some(p) = sample.precipitation_1h {
            self.total_precipitation += p;
        } else if let Some(p) = sample.precipitation_6h {
            self.total_precipitation += p / 6.0;
        }

        if let Some(symbol) = sample.symbol() {
            if self.first_symbol.is_none() {
                self.first_symbol = Some(symbol.to_string());
            }
            if self.midday_symbol.is_none()
                && (SYMBOL_HOUR_FROM..=SYMBOL_HOUR_TO).contains(&local_hour)
            {
                self.midday_symbol = Some(symbol.to_string());
            }
        }
    }

    fn into_summary(self, date: NaiveDate) -> DailyForecastSummary {
        // min/max are Some for every materialized accumulator: fold runs
        // at least once per day entry.
        let min_temperature = self.min_temperature.unwrap_or(0.0);
        let max_temperature = self.max_temperature.unwrap_or(0.0);

        let risk_level = ForecastAggregator::day_risk_level(
            min_temperature,
            max_temperature,
            self.max_wind_speed,
            self.total_precipitation,
        );

        DailyForecastSummary {
            date,
            min_temperature,
            max_temperature,
            max_wind_speed: self.max_wind_speed,
            total_precipitation: self.total_precipitation,
            symbol_code: self
                .midday_symbol
                .or(self.first_symbol)
                .unwrap_or_else(|| DEFAULT_SYMBOL_CODE.to_string()),
            risk_level,
        }
    }
}

// ==========================================
// Unit tests
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample(ymd: (i32, u32, u32), hour: u32, temp: f64, wind: f64) -> ForecastSample {
        ForecastSample {
            time: Utc
                .with_ymd_and_hms(ymd.0, ymd.1, ymd.2, hour, 0, 0)
                .unwrap(),
            air_temperature: temp,
            wind_speed: wind,
            precipitation_1h: None,
            precipitation_6h: None,
            symbol_1h: None,
            symbol_6h: None,
        }
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        let aggregator = ForecastAggregator::new();
        assert!(aggregator.aggregate(&[]).is_empty());
    }

    #[test]
    fn test_one_day_min_max() {
        let aggregator = ForecastAggregator::new();
        let samples = vec![
            sample((2026, 6, 1), 6, 8.0, 3.0),
            sample((2026, 6, 1), 9, 12.0, 5.0),
            sample((2026, 6, 1), 12, 15.0, 4.0),
        ];

        let days = aggregator.aggregate(&samples);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].min_temperature, 8.0);
        assert_eq!(days[0].max_temperature, 15.0);
        assert_eq!(days[0].max_wind_speed, 5.0);
        assert_eq!(days[0].risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_six_hour_precipitation_is_spread() {
        let aggregator = ForecastAggregator::new();
        let mut s = sample((2026, 6, 1), 6, 10.0, 2.0);
        s.precipitation_6h = Some(6.0);

        let days = aggregator.aggregate(&[s]);
        assert_eq!(days[0].total_precipitation, 1.0);
    }

    #[test]
    fn test_one_hour_precipitation_wins_over_six_hour() {
        let aggregator = ForecastAggregator::new();
        let mut s = sample((2026, 6, 1), 6, 10.0, 2.0);
        s.precipitation_1h = Some(2.0);
        s.precipitation_6h = Some(12.0);

        let days = aggregator.aggregate(&[s]);
        assert_eq!(days[0].total_precipitation, 2.0);
    }

    #[test]
    fn test_midday_symbol_preferred() {
        let aggregator = ForecastAggregator::new();
        let mut early = sample((2026, 6, 1), 4, 10.0, 2.0);
        early.symbol_1h = Some("fog".to_string());
        let mut midday = sample((2026, 6, 1), 12, 14.0, 2.0);
        midday.symbol_1h = Some("partlycloudy_day".to_string());

        let days = aggregator.aggregate(&[early, midday]);
        assert_eq!(days[0].symbol_code, "partlycloudy_day");
    }

    #[test]
    fn test_symbol_falls_back_to_first_then_default() {
        let aggregator = ForecastAggregator::new();

        let mut early = sample((2026, 6, 1), 4, 10.0, 2.0);
        early.symbol_6h = Some("rain".to_string());
        let late = sample((2026, 6, 1), 20, 9.0, 2.0);
        let days = aggregator.aggregate(&[early, late]);
        assert_eq!(days[0].symbol_code, "rain");

        let bare = sample((2026, 6, 2), 8, 10.0, 2.0);
        let days = aggregator.aggregate(&[bare]);
        assert_eq!(days[0].symbol_code, DEFAULT_SYMBOL_CODE);
    }

    #[test]
    fn test_days_sorted_ascending() {
        let aggregator = ForecastAggregator::new();
        let samples = vec![
            sample((2026, 6, 3), 10, 10.0, 2.0),
            sample((2026, 6, 1), 10, 10.0, 2.0),
            sample((2026, 6, 2), 10, 10.0, 2.0),
        ];

        let days = aggregator.aggregate(&samples);
        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(days.len(), 3);
    }

    #[test]
    fn test_local_offset_shifts_day_boundary() {
        // 23:30 UTC is already the next day in CET (+01:00).
        let aggregator = ForecastAggregator::new();
        let s = ForecastSample {
            time: Utc.with_ymd_and_hms(2026, 6, 1, 23, 30, 0).unwrap(),
            air_temperature: 10.0,
            wind_speed: 2.0,
            precipitation_1h: None,
            precipitation_6h: None,
            symbol_1h: None,
            symbol_6h: None,
        };

        let days = aggregator.aggregate(&[s]);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 6, 2).unwrap());
    }

    #[test]
    fn test_risk_thresholds() {
        use RiskLevel::*;

        assert_eq!(ForecastAggregator::day_risk_level(5.0, 15.0, 16.0, 0.0), High);
        assert_eq!(ForecastAggregator::day_risk_level(5.0, 15.0, 2.0, 5.5), High);
        assert_eq!(ForecastAggregator::day_risk_level(-11.0, -2.0, 2.0, 0.0), High);
        assert_eq!(ForecastAggregator::day_risk_level(20.0, 31.0, 2.0, 0.0), High);

        assert_eq!(ForecastAggregator::day_risk_level(5.0, 15.0, 9.0, 0.0), Medium);
        assert_eq!(ForecastAggregator::day_risk_level(5.0, 15.0, 2.0, 1.5), Medium);
        assert_eq!(ForecastAggregator::day_risk_level(-1.0, 5.0, 2.0, 0.0), Medium);
        assert_eq!(ForecastAggregator::day_risk_level(18.0, 26.0, 2.0, 0.0), Medium);

        assert_eq!(ForecastAggregator::day_risk_level(2.0, 20.0, 5.0, 0.5), Low);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let aggregator = ForecastAggregator::new();
        let samples = vec![
            sample((2026, 6, 1), 6, 8.0, 3.0),
            sample((2026, 6, 2), 6, 9.0, 4.0),
        ];

        assert_eq!(aggregator.aggregate(&samples), aggregator.aggregate(&samples));
    }
}
