// ==========================================
// Forecast aggregation engine tests
// ==========================================
// Property set for the hourly-to-daily fold, including the worked
// 24-sample example.
// ==========================================


use chrono::FixedOffset;
use hms_manager::domain::types::RiskLevel;
use hms_manager::engine::forecast::ForecastAggregator;
use test_helpers::{rainy_sample, sample};

/// Aggregator pinned to UTC so UTC hours and local days coincide in the
/// assertions below.
fn utc_aggregator() -> ForecastAggregator {
    ForecastAggregator::with_offset(FixedOffset::east_opt(0).unwrap())
}

#[test]
fn test_worked_example_24_hourly_samples() {
    // 24 hourly samples for one day: temperatures 2-8 C, wind peaking at
    // 17 m/s, one 3 mm precipitation sample. Wind > 15 forces High on its
    // own.
    let mut samples = Vec::new();
    for hour in 0..24u32 {
        let temp = 2.0 + (hour % 7) as f64; // ranges 2..=8
        let wind = if hour == 14 { 17.0 } else { 5.0 };
        samples.push(sample((2024, 1, 1), hour, temp, wind));
    }
    samples[9].precipitation_1h = Some(3.0);

    let days = utc_aggregator().aggregate(&samples);

    assert_eq!(days.len(), 1);
    let day = &days[0];
    assert_eq!(day.date.to_string(), "2024-01-01");
    assert_eq!(day.min_temperature, 2.0);
    assert_eq!(day.max_temperature, 8.0);
    assert_eq!(day.max_wind_speed, 17.0);
    assert_eq!(day.total_precipitation, 3.0);
    assert_eq!(day.risk_level, RiskLevel::High);
}

#[test]
fn test_empty_input_is_no_forecast_not_an_error() {
    assert!(utc_aggregator().aggregate(&[]).is_empty());
}

#[test]
fn test_output_length_equals_distinct_dates() {
    let samples = vec![
        sample((2026, 8, 10), 6, 12.0, 3.0),
        sample((2026, 8, 10), 18, 16.0, 4.0),
        sample((2026, 8, 11), 6, 11.0, 3.0),
        sample((2026, 8, 13), 6, 10.0, 2.0),
    ];

    let days = utc_aggregator().aggregate(&samples);
    assert_eq!(days.len(), 3);
}

#[test]
fn test_sorted_ascending_and_min_le_max() {
    let samples = vec![
        sample((2026, 8, 12), 3, 14.0, 2.0),
        sample((2026, 8, 10), 9, 9.0, 2.0),
        sample((2026, 8, 11), 15, 18.0, 2.0),
        sample((2026, 8, 10), 21, 7.0, 2.0),
    ];

    let days = utc_aggregator().aggregate(&samples);

    for pair in days.windows(2) {
        assert!(pair[0].date < pair[1].date);
    }
    for day in &days {
        assert!(day.min_temperature <= day.max_temperature);
        assert!(day.total_precipitation >= 0.0);
    }
}

#[test]
fn test_idempotent() {
    let samples = vec![
        rainy_sample((2026, 8, 10), 13, 14.0, 6.0, 0.8, "lightrain"),
        sample((2026, 8, 10), 20, 9.0, 3.0),
    ];

    let aggregator = utc_aggregator();
    assert_eq!(aggregator.aggregate(&samples), aggregator.aggregate(&samples));
}

#[test]
fn test_six_hour_only_samples_are_spread() {
    // Two 6-hourly samples carrying 6 mm each contribute 1 mm apiece.
    let mut a = sample((2026, 8, 10), 0, 10.0, 2.0);
    a.precipitation_6h = Some(6.0);
    let mut b = sample((2026, 8, 10), 6, 11.0, 2.0);
    b.precipitation_6h = Some(6.0);

    let days = utc_aggregator().aggregate(&[a, b]);
    assert_eq!(days[0].total_precipitation, 2.0);
    // 2 mm total is over the 1 mm Medium threshold.
    assert_eq!(days[0].risk_level, RiskLevel::Medium);
}

#[test]
fn test_symbol_preference_order() {
    // Midday symbol beats the first one; without midday the first
    // symbol-bearing sample wins.
    let with_midday = vec![
        rainy_sample((2026, 8, 10), 7, 10.0, 2.0, 0.0, "fog"),
        rainy_sample((2026, 8, 10), 13, 15.0, 2.0, 0.0, "clearsky_day"),
    ];
    let days = utc_aggregator().aggregate(&with_midday);
    assert_eq!(days[0].symbol_code, "clearsky_day");

    let without_midday = vec![
        rainy_sample((2026, 8, 10), 7, 10.0, 2.0, 0.0, "fog"),
        sample((2026, 8, 10), 19, 12.0, 2.0),
    ];
    let days = utc_aggregator().aggregate(&without_midday);
    assert_eq!(days[0].symbol_code, "fog");
}

#[test]
fn test_cold_day_risk() {
    let samples = vec![
        sample((2026, 1, 10), 6, -12.0, 2.0),
        sample((2026, 1, 10), 13, -4.0, 2.0),
    ];

    let days = utc_aggregator().aggregate(&samples);
    // min -12 C is below the -10 C High threshold.
    assert_eq!(days[0].risk_level, RiskLevel::High);
}
