// ==========================================
// Weather API tests
// ==========================================
// Window truncation, empty upstream handling and coordinate validation,
// all against the stubbed provider.
// ==========================================


use hms_manager::api::ApiError;
use hms_manager::config::config_keys;
use test_helpers::{create_test_state, sample};

#[tokio::test]
async fn test_window_truncation_defaults_to_three_days() {
    // Five distinct days from the provider; the widget shows three.
    let samples = vec![
        sample((2026, 8, 10), 12, 15.0, 3.0),
        sample((2026, 8, 11), 12, 14.0, 3.0),
        sample((2026, 8, 12), 12, 13.0, 3.0),
        sample((2026, 8, 13), 12, 12.0, 3.0),
        sample((2026, 8, 14), 12, 11.0, 3.0),
    ];
    let (_tmp, state) = create_test_state(samples).unwrap();

    let days = state.weather_api.get_daily_forecast(59.91, 10.75).await.unwrap();
    assert_eq!(days.len(), 3);
    // The earliest days survive the truncation.
    assert_eq!(days[0].date.to_string(), "2026-08-10");
    assert_eq!(days[2].date.to_string(), "2026-08-12");
}

#[tokio::test]
async fn test_window_is_configurable() {
    let samples = vec![
        sample((2026, 8, 10), 12, 15.0, 3.0),
        sample((2026, 8, 11), 12, 14.0, 3.0),
        sample((2026, 8, 12), 12, 13.0, 3.0),
    ];
    let (_tmp, state) = create_test_state(samples).unwrap();

    state
        .config
        .set_config_value(config_keys::FORECAST_WINDOW_DAYS, "1")
        .unwrap();

    let days = state.weather_api.get_daily_forecast(59.91, 10.75).await.unwrap();
    assert_eq!(days.len(), 1);
}

#[tokio::test]
async fn test_empty_upstream_is_empty_list() {
    let (_tmp, state) = create_test_state(Vec::new()).unwrap();

    let days = state.weather_api.get_daily_forecast(59.91, 10.75).await.unwrap();
    assert!(days.is_empty());
}

#[tokio::test]
async fn test_multi_position_fetch() {
    let samples = vec![sample((2026, 8, 10), 12, 15.0, 3.0)];
    let (_tmp, state) = create_test_state(samples).unwrap();

    let forecasts = state
        .weather_api
        .get_daily_forecasts(&[(59.91, 10.75), (60.39, 5.32)])
        .await
        .unwrap();

    assert_eq!(forecasts.len(), 2);
    assert_eq!(forecasts[0].len(), 1);
    assert_eq!(forecasts[1].len(), 1);
}

#[tokio::test]
async fn test_invalid_coordinates_rejected_before_fetch() {
    let (_tmp, state) = create_test_state(Vec::new()).unwrap();

    let result = state.weather_api.get_daily_forecast(120.0, 10.75).await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}
