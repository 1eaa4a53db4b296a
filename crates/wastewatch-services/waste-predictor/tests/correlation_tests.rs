use chrono::{Duration, NaiveDate, TimeZone, Utc};
use waste_predictor::features::TrashItem;
use waste_predictor::models::{CorrelationStrength, DailyWeather};
use waste_predictor::service::{analyze_correlation, correlation_window, synthetic_weather};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
}

// Helper: warmer days get more litter
fn warm_days_more_litter(days: i64) -> (Vec<DailyWeather>, Vec<TrashItem>) {
    let mut weather = Vec::new();
    let mut trash = Vec::new();
    for d in 0..days {
        let date = start() + Duration::days(d);
        let temperature = 8.0 + d as f64;
        weather.push(DailyWeather {
            date,
            temperature_max: temperature + 3.0,
            temperature_min: temperature - 3.0,
            precipitation: if d % 4 == 0 { 6.0 } else { 0.0 },
            weather_code: if d % 4 == 0 { 61 } else { 0 },
        });
        for n in 0..(d as u32 + 1) {
            trash.push(TrashItem {
                id: format!("{}-{}", d, n),
                litter_type: "Plastic".to_string(),
                latitude: 51.59,
                longitude: 4.77,
                timestamp: Utc.from_utc_datetime(&date.and_hms_opt(10, 0, 0).unwrap()),
            });
        }
    }
    (weather, trash)
}

#[test]
fn test_strong_positive_temperature_correlation() {
    let (weather, trash) = warm_days_more_litter(20);
    let end = start() + Duration::days(19);
    let result = analyze_correlation(&trash, &weather, start(), end);

    assert!(result.temperature_correlation > 0.99);
    assert_eq!(result.correlation_coefficient, result.temperature_correlation);
    assert_eq!(result.correlation_strength, CorrelationStrength::Strong);
    assert_eq!(result.days_analyzed, 20);
    assert!(result.insights[0].contains("higher temperatures"));
    assert!(result.insights.last().unwrap().contains("20 days"));
}

#[test]
fn test_percentages_and_chart_shape() {
    let (weather, trash) = warm_days_more_litter(20);
    let end = start() + Duration::days(19);
    let result = analyze_correlation(&trash, &weather, start(), end);

    // every fourth day rains
    assert!((result.rainy_weather_percentage - 25.0).abs() < 1e-9);
    assert!((result.sunny_weather_percentage - 75.0).abs() < 1e-9);

    let series = &result.chart_data.temperature_data;
    assert_eq!(series.labels.len(), 20);
    assert_eq!(series.labels[0], "01-05");
    assert_eq!(series.trash_count[0], 1);
    assert_eq!(
        result.chart_data.correlation_scatter.temperature,
        series.temperature
    );
    assert_eq!(result.chart_data.weather_distribution.labels[0], "Sunny");
}

#[test]
fn test_trash_outside_window_ignored() {
    let (weather, trash) = warm_days_more_litter(10);
    let end = start() + Duration::days(4);
    let result = analyze_correlation(&trash, &weather, start(), end);

    assert_eq!(result.days_analyzed, 5);
    let total: u32 = result.chart_data.temperature_data.trash_count.iter().sum();
    assert_eq!(total, 1 + 2 + 3 + 4 + 5);
}

#[test]
fn test_synthetic_series_for_window() {
    let reference = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
    let (from, to) = correlation_window(reference, 30);
    let weather = synthetic_weather(from, to, 7);
    assert_eq!(weather.len(), 31);

    let result = analyze_correlation(&[], &weather, from, to);
    assert_eq!(result.days_analyzed, 31);
    assert_eq!(result.temperature_correlation, 0.0);
    assert_eq!(result.precipitation_correlation, 0.0);
}
