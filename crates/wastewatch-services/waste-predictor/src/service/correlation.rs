//! Weather/litter correlation over a window of past days.

use chrono::{Datelike, Duration, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::features::{TrashItem, WeatherCategory};
use crate::models::{
    ChartData, CorrelationResponse, CorrelationScatter, CorrelationStrength, DailyWeather,
    TemperatureSeries, WeatherDistribution,
};

/// Inclusive window of `days_back + 1` days ending the day before `reference`.
pub fn correlation_window(reference: NaiveDate, days_back: u32) -> (NaiveDate, NaiveDate) {
    let end = reference - Duration::days(1);
    let start = end - Duration::days(i64::from(days_back));
    (start, end)
}

/// Seeded seasonal weather for every day in `[start, end]`.
pub fn synthetic_weather(start: NaiveDate, end: NaiveDate, seed: u64) -> Vec<DailyWeather> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| {
            let day_of_year = f64::from(date.ordinal());
            let base = 12.0 + 8.0 * ((day_of_year - 80.0) * 2.0 * PI / 365.0).sin();
            let temperature_max = round1(base + rng.gen_range(2.0..8.0));
            let temperature_min = round1(base - rng.gen_range(2.0..6.0));
            let precipitation = if rng.gen_bool(0.3) {
                round1(rng.gen_range(0.0..20.0))
            } else {
                0.0
            };
            let weather_code = if precipitation > 5.0 {
                61
            } else if precipitation > 0.0 {
                rng.gen_range(1..=3)
            } else {
                rng.gen_range(0..=2)
            };
            DailyWeather {
                date,
                temperature_max,
                temperature_min,
                precipitation,
                weather_code,
            }
        })
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Pearson correlation; `None` when undefined (fewer than two points or no variance).
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let mean_x = x.iter().take(n).sum::<f64>() / n as f64;
    let mean_y = y.iter().take(n).sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y.iter()).take(n) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator <= f64::EPSILON {
        return None;
    }
    let r = cov / denominator;
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

struct Day<'a> {
    weather: &'a DailyWeather,
    category: WeatherCategory,
    trash: u32,
}

/// Join daily trash counts onto the weather days in `[start, end]` and
/// summarise how litter volume moves with the weather.
///
/// Days without detections count as zero. Trash outside the window is ignored.
pub fn analyze_correlation(
    trash: &[TrashItem],
    weather: &[DailyWeather],
    start: NaiveDate,
    end: NaiveDate,
) -> CorrelationResponse {
    let mut counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for item in trash {
        let date = item.timestamp.date_naive();
        if date >= start && date <= end {
            *counts.entry(date).or_insert(0) += 1;
        }
    }

    let mut days: Vec<Day<'_>> = weather
        .iter()
        .filter(|w| w.date >= start && w.date <= end)
        .map(|w| Day {
            weather: w,
            category: WeatherCategory::from_wmo_code(w.weather_code),
            trash: counts.get(&w.date).copied().unwrap_or(0),
        })
        .collect();
    days.sort_by_key(|d| d.weather.date);

    let temperatures: Vec<f64> = days.iter().map(|d| d.weather.average_temperature()).collect();
    let precipitation: Vec<f64> = days.iter().map(|d| d.weather.precipitation).collect();
    let trash_counts: Vec<u32> = days.iter().map(|d| d.trash).collect();
    let trash_f64: Vec<f64> = trash_counts.iter().map(|&c| f64::from(c)).collect();

    let temperature_correlation = pearson(&temperatures, &trash_f64).unwrap_or(0.0);
    let precipitation_correlation = pearson(&precipitation, &trash_f64).unwrap_or(0.0);

    let total_days = days.len();
    let (sunny_share, sunny_average) = share_and_average(&days, WeatherCategory::Sunny);
    let (rainy_share, rainy_average) = share_and_average(&days, WeatherCategory::Rainy);

    let strength = CorrelationStrength::from_coefficient(temperature_correlation);
    let insights = insights(
        temperature_correlation,
        precipitation_correlation,
        sunny_average,
        rainy_average,
        total_days,
    );

    tracing::info!(
        days = total_days,
        temperature_correlation,
        precipitation_correlation,
        "correlation analysed"
    );

    CorrelationResponse {
        correlation_coefficient: temperature_correlation,
        correlation_strength: strength,
        correlation_label: strength.label().to_string(),
        temperature_correlation,
        precipitation_correlation,
        sunny_weather_percentage: sunny_share,
        rainy_weather_percentage: rainy_share,
        sunny_average_trash: sunny_average,
        rainy_average_trash: rainy_average,
        days_analyzed: total_days,
        start_date: start,
        end_date: end,
        insights,
        chart_data: ChartData {
            temperature_data: TemperatureSeries {
                labels: days
                    .iter()
                    .map(|d| d.weather.date.format("%d-%m").to_string())
                    .collect(),
                temperature: temperatures.clone(),
                trash_count: trash_counts.clone(),
            },
            weather_distribution: distribution(&days),
            correlation_scatter: CorrelationScatter {
                temperature: temperatures,
                trash_count: trash_counts,
            },
        },
    }
}

/// Percentage of days in `category` and their mean trash count.
fn share_and_average(days: &[Day<'_>], category: WeatherCategory) -> (f64, f64) {
    let matching: Vec<u32> = days
        .iter()
        .filter(|d| d.category == category)
        .map(|d| d.trash)
        .collect();
    if days.is_empty() || matching.is_empty() {
        return (0.0, 0.0);
    }
    let share = matching.len() as f64 / days.len() as f64 * 100.0;
    let average = matching.iter().map(|&c| f64::from(c)).sum::<f64>() / matching.len() as f64;
    (share, average)
}

/// Day counts per weather category, most frequent first.
fn distribution(days: &[Day<'_>]) -> WeatherDistribution {
    let mut counts: BTreeMap<WeatherCategory, u32> = BTreeMap::new();
    for day in days {
        *counts.entry(day.category).or_insert(0) += 1;
    }
    let mut sorted: Vec<(WeatherCategory, u32)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    WeatherDistribution {
        labels: sorted.iter().map(|(c, _)| c.label().to_string()).collect(),
        values: sorted.iter().map(|(_, n)| *n).collect(),
    }
}

fn insights(
    temperature_correlation: f64,
    precipitation_correlation: f64,
    sunny_average: f64,
    rainy_average: f64,
    total_days: usize,
) -> Vec<String> {
    let mut insights = Vec::new();

    if temperature_correlation > 0.3 {
        insights.push(format!(
            "More litter is detected at higher temperatures (+{:.2} correlation)",
            temperature_correlation
        ));
    } else if temperature_correlation < -0.3 {
        insights.push(format!(
            "Less litter is detected at higher temperatures ({:.2} correlation)",
            temperature_correlation
        ));
    } else {
        insights.push(format!(
            "Temperature has little influence on litter volume (correlation: {:.2})",
            temperature_correlation
        ));
    }

    if sunny_average > rainy_average && sunny_average > 0.0 {
        insights.push(format!(
            "Sunny days average {:.1} items of litter vs {:.1} on rainy days",
            sunny_average, rainy_average
        ));
    } else if rainy_average > sunny_average && rainy_average > 0.0 {
        insights.push(format!(
            "Rainy days see more litter ({:.1} vs {:.1} items)",
            rainy_average, sunny_average
        ));
    }

    if precipitation_correlation < -0.3 {
        insights.push("More precipitation goes together with less litter".to_string());
    } else if precipitation_correlation > 0.3 {
        insights.push("More precipitation goes together with more litter".to_string());
    }

    insights.push(format!("Analysis based on {} days of weather data", total_days));
    insights
}
