//! Weather for the day being predicted.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::SeasonalWeather;

/// Where the weather used for a prediction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSource {
    /// Both values supplied by the caller.
    Request,
    /// One value supplied, the other filled by the provider.
    Partial,
    /// Both values from the provider.
    Provider,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayWeather {
    pub temperature: f64,
    pub description: String,
}

/// Supplies expected weather for a date and location.
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &str;

    fn weather_for(&self, date: NaiveDate, latitude: f64, longitude: f64) -> DayWeather;
}

/// Typical Dutch weather per season. Ignores the location.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonalWeatherProvider;

impl WeatherProvider for SeasonalWeatherProvider {
    fn name(&self) -> &str {
        "seasonal"
    }

    fn weather_for(&self, date: NaiveDate, _latitude: f64, _longitude: f64) -> DayWeather {
        let seasonal = SeasonalWeather::for_month(date.month());
        DayWeather {
            temperature: seasonal.temperature,
            description: seasonal.description.to_string(),
        }
    }
}

/// Fill whatever the caller left out from `provider`.
pub fn resolve_weather(
    provider: &dyn WeatherProvider,
    date: NaiveDate,
    latitude: f64,
    longitude: f64,
    temperature: Option<f64>,
    description: Option<&str>,
) -> (DayWeather, WeatherSource) {
    let description = description.map(str::trim).filter(|d| !d.is_empty());
    match (temperature, description) {
        (Some(temperature), Some(description)) => (
            DayWeather {
                temperature,
                description: description.to_string(),
            },
            WeatherSource::Request,
        ),
        (temperature, description) => {
            let fallback = provider.weather_for(date, latitude, longitude);
            let source = if temperature.is_some() || description.is_some() {
                WeatherSource::Partial
            } else {
                WeatherSource::Provider
            };
            tracing::warn!(
                provider = provider.name(),
                date = %date,
                "weather not supplied, using provider values"
            );
            (
                DayWeather {
                    temperature: temperature.unwrap_or(fallback.temperature),
                    description: description
                        .map(str::to_string)
                        .unwrap_or(fallback.description),
                },
                source,
            )
        }
    }
}
