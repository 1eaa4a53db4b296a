//! Weather lookup tables.
//!
//! Two vocabularies meet here: free-text weather descriptions (as stored
//! with historical records and sent by clients) and WMO weather codes as
//! published by Open-Meteo. Models only ever see the small numeric code
//! produced by [`WeatherCodeTable`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::calendar::Season;

/// Model code used for descriptions missing from the table ("partly cloudy").
pub const UNKNOWN_WEATHER_CODE: u8 = 1;

/// Description stored when a record carries no weather at all.
pub const DEFAULT_WEATHER_DESCRIPTION: &str = "Cloudy";

/// Temperature stored when a record carries no temperature.
pub const DEFAULT_TEMPERATURE_C: f64 = 15.0;

const DEFAULT_ENTRIES: &[(&str, u8)] = &[
    ("Sunny", 0),
    ("Zonnig", 0),
    ("Partly cloudy", 1),
    ("Gedeeltelijk bewolkt", 1),
    ("Unknown", 1),
    ("Onbekend", 1),
    ("Cloudy", 2),
    ("Bewolkt", 2),
    ("Rainy", 3),
    ("Regenachtig", 3),
    ("Rain", 3),
    ("Regen", 3),
    ("Light rain", 3),
    ("Lichte regen", 3),
    ("Heavy rain", 3),
    ("Zware regen", 3),
    ("Light drizzle", 3),
    ("Lichte motregen", 3),
    ("Drizzle", 3),
    ("Motregen", 3),
    ("Showers", 3),
    ("Buien", 3),
    ("Thunderstorm", 4),
    ("Onweer", 4),
    ("Snow", 5),
    ("Sneeuw", 5),
    ("Foggy", 6),
    ("Mistig", 6),
];

/// Maps weather descriptions to the numeric code models were trained on.
///
/// Lookups are case-insensitive and ignore surrounding whitespace.
#[derive(Debug, Clone)]
pub struct WeatherCodeTable {
    codes: BTreeMap<String, u8>,
    labels: Vec<String>,
    unknown_code: u8,
}

impl WeatherCodeTable {
    pub fn new(entries: &[(&str, u8)], unknown_code: u8) -> Self {
        let codes = entries
            .iter()
            .map(|(label, code)| (normalise(label), *code))
            .collect();
        let labels = entries.iter().map(|(label, _)| label.to_string()).collect();
        Self {
            codes,
            labels,
            unknown_code,
        }
    }

    /// Code for `description`, or `None` when the table has no entry.
    pub fn lookup(&self, description: &str) -> Option<u8> {
        self.codes.get(&normalise(description)).copied()
    }

    /// Code for `description`, substituting the unknown code for misses.
    pub fn code_for(&self, description: &str) -> u8 {
        match self.lookup(description) {
            Some(code) => code,
            None => {
                tracing::warn!(
                    description,
                    code = self.unknown_code,
                    "Unknown weather description, using default code"
                );
                self.unknown_code
            }
        }
    }

    pub fn unknown_code(&self) -> u8 {
        self.unknown_code
    }

    /// Descriptions accepted by the table, in configuration order.
    pub fn supported_descriptions(&self) -> &[String] {
        &self.labels
    }
}

impl Default for WeatherCodeTable {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRIES, UNKNOWN_WEATHER_CODE)
    }
}

fn normalise(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Human readable description of an Open-Meteo (WMO) weather code.
pub fn describe_wmo_code(code: u16) -> &'static str {
    match code {
        0 => "Sunny",
        1 | 2 => "Partly cloudy",
        3 => "Cloudy",
        45 | 48 => "Foggy",
        51 => "Light drizzle",
        53 | 55 => "Drizzle",
        56 | 57 | 66 | 67 => "Freezing rain",
        61 => "Light rain",
        63 => "Rain",
        65 => "Heavy rain",
        71 => "Light snow",
        73 => "Snow",
        75 => "Heavy snow",
        77 => "Hail",
        80 => "Light showers",
        81 => "Showers",
        82 => "Heavy showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with hail",
        99 => "Severe thunderstorm",
        _ => DEFAULT_WEATHER_DESCRIPTION,
    }
}

/// Coarse weather grouping used by the correlation analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    Sunny,
    Cloudy,
    Foggy,
    Rainy,
    Snow,
    Thunderstorm,
    Other,
}

impl WeatherCategory {
    pub fn from_wmo_code(code: u16) -> Self {
        match code {
            0 => WeatherCategory::Sunny,
            1..=3 => WeatherCategory::Cloudy,
            45 | 48 => WeatherCategory::Foggy,
            51 | 53 | 55 | 61 | 63 | 65 | 80 | 81 | 82 => WeatherCategory::Rainy,
            71 | 73 | 75 | 77 | 85 | 86 => WeatherCategory::Snow,
            95 | 96 | 99 => WeatherCategory::Thunderstorm,
            _ => WeatherCategory::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeatherCategory::Sunny => "Sunny",
            WeatherCategory::Cloudy => "Cloudy",
            WeatherCategory::Foggy => "Foggy",
            WeatherCategory::Rainy => "Rainy",
            WeatherCategory::Snow => "Snow",
            WeatherCategory::Thunderstorm => "Thunderstorm",
            WeatherCategory::Other => "Other",
        }
    }
}

/// Typical weather for a month, used when no observation or forecast exists.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalWeather {
    pub temperature: f64,
    pub description: &'static str,
}

impl SeasonalWeather {
    pub fn for_month(month: u32) -> Self {
        match Season::from_month(month) {
            Season::Winter => Self {
                temperature: 5.0,
                description: "Cloudy",
            },
            Season::Spring => Self {
                temperature: 12.0,
                description: "Partly cloudy",
            },
            Season::Summer => Self {
                temperature: 20.0,
                description: "Sunny",
            },
            Season::Autumn => Self {
                temperature: 12.0,
                description: "Rainy",
            },
        }
    }
}
