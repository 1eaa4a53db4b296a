//! Where training records come from.

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::features::{TrashItem, WeatherRecord};

/// Raw records a training pass starts from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingData {
    pub trash: Vec<TrashItem>,
    pub weather: Vec<WeatherRecord>,
}

/// A provider of historical trash and weather records.
pub trait TrainingDataSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn load(&self) -> Result<TrainingData>;
}

/// Trash items (and optionally weather records) stored as JSON arrays.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    trash_path: PathBuf,
    weather_path: Option<PathBuf>,
}

impl JsonFileSource {
    pub fn new(trash_path: impl Into<PathBuf>, weather_path: Option<PathBuf>) -> Self {
        Self {
            trash_path: trash_path.into(),
            weather_path,
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl TrainingDataSource for JsonFileSource {
    fn name(&self) -> &str {
        "json"
    }

    fn load(&self) -> Result<TrainingData> {
        let trash: Vec<TrashItem> = Self::read_json(&self.trash_path)?;
        let weather: Vec<WeatherRecord> = match &self.weather_path {
            Some(path) => Self::read_json(path)?,
            None => Vec::new(),
        };
        tracing::info!(
            trash_items = trash.len(),
            weather_records = weather.len(),
            path = %self.trash_path.display(),
            "loaded training data"
        );
        Ok(TrainingData { trash, weather })
    }
}

struct Area {
    latitude: (f64, f64),
    longitude: (f64, f64),
}

const AREAS: [Area; 5] = [
    // Grote Markt
    Area {
        latitude: (51.5890, 51.5900),
        longitude: (4.7750, 4.7765),
    },
    // Centraal Station
    Area {
        latitude: (51.5953, 51.5963),
        longitude: (4.7787, 4.7797),
    },
    // Valkenberg
    Area {
        latitude: (51.5929, 51.5939),
        longitude: (4.7791, 4.7801),
    },
    // Havermarkt
    Area {
        latitude: (51.5920, 51.5925),
        longitude: (4.7685, 4.7695),
    },
    // Wilhelminapark
    Area {
        latitude: (51.5860, 51.5866),
        longitude: (4.7848, 4.7856),
    },
];

/// Cumulative litter mix: plastic 45%, paper 25%, organic 20%, glass 10%.
const LITTER_MIX: [(&str, f64); 4] = [
    ("Plastic", 0.45),
    ("Papier", 0.70),
    ("Organisch", 0.90),
    ("Glas", 1.0),
];

/// Seeded generator of plausible city-centre detections and weather.
///
/// Daily volume grows with temperature and on weekends and drops on rainy
/// days, so the generated history has structure for the models to find.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    days: u32,
    seed: u64,
    end_date: NaiveDate,
}

impl SyntheticSource {
    pub fn new(days: u32, seed: u64, end_date: NaiveDate) -> Self {
        Self {
            days,
            seed,
            end_date,
        }
    }

    fn litter_type(roll: f64) -> &'static str {
        LITTER_MIX
            .iter()
            .find(|(_, cumulative)| roll <= *cumulative)
            .map_or("Plastic", |(label, _)| label)
    }
}

impl TrainingDataSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn load(&self) -> Result<TrainingData> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut data = TrainingData::default();
        let start = self.end_date - Duration::days(i64::from(self.days.saturating_sub(1)));

        for offset in 0..self.days {
            let date = start + Duration::days(i64::from(offset));
            let Some(noon) = date.and_hms_opt(12, 0, 0) else {
                continue;
            };
            let noon = Utc.from_utc_datetime(&noon);

            let day_of_year = f64::from(date.ordinal());
            let seasonal = 12.0 + 8.0 * ((day_of_year - 80.0) * 2.0 * PI / 365.0).sin();
            let temperature = ((seasonal + rng.gen_range(-3.0..3.0)) * 10.0).round() / 10.0;
            let rainy = rng.gen_bool(0.3);
            let description = if rainy {
                "Regenachtig"
            } else if rng.gen_bool(0.4) {
                "Zonnig"
            } else {
                "Bewolkt"
            };
            data.weather.push(WeatherRecord {
                timestamp: noon,
                temperature,
                weather_description: description.to_string(),
            });

            let weekend = date.weekday().number_from_monday() >= 6;
            let mut volume = 8.0 + (temperature - 10.0).max(0.0) * 0.6;
            if weekend {
                volume += 5.0;
            }
            if rainy {
                volume -= 4.0;
            }
            let volume = (volume.max(0.0) * rng.gen_range(0.7..1.3)).round() as u32;

            for _ in 0..volume {
                let area = &AREAS[rng.gen_range(0..AREAS.len())];
                let latitude = rng.gen_range(area.latitude.0..area.latitude.1);
                let longitude = rng.gen_range(area.longitude.0..area.longitude.1);
                let minutes = rng.gen_range(8 * 60..20 * 60);
                data.trash.push(TrashItem {
                    id: format!("synthetic-{}", data.trash.len() + 1),
                    litter_type: Self::litter_type(rng.gen::<f64>()).to_string(),
                    latitude,
                    longitude,
                    timestamp: noon - Duration::hours(12) + Duration::minutes(minutes),
                });
            }
        }

        tracing::info!(
            days = self.days,
            trash_items = data.trash.len(),
            "generated synthetic training data"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Category;
    use std::io::Write;

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    #[test]
    fn test_synthetic_is_deterministic() {
        let a = SyntheticSource::new(30, 7, end()).load().unwrap();
        let b = SyntheticSource::new(30, 7, end()).load().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.weather.len(), 30);
        assert!(!a.trash.is_empty());
    }

    #[test]
    fn test_synthetic_covers_window() {
        let data = SyntheticSource::new(10, 7, end()).load().unwrap();
        let first = data.weather.first().unwrap().timestamp.date_naive();
        let last = data.weather.last().unwrap().timestamp.date_naive();
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 6, 21).unwrap());
        assert_eq!(last, end());
        assert!(data
            .trash
            .iter()
            .all(|t| t.timestamp.date_naive() >= first && t.timestamp.date_naive() <= last));
    }

    #[test]
    fn test_synthetic_labels_normalise() {
        let data = SyntheticSource::new(60, 7, end()).load().unwrap();
        assert!(data
            .trash
            .iter()
            .all(|t| Category::from_litter_type(&t.litter_type).is_some()));
    }

    #[test]
    fn test_litter_mix() {
        assert_eq!(SyntheticSource::litter_type(0.1), "Plastic");
        assert_eq!(SyntheticSource::litter_type(0.5), "Papier");
        assert_eq!(SyntheticSource::litter_type(0.85), "Organisch");
        assert_eq!(SyntheticSource::litter_type(0.99), "Glas");
    }

    #[test]
    fn test_json_source_reads_files() {
        let mut trash = tempfile::NamedTempFile::new().unwrap();
        write!(
            trash,
            r#"[{{"Id":"1","LitterType":"Plastic","Latitude":51.59,"Longitude":4.77,"Timestamp":"2025-05-01T10:00:00Z"}}]"#
        )
        .unwrap();
        let mut weather = tempfile::NamedTempFile::new().unwrap();
        write!(
            weather,
            r#"[{{"timestamp":"2025-05-01T12:00:00Z","temperature":14.5,"weatherDescription":"Zonnig"}}]"#
        )
        .unwrap();

        let source = JsonFileSource::new(trash.path(), Some(weather.path().to_path_buf()));
        let data = source.load().unwrap();
        assert_eq!(data.trash.len(), 1);
        assert_eq!(data.trash[0].litter_type, "Plastic");
        assert_eq!(data.weather[0].temperature, 14.5);
    }

    #[test]
    fn test_json_source_missing_file() {
        let source = JsonFileSource::new("/nonexistent/trash.json", None);
        assert!(source.load().is_err());
    }
}
