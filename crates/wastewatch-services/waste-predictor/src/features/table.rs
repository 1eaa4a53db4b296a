//! Feature table construction.
//!
//! Raw detections (one record per piece of litter) and weather records are
//! folded into one [`TrainingRow`] per calendar day. The trainer only ever
//! sees the resulting [`FeatureTable`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::category::Category;
use super::vector::{FeatureVector, FEATURE_COUNT};
use super::weather::{WeatherCodeTable, DEFAULT_TEMPERATURE_C, DEFAULT_WEATHER_DESCRIPTION};

/// A single litter detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrashItem {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(alias = "LitterType")]
    pub litter_type: String,
    #[serde(alias = "Latitude")]
    pub latitude: f64,
    #[serde(alias = "Longitude")]
    pub longitude: f64,
    #[serde(alias = "Timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// A historical weather observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    #[serde(alias = "Timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(alias = "Temperature")]
    pub temperature: f64,
    #[serde(alias = "WeatherDescription")]
    pub weather_description: String,
}

/// One historical day: model inputs plus observed counts per category.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub date: NaiveDate,
    pub features: FeatureVector,
    pub counts: BTreeMap<Category, u32>,
}

impl TrainingRow {
    pub fn count(&self, category: Category) -> u32 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Derived "Total" category; never trained as its own target.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

/// Daily rows in ascending date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<TrainingRow>,
}

impl FeatureTable {
    pub fn new(mut rows: Vec<TrainingRow>) -> Self {
        rows.sort_by_key(|row| row.date);
        Self { rows }
    }

    pub fn rows(&self) -> &[TrainingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature matrix in model input order.
    pub fn feature_matrix(&self) -> Vec<[f64; FEATURE_COUNT]> {
        self.rows.iter().map(|row| row.features.to_array()).collect()
    }

    /// Observed counts for one category, aligned with [`feature_matrix`](Self::feature_matrix).
    pub fn targets(&self, category: Category) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| f64::from(row.count(category)))
            .collect()
    }
}

#[derive(Debug, Default)]
struct DayAccumulator {
    temperature_sum: f64,
    observations: usize,
    description: Option<String>,
}

/// Folds detections and weather records into a [`FeatureTable`].
pub struct FeatureTableBuilder<'a> {
    weather_codes: &'a WeatherCodeTable,
}

impl<'a> FeatureTableBuilder<'a> {
    pub fn new(weather_codes: &'a WeatherCodeTable) -> Self {
        Self { weather_codes }
    }

    pub fn build(&self, trash: &[TrashItem], weather: &[WeatherRecord]) -> FeatureTable {
        let mut by_day: BTreeMap<NaiveDate, Vec<&TrashItem>> = BTreeMap::new();
        let mut dropped = 0usize;
        for item in trash {
            if !item.latitude.is_finite() || !item.longitude.is_finite() {
                dropped += 1;
                continue;
            }
            by_day
                .entry(item.timestamp.date_naive())
                .or_default()
                .push(item);
        }
        if dropped > 0 {
            tracing::warn!(dropped, "Dropped detections with non-finite coordinates");
        }

        let mut weather_by_day: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
        for record in weather {
            let day = weather_by_day
                .entry(record.timestamp.date_naive())
                .or_default();
            if record.temperature.is_finite() {
                day.temperature_sum += record.temperature;
                day.observations += 1;
            }
            if day.description.is_none() {
                day.description = Some(record.weather_description.clone());
            }
        }

        let rows = by_day
            .into_iter()
            .map(|(date, items)| {
                let (temperature, description) = match weather_by_day.get(&date) {
                    Some(w) => (
                        if w.observations > 0 {
                            w.temperature_sum / w.observations as f64
                        } else {
                            DEFAULT_TEMPERATURE_C
                        },
                        w.description
                            .as_deref()
                            .unwrap_or(DEFAULT_WEATHER_DESCRIPTION),
                    ),
                    None => (DEFAULT_TEMPERATURE_C, DEFAULT_WEATHER_DESCRIPTION),
                };

                let latitude = median(items.iter().map(|i| i.latitude).collect());
                let longitude = median(items.iter().map(|i| i.longitude).collect());

                let mut counts: BTreeMap<Category, u32> =
                    Category::ALL.iter().map(|c| (*c, 0)).collect();
                for item in &items {
                    if let Some(category) = Category::from_litter_type(&item.litter_type) {
                        *counts.entry(category).or_insert(0) += 1;
                    }
                }

                TrainingRow {
                    date,
                    features: FeatureVector::assemble(
                        date,
                        latitude,
                        longitude,
                        temperature,
                        self.weather_codes.code_for(description),
                    ),
                    counts,
                }
            })
            .collect();

        FeatureTable::new(rows)
    }
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(id: &str, litter_type: &str, lat: f64, day: u32, hour: u32) -> TrashItem {
        TrashItem {
            id: id.to_string(),
            litter_type: litter_type.to_string(),
            latitude: lat,
            longitude: 4.775,
            timestamp: Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap(),
        }
    }

    fn weather(day: u32, temperature: f64, description: &str) -> WeatherRecord {
        WeatherRecord {
            timestamp: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
            temperature,
            weather_description: description.to_string(),
        }
    }

    #[test]
    fn test_groups_items_per_day() {
        let table = WeatherCodeTable::default();
        let builder = FeatureTableBuilder::new(&table);
        let trash = vec![
            item("1", "Plastic", 51.58, 3, 9),
            item("2", "Papier", 51.60, 3, 10),
            item("3", "Plastic", 51.59, 3, 11),
            item("4", "Glas", 51.59, 4, 9),
        ];
        let result = builder.build(&trash, &[]);

        assert_eq!(result.len(), 2);
        let first = &result.rows()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(first.count(Category::Plastic), 2);
        assert_eq!(first.count(Category::Paper), 1);
        assert_eq!(first.count(Category::Glass), 0);
        assert_eq!(first.total(), 3);
        assert!((first.features.latitude - 51.59).abs() < 1e-12);
    }

    #[test]
    fn test_missing_weather_uses_defaults() {
        let table = WeatherCodeTable::default();
        let builder = FeatureTableBuilder::new(&table);
        let result = builder.build(&[item("1", "Plastic", 51.58, 5, 9)], &[]);

        let row = &result.rows()[0];
        assert_eq!(row.features.temperature, DEFAULT_TEMPERATURE_C);
        assert_eq!(row.features.weather_code, 2);
    }

    #[test]
    fn test_weather_joined_by_day() {
        let table = WeatherCodeTable::default();
        let builder = FeatureTableBuilder::new(&table);
        let trash = vec![item("1", "Organisch", 51.58, 6, 9)];
        let weather = vec![weather(6, 10.0, "Zonnig"), weather(6, 14.0, "Regen")];
        let result = builder.build(&trash, &weather);

        let row = &result.rows()[0];
        assert_eq!(row.features.temperature, 12.0);
        assert_eq!(row.features.weather_code, 0);
        assert_eq!(row.count(Category::Organic), 1);
    }

    #[test]
    fn test_other_labels_are_not_counted() {
        let table = WeatherCodeTable::default();
        let builder = FeatureTableBuilder::new(&table);
        let result = builder.build(&[item("1", "Metaal", 51.58, 7, 9)], &[]);

        assert_eq!(result.len(), 1);
        assert_eq!(result.rows()[0].total(), 0);
    }

    #[test]
    fn test_targets_align_with_matrix() {
        let table = WeatherCodeTable::default();
        let builder = FeatureTableBuilder::new(&table);
        let trash = vec![
            item("1", "Plastic", 51.58, 8, 9),
            item("2", "Plastic", 51.58, 9, 9),
            item("3", "Plastic", 51.58, 9, 10),
        ];
        let result = builder.build(&trash, &[]);

        assert_eq!(result.feature_matrix().len(), 2);
        assert_eq!(result.targets(Category::Plastic), vec![1.0, 2.0]);
    }

    #[test]
    fn test_deserializes_backend_payload() {
        let json = r#"[{"Id":"a1","LitterType":"Plastic","Latitude":51.59,"Longitude":4.77,"Timestamp":"2025-06-01T10:00:00Z"}]"#;
        let items: Vec<TrashItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items[0].litter_type, "Plastic");

        let json = r#"[{"id":"a2","litterType":"Glas","latitude":51.59,"longitude":4.77,"timestamp":"2025-06-01T10:00:00Z"}]"#;
        let items: Vec<TrashItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items[0].id, "a2");
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![]), 0.0);
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), 2.5);
    }
}
