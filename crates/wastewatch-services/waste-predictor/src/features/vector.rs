use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::CalendarFeatures;

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 10;

/// Model input names, in the order [`FeatureVector::to_array`] emits them.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "latitude",
    "longitude",
    "year",
    "month",
    "day",
    "weekday",
    "temperature",
    "weather_code",
    "is_weekend",
    "season",
];

/// The model input for one day at one location.
///
/// Both the feature table builder and the prediction engine construct
/// this struct by name; [`to_array`](Self::to_array) is the only place
/// that fixes the positional order models see.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub latitude: f64,
    pub longitude: f64,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub weekday: u32,
    pub temperature: f64,
    pub weather_code: u8,
    pub is_weekend: bool,
    pub season: u8,
}

impl FeatureVector {
    /// Assemble the vector for `date` at a location under given weather.
    pub fn assemble(
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
        temperature: f64,
        weather_code: u8,
    ) -> Self {
        let calendar = CalendarFeatures::from_date(date);
        Self {
            latitude,
            longitude,
            year: calendar.year,
            month: calendar.month,
            day: calendar.day,
            weekday: calendar.weekday,
            temperature,
            weather_code,
            is_weekend: calendar.is_weekend,
            season: calendar.season.code(),
        }
    }

    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.latitude,
            self.longitude,
            f64::from(self.year),
            f64::from(self.month),
            f64::from(self.day),
            f64::from(self.weekday),
            self.temperature,
            f64::from(self.weather_code),
            if self.is_weekend { 1.0 } else { 0.0 },
            f64::from(self.season),
        ]
    }

    /// True when every numeric input is finite.
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_follows_feature_names() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 6).unwrap(); // Sunday
        let vector = FeatureVector::assemble(date, 51.589, 4.775, 21.5, 0);
        let array = vector.to_array();

        assert_eq!(array.len(), FEATURE_NAMES.len());
        assert_eq!(array[0], 51.589);
        assert_eq!(array[1], 4.775);
        assert_eq!(array[2], 2025.0);
        assert_eq!(array[3], 7.0);
        assert_eq!(array[4], 6.0);
        assert_eq!(array[5], 6.0);
        assert_eq!(array[6], 21.5);
        assert_eq!(array[7], 0.0);
        assert_eq!(array[8], 1.0);
        assert_eq!(array[9], 2.0);
    }

    #[test]
    fn test_non_finite_detection() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert!(FeatureVector::assemble(date, 51.0, 4.0, 3.0, 2).is_finite());
        assert!(!FeatureVector::assemble(date, f64::NAN, 4.0, 3.0, 2).is_finite());
    }
}
