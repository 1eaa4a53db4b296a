use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One day of observed weather.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyWeather {
    pub date: NaiveDate,
    pub temperature_max: f64,
    pub temperature_min: f64,
    /// Millimetres.
    pub precipitation: f64,
    /// WMO weather code.
    pub weather_code: u16,
}

impl DailyWeather {
    pub fn average_temperature(&self) -> f64 {
        (self.temperature_max + self.temperature_min) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
    None,
}

impl CorrelationStrength {
    /// |r| > 0.7 strong, > 0.4 moderate, > 0.2 weak.
    pub fn from_coefficient(r: f64) -> Self {
        let r = r.abs();
        if r > 0.7 {
            CorrelationStrength::Strong
        } else if r > 0.4 {
            CorrelationStrength::Moderate
        } else if r > 0.2 {
            CorrelationStrength::Weak
        } else {
            CorrelationStrength::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CorrelationStrength::Strong => "Strong correlation",
            CorrelationStrength::Moderate => "Moderate correlation",
            CorrelationStrength::Weak => "Weak correlation",
            CorrelationStrength::None => "No significant correlation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemperatureSeries {
    /// `dd-mm` per day.
    pub labels: Vec<String>,
    pub temperature: Vec<f64>,
    pub trash_count: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherDistribution {
    pub labels: Vec<String>,
    pub values: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CorrelationScatter {
    pub temperature: Vec<f64>,
    pub trash_count: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartData {
    pub temperature_data: TemperatureSeries,
    pub weather_distribution: WeatherDistribution,
    pub correlation_scatter: CorrelationScatter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CorrelationResponse {
    /// Pearson r of average temperature against daily trash count.
    pub correlation_coefficient: f64,
    pub correlation_strength: CorrelationStrength,
    pub correlation_label: String,
    pub temperature_correlation: f64,
    pub precipitation_correlation: f64,
    pub sunny_weather_percentage: f64,
    pub rainy_weather_percentage: f64,
    pub sunny_average_trash: f64,
    pub rainy_average_trash: f64,
    pub days_analyzed: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub insights: Vec<String>,
    pub chart_data: ChartData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_thresholds() {
        assert_eq!(CorrelationStrength::from_coefficient(0.75), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_coefficient(-0.5), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_coefficient(0.3), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::from_coefficient(0.2), CorrelationStrength::None);
        assert_eq!(CorrelationStrength::None.label(), "No significant correlation");
    }

    #[test]
    fn test_average_temperature() {
        let day = DailyWeather {
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            temperature_max: 20.0,
            temperature_min: 10.0,
            precipitation: 0.0,
            weather_code: 0,
        };
        assert_eq!(day.average_temperature(), 15.0);
    }
}
