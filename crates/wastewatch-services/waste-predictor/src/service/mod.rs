pub mod correlation;
pub mod data_source;
pub mod prediction_service;
pub mod weather;

pub use correlation::{analyze_correlation, correlation_window, pearson, synthetic_weather};
pub use data_source::{JsonFileSource, SyntheticSource, TrainingData, TrainingDataSource};
pub use prediction_service::{parse_date, PredictionService};
pub use weather::{resolve_weather, DayWeather, SeasonalWeatherProvider, WeatherProvider, WeatherSource};
