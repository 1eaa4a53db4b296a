pub mod calendar;
pub mod category;
pub mod table;
pub mod vector;
pub mod weather;

pub use calendar::{CalendarFeatures, Season};
pub use category::Category;
pub use table::{FeatureTable, FeatureTableBuilder, TrainingRow, TrashItem, WeatherRecord};
pub use vector::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use weather::{
    describe_wmo_code, SeasonalWeather, WeatherCategory, WeatherCodeTable, UNKNOWN_WEATHER_CODE,
};
