pub mod correlation;
pub mod model_info;
pub mod prediction;
pub mod request;
pub mod training;

pub use correlation::{
    ChartData, CorrelationResponse, CorrelationScatter, CorrelationStrength, DailyWeather,
    TemperatureSeries, WeatherDistribution,
};
pub use model_info::{HealthResponse, KindScores, ModelInfoResponse};
pub use prediction::{CategoryForecast, Location, PredictionResponse, WeatherUsed};
pub use request::{CorrelationRequest, PredictionRequest};
pub use training::{CategoryTrainingResult, TrainingReportResponse};
