use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::correlation::{analyze_correlation, correlation_window, synthetic_weather};
use super::data_source::{JsonFileSource, SyntheticSource, TrainingDataSource};
use super::weather::{resolve_weather, SeasonalWeatherProvider, WeatherProvider};
use crate::config::Config;
use crate::engine::{
    ModelKind, ModelRegistry, PredictionEngine, PredictionInput, RegistryHandle, Trainer,
    TrainingError, TrainingReport,
};
use crate::error::{PredictorErrorExt, Result, WasteError};
use crate::features::{Category, FeatureTableBuilder, WeatherCodeTable};
use crate::models::{
    CategoryForecast, CorrelationRequest, CorrelationResponse, HealthResponse, KindScores,
    Location, ModelInfoResponse, PredictionRequest, PredictionResponse, TrainingReportResponse,
    WeatherUsed,
};

const API_VERSION: &str = env!("CARGO_PKG_VERSION");
const MAX_DAYS_BACK: u32 = 366;

/// Serving-side owner of the model registry.
///
/// Predictions read one registry snapshot each. Training runs on the
/// caller's thread, one pass at a time, and publishes a new snapshot only
/// when at least one category trained. A first pass that fails for any
/// reason publishes an empty snapshot, so every category then predicts
/// 0 / `none`.
pub struct PredictionService {
    config: Config,
    source: Box<dyn TrainingDataSource>,
    weather: Box<dyn WeatherProvider>,
    weather_codes: WeatherCodeTable,
    registry: RegistryHandle,
    training: Mutex<()>,
    last_report: RwLock<Option<TrainingReport>>,
}

impl PredictionService {
    pub fn new(
        config: Config,
        source: Box<dyn TrainingDataSource>,
        weather: Box<dyn WeatherProvider>,
    ) -> Self {
        Self {
            config,
            source,
            weather,
            weather_codes: WeatherCodeTable::default(),
            registry: RegistryHandle::default(),
            training: Mutex::new(()),
            last_report: RwLock::new(None),
        }
    }

    /// JSON files when `TRASH_DATA_PATH` is set, synthetic data otherwise.
    pub fn from_config(config: Config) -> Self {
        let source: Box<dyn TrainingDataSource> = match &config.data.trash_data_path {
            Some(path) => Box::new(JsonFileSource::new(
                path.clone(),
                config.data.weather_data_path.clone(),
            )),
            None => Box::new(SyntheticSource::new(
                config.data.synthetic_days,
                config.data.synthetic_seed,
                Utc::now().date_naive(),
            )),
        };
        Self::new(config, source, Box::new(SeasonalWeatherProvider))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> Arc<ModelRegistry> {
        self.registry.snapshot()
    }

    pub fn is_ready(&self) -> bool {
        !self.registry.snapshot().is_empty()
    }

    pub fn is_training(&self) -> bool {
        self.training.is_locked()
    }

    pub fn last_report(&self) -> Option<TrainingReport> {
        self.last_report.read().clone()
    }

    /// Run one full training pass and publish the result.
    ///
    /// Blocks for the duration of the pass; call from a blocking context.
    pub fn train(&self) -> Result<TrainingReportResponse> {
        let Some(_guard) = self.training.try_lock() else {
            return Err(WasteError::training_in_progress());
        };

        tracing::info!(source = self.source.name(), "loading training data");
        let data = match self.source.load() {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "training data source failed");
                self.publish_empty_if_unloaded(Utc::now());
                return Err(WasteError::training_data_unavailable(e.to_string()));
            }
        };
        let table = FeatureTableBuilder::new(&self.weather_codes).build(&data.trash, &data.weather);

        let trainer = Trainer::new(self.config.training.trainer_config());
        match trainer.train(&table) {
            Ok(run) => {
                let response = TrainingReportResponse::from(&run.report);
                self.registry.publish(run.registry);
                *self.last_report.write() = Some(run.report);
                Ok(response)
            }
            Err(TrainingError::TrainingDataUnavailable { rows, required }) => {
                self.publish_empty_if_unloaded(Utc::now());
                Err(WasteError::training_data_unavailable(format!(
                    "{} usable days, need at least {}",
                    rows, required
                )))
            }
            Err(err @ TrainingError::NoCategoryTrained { .. }) => {
                let message = err.to_string();
                if let TrainingError::NoCategoryTrained { report } = err {
                    self.publish_empty_if_unloaded(report.finished_at);
                    *self.last_report.write() = Some(*report);
                }
                Err(WasteError::training(message))
            }
        }
    }

    /// Publish an empty snapshot unless one was already published, so a
    /// failed first pass still serves 0 / `none` predictions.
    fn publish_empty_if_unloaded(&self, at: DateTime<Utc>) {
        if self.registry.snapshot().trained_at().is_none() {
            self.registry.publish(ModelRegistry::new(BTreeMap::new(), at));
        }
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        let date = parse_date(&request.date)?;
        let latitude = request
            .latitude
            .unwrap_or(self.config.location.default_latitude);
        let longitude = request
            .longitude
            .unwrap_or(self.config.location.default_longitude);
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(WasteError::invalid_parameters(
                "latitude and longitude must be finite",
            ));
        }
        if request.temperature.is_some_and(|t| !t.is_finite()) {
            return Err(WasteError::invalid_parameters("temperature must be finite"));
        }

        let registry = self.registry.snapshot();
        if registry.trained_at().is_none() {
            return Err(WasteError::models_not_loaded());
        }

        let (weather, weather_source) = resolve_weather(
            self.weather.as_ref(),
            date,
            latitude,
            longitude,
            request.temperature,
            request.weather_description.as_deref(),
        );

        let engine = PredictionEngine::new(&registry, &self.weather_codes);
        let prediction = engine.predict(&PredictionInput {
            date,
            latitude,
            longitude,
            temperature: weather.temperature,
            weather_description: weather.description.clone(),
        });

        tracing::info!(
            date = %date,
            total = prediction.total,
            model_type = ?prediction.overall_kind,
            "prediction served"
        );

        let predictions = prediction
            .categories
            .iter()
            .map(|(category, p)| {
                (
                    category.to_string(),
                    CategoryForecast {
                        count: p.count,
                        confidence: p.confidence,
                        model_used: p.kind,
                        r2: p.r2,
                        decision_tree_confidence: p.tree_confidence,
                        random_forest_confidence: p.forest_confidence,
                    },
                )
            })
            .collect();

        Ok(PredictionResponse {
            date: date.format("%Y-%m-%d").to_string(),
            location: Location {
                latitude,
                longitude,
            },
            weather: WeatherUsed {
                temperature: weather.temperature,
                description: weather.description,
                weather_code: prediction.features.weather_code,
                source: weather_source,
            },
            predictions,
            total: prediction.total,
            average_confidence: prediction.average_confidence,
            average_r2: prediction.average_r2,
            model_type: prediction.overall_kind,
        })
    }

    pub fn model_info(&self) -> Result<ModelInfoResponse> {
        let registry = self.registry.snapshot();
        if registry.is_empty() {
            return Err(WasteError::models_not_loaded());
        }
        let info = registry.info();

        let scores = info
            .scores
            .iter()
            .map(|(category, per_kind)| {
                (
                    category.to_string(),
                    KindScores {
                        decision_tree: per_kind.get(&ModelKind::Tree).copied(),
                        random_forest: per_kind.get(&ModelKind::Forest).copied(),
                    },
                )
            })
            .collect();

        Ok(ModelInfoResponse {
            best_model_type: info.best_kind,
            scores,
            average_r2: KindScores {
                decision_tree: info.average_scores.get(&ModelKind::Tree).copied(),
                random_forest: info.average_scores.get(&ModelKind::Forest).copied(),
            },
            features: info.feature_names.iter().map(|s| s.to_string()).collect(),
            weather_types: self.weather_codes.supported_descriptions().to_vec(),
            targets: Category::ALL.iter().map(|c| c.to_string()).collect(),
            trained_at: info.trained_at,
        })
    }

    pub fn health(&self) -> HealthResponse {
        let registry = self.registry.snapshot();
        let models_loaded = !registry.is_empty();
        HealthResponse {
            status: if models_loaded { "healthy" } else { "starting" }.to_string(),
            models_loaded,
            training: self.is_training(),
            available_targets: registry.categories().map(|c| c.to_string()).collect(),
            api_version: API_VERSION.to_string(),
        }
    }

    pub fn analyze_correlation(&self, request: &CorrelationRequest) -> Result<CorrelationResponse> {
        if request.days_back == 0 || request.days_back > MAX_DAYS_BACK {
            return Err(WasteError::invalid_parameters(format!(
                "days_back must be within 1..={}",
                MAX_DAYS_BACK
            )));
        }
        let reference = match &request.reference_date {
            Some(value) => parse_date(value)?,
            None => Utc::now().date_naive(),
        };
        let (start, end) = correlation_window(reference, request.days_back);

        let response = match &request.weather {
            Some(weather) => analyze_correlation(&request.trash_items, weather, start, end),
            None => {
                tracing::warn!("no weather series supplied, generating seasonal series");
                let weather = synthetic_weather(start, end, self.config.data.synthetic_seed);
                analyze_correlation(&request.trash_items, &weather, start, end)
            }
        };
        Ok(response)
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| WasteError::invalid_date(value))
}
