//! Waste prediction service: per-category litter forecasts from competing
//! decision tree and random forest models, plus weather correlation analysis.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod learner;
pub mod models;
pub mod service;

pub use config::Config;
pub use error::{PredictorErrorExt, Result, WasteError};
pub use service::PredictionService;
