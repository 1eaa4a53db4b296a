use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::engine::TrainerConfig;
use crate::error::{Result, WasteError};
use crate::learner::{ForestParams, TreeParams};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON array of trash items; synthetic data is used when unset.
    pub trash_data_path: Option<PathBuf>,
    pub weather_data_path: Option<PathBuf>,
    pub synthetic_days: u32,
    pub synthetic_seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub split_seed: u64,
    pub test_ratio: f64,
    pub min_training_rows: usize,
    pub tree_max_depth: usize,
    pub forest_trees: usize,
    pub forest_max_depth: usize,
    pub model_seed: u64,
    pub train_on_startup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub default_latitude: f64,
    pub default_longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub training: TrainingConfig,
    pub location: LocationConfig,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: std::env::var("LISTEN_ADDR")
                    .unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            },
            data: DataConfig {
                trash_data_path: env_path("TRASH_DATA_PATH"),
                weather_data_path: env_path("WEATHER_DATA_PATH"),
                synthetic_days: env_or("SYNTHETIC_DAYS", 365),
                synthetic_seed: env_or("SYNTHETIC_SEED", 7),
            },
            training: TrainingConfig {
                split_seed: env_or("SPLIT_SEED", 42),
                test_ratio: env_or("TEST_RATIO", 0.3),
                min_training_rows: env_or("MIN_TRAINING_ROWS", 5),
                tree_max_depth: env_or("TREE_MAX_DEPTH", 2),
                forest_trees: env_or("FOREST_TREES", 1000),
                forest_max_depth: env_or("FOREST_MAX_DEPTH", 5),
                model_seed: env_or("MODEL_SEED", 42),
                train_on_startup: env_or("TRAIN_ON_STARTUP", true),
            },
            location: LocationConfig {
                default_latitude: env_or("DEFAULT_LATITUDE", 51.5890),
                default_longitude: env_or("DEFAULT_LONGITUDE", 4.7750),
            },
        }
    }

    /// Reject settings that would make every training pass fail.
    pub fn validate(&self) -> Result<()> {
        let training = &self.training;
        if !(training.test_ratio > 0.0 && training.test_ratio < 1.0) {
            return Err(WasteError::config(format!(
                "TEST_RATIO must be between 0 and 1, got {}",
                training.test_ratio
            )));
        }
        if training.forest_trees == 0 {
            return Err(WasteError::config("FOREST_TREES must be at least 1"));
        }
        if training.min_training_rows < 2 {
            return Err(WasteError::config("MIN_TRAINING_ROWS must be at least 2"));
        }
        if self.data.trash_data_path.is_none() && self.data.synthetic_days == 0 {
            return Err(WasteError::config(
                "SYNTHETIC_DAYS must be positive when TRASH_DATA_PATH is unset",
            ));
        }
        if !self.location.default_latitude.is_finite() || !self.location.default_longitude.is_finite() {
            return Err(WasteError::config("default location must be finite"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl TrainingConfig {
    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig {
            test_ratio: self.test_ratio,
            split_seed: self.split_seed,
            model_seed: self.model_seed,
            min_training_rows: self.min_training_rows,
            tree: TreeParams::with_max_depth(self.tree_max_depth),
            forest: ForestParams {
                n_estimators: self.forest_trees,
                tree: TreeParams::with_max_depth(self.forest_max_depth),
                bootstrap: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8000");
        assert_eq!(config.training.forest_trees, 1000);
        assert_eq!(config.training.tree_max_depth, 2);
        assert_eq!(config.training.split_seed, 42);
        assert_eq!(config.location.default_latitude, 51.5890);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_trainer_config_mapping() {
        let trainer = Config::default().training.trainer_config();
        assert_eq!(trainer.tree.max_depth, 2);
        assert_eq!(trainer.forest.tree.max_depth, 5);
        assert_eq!(trainer.forest.n_estimators, 1000);
        assert_eq!(trainer.test_ratio, 0.3);
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let mut config = Config::default();
        config.training.test_ratio = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.training.forest_trees = 0;
        assert!(config.validate().is_err());
    }
}
