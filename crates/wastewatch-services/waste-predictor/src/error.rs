//! Error handling for the waste predictor service.

pub use wastewatch_error::{Result, WasteError};

/// Extension trait for predictor-specific error construction
pub trait PredictorErrorExt {
    /// Creates a models not loaded error
    fn models_not_loaded() -> WasteError {
        WasteError::unavailable("Models not loaded yet")
    }

    /// Creates a training in progress error
    fn training_in_progress() -> WasteError {
        WasteError::conflict("A training pass is already running")
    }

    /// Creates a training data unavailable error
    fn training_data_unavailable(reason: impl Into<String>) -> WasteError {
        WasteError::unavailable(format!("Training data unavailable: {}", reason.into()))
    }

    /// Creates an invalid date error
    fn invalid_date(value: impl Into<String>) -> WasteError {
        WasteError::invalid_input(
            "date",
            format!("'{}' is not a valid YYYY-MM-DD date", value.into()),
        )
    }

    /// Creates an invalid parameters error
    fn invalid_parameters(reason: impl Into<String>) -> WasteError {
        WasteError::invalid_input("parameters", reason)
    }
}

impl PredictorErrorExt for WasteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_not_loaded() {
        let err = WasteError::models_not_loaded();
        assert!(err.to_string().contains("not loaded"));
        assert!(err.is_retriable());
    }

    #[test]
    fn test_invalid_date() {
        let err = WasteError::invalid_date("2025-13-01");
        assert!(err.is_client_error());
        assert!(err.to_string().contains("2025-13-01"));
    }

    #[test]
    fn test_training_in_progress_is_conflict() {
        assert!(matches!(
            WasteError::training_in_progress(),
            WasteError::Conflict(_)
        ));
    }
}
