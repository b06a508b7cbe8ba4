//! Error types for the prognosis crate

use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum PrognosisError {
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Dataset could not be read, parsed, or converted
    #[error("Data error: {0}")]
    DataError(String),

    /// Invalid argument or state
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Shape mismatch between related arrays
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    /// Model name is not one of the supported classifiers
    #[error("Unknown model name '{0}' (expected one of: mnb, decision_tree, random_forest, gradient_boost)")]
    UnknownModel(String),

    /// Predict called before fit
    #[error("Model has not been fitted")]
    ModelNotFitted,

    /// Heatmap rendering failed
    #[error("Plot error: {0}")]
    PlotError(String),

    /// Model (de)serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, PrognosisError>;
