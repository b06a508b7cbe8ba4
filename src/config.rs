//! YAML configuration for the prediction pipeline.
//!
//! The pipeline is driven by a single config file (`./config.yaml` by
//! default). A missing or unparsable file is not fatal: [`AppConfig::load`]
//! logs the failure and returns `None`, which disables all downstream
//! behavior.

use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Top-level pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Log evaluation details during training
    #[serde(default)]
    pub verbose: bool,

    /// Path prefix for persisted models (`<model_save_path><model_name>.json`)
    pub model_save_path: String,

    /// Seed for the train/validation split and model randomness
    #[serde(default)]
    pub random_state: Option<u64>,

    /// Dataset locations and split fraction
    pub dataset: DatasetConfig,

    /// Per-model hyperparameters
    #[serde(default)]
    pub model: ModelConfig,
}

/// Dataset locations and the validation split fraction
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub training_data_path: String,
    pub test_data_path: String,
    /// Fraction of training rows held out for validation, in (0, 1)
    pub validation_size: f64,
}

/// Hyperparameters for each supported classifier
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub mnb: MnbParams,
    #[serde(default)]
    pub decision_tree: DecisionTreeParams,
    #[serde(default)]
    pub random_forest: RandomForestParams,
    #[serde(default)]
    pub gradient_boost: GradientBoostParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MnbParams {
    /// Laplace smoothing
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTreeParams {
    /// Split criterion: `gini` or `entropy`
    #[serde(default = "default_criterion")]
    pub criterion: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomForestParams {
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradientBoostParams {
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
}

fn default_alpha() -> f64 {
    1.0
}

fn default_criterion() -> String {
    "gini".to_string()
}

fn default_n_estimators() -> usize {
    100
}

fn default_learning_rate() -> f64 {
    0.1
}

impl Default for MnbParams {
    fn default() -> Self {
        Self { alpha: default_alpha() }
    }
}

impl Default for DecisionTreeParams {
    fn default() -> Self {
        Self { criterion: default_criterion() }
    }
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self { n_estimators: default_n_estimators() }
    }
}

impl Default for GradientBoostParams {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            learning_rate: default_learning_rate(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// Returns `None` when the file cannot be read or parsed; the failure is
    /// logged and the caller is expected to stop rather than retry.
    pub fn load(path: &Path) -> Option<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Error reading config file");
                return None;
            }
        };

        match serde_yaml::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Error parsing config file");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_yaml(yaml: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(yaml.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_load_minimal() {
        let yaml = r#"
verbose: true
model_save_path: "./models/"
random_state: 42
dataset:
  training_data_path: "./data/training.csv"
  test_data_path: "./data/testing.csv"
  validation_size: 0.2
model:
  decision_tree:
    criterion: entropy
  random_forest:
    n_estimators: 50
"#;
        let f = write_yaml(yaml);
        let config = AppConfig::load(f.path()).unwrap();

        assert!(config.verbose);
        assert_eq!(config.model_save_path, "./models/");
        assert_eq!(config.random_state, Some(42));
        assert_eq!(config.dataset.validation_size, 0.2);
        assert_eq!(config.model.decision_tree.criterion, "entropy");
        assert_eq!(config.model.random_forest.n_estimators, 50);
        // Untouched sections fall back to defaults
        assert_eq!(config.model.mnb.alpha, 1.0);
        assert_eq!(config.model.gradient_boost.learning_rate, 0.1);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(AppConfig::load(Path::new("/nonexistent/config.yaml")).is_none());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let f = write_yaml("model_save_path: [not: {valid");
        assert!(AppConfig::load(f.path()).is_none());
    }
}
