//! Prognosis - symptom-based disease prediction
//!
//! A configuration-driven pipeline that loads a tabular symptom/disease
//! dataset, trains one of four classifiers, reports validation and test
//! accuracy, and persists the fitted model for later scoring.
//!
//! # Modules
//!
//! - [`config`] - YAML pipeline configuration
//! - [`dataset`] - CSV loading and label encoding
//! - [`correlation`] - feature correlation heatmap
//! - [`training`] - classifiers, splitting, metrics, cross-validation
//! - [`predictor`] - the train/persist/predict workflow

pub mod error;

pub mod config;
pub mod correlation;
pub mod dataset;
pub mod predictor;
pub mod training;

pub use error::{PrognosisError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{PrognosisError, Result};

    pub use crate::config::AppConfig;
    pub use crate::dataset::{LabelEncoder, SymptomDataset, FEATURE_COLUMNS, LABEL_COLUMN};
    pub use crate::predictor::{
        Classifier, DiseasePredictor, ModelKind, PersistedModel, TestEvaluation, TrainingReport,
    };
    pub use crate::training::{
        accuracy_score, classification_report, confusion_matrix, train_val_split, CVResults,
        Criterion, DecisionTree, GradientBoostingClassifier, MultinomialNaiveBayes, RandomForest,
    };
}
