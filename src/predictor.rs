//! Disease prediction workflow.
//!
//! Wires configuration, dataset loading, the correlation report, model
//! selection, training/evaluation, persistence, and test-set scoring into
//! one synchronous pipeline.

use crate::config::AppConfig;
use crate::correlation::{self, HEATMAP_PATH};
use crate::dataset::{self, LabelEncoder, SymptomDataset, FEATURE_COLUMNS};
use crate::error::{PrognosisError, Result};
use crate::training::{
    accuracy_score, classification_report, confusion_matrix, train_val_split, CVResults,
    CVStrategy, Criterion, CrossValidator, DecisionTree, GradientBoostingClassifier,
    GradientBoostingConfig, MultinomialNaiveBayes, RandomForest,
};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Folds used for the cross-validation score during training
const CV_FOLDS: usize = 3;

/// The four supported classifier kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    MultinomialNb,
    DecisionTree,
    RandomForest,
    GradientBoost,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::MultinomialNb,
        ModelKind::DecisionTree,
        ModelKind::RandomForest,
        ModelKind::GradientBoost,
    ];

    /// Parse a configured model name. Anything outside the fixed set is a
    /// fatal [`PrognosisError::UnknownModel`].
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "mnb" => Ok(ModelKind::MultinomialNb),
            "decision_tree" => Ok(ModelKind::DecisionTree),
            "random_forest" => Ok(ModelKind::RandomForest),
            "gradient_boost" => Ok(ModelKind::GradientBoost),
            other => Err(PrognosisError::UnknownModel(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::MultinomialNb => "mnb",
            ModelKind::DecisionTree => "decision_tree",
            ModelKind::RandomForest => "random_forest",
            ModelKind::GradientBoost => "gradient_boost",
        }
    }
}

/// A classifier of any supported kind, dispatching fit/predict uniformly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Classifier {
    MultinomialNb(MultinomialNaiveBayes),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    GradientBoost(GradientBoostingClassifier),
}

impl Classifier {
    /// Instantiate the classifier for `kind` with hyperparameters from
    /// configuration.
    pub fn build(kind: ModelKind, config: &AppConfig) -> Result<Self> {
        match kind {
            ModelKind::MultinomialNb => Ok(Classifier::MultinomialNb(
                MultinomialNaiveBayes::new(config.model.mnb.alpha),
            )),
            ModelKind::DecisionTree => {
                let criterion = Criterion::from_name(&config.model.decision_tree.criterion)?;
                Ok(Classifier::DecisionTree(DecisionTree::new_classifier(criterion)))
            }
            ModelKind::RandomForest => {
                let mut forest = RandomForest::new(config.model.random_forest.n_estimators);
                if let Some(seed) = config.random_state {
                    forest = forest.with_random_state(seed);
                }
                Ok(Classifier::RandomForest(forest))
            }
            ModelKind::GradientBoost => {
                let gb = GradientBoostingConfig {
                    n_estimators: config.model.gradient_boost.n_estimators,
                    learning_rate: config.model.gradient_boost.learning_rate,
                    random_state: config.random_state,
                    ..Default::default()
                };
                Ok(Classifier::GradientBoost(GradientBoostingClassifier::new(gb)))
            }
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            Classifier::MultinomialNb(m) => m.fit(x, y),
            Classifier::DecisionTree(m) => m.fit(x, y).map(|_| ()),
            Classifier::RandomForest(m) => m.fit(x, y).map(|_| ()),
            Classifier::GradientBoost(m) => m.fit(x, y),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Classifier::MultinomialNb(m) => m.predict(x),
            Classifier::DecisionTree(m) => m.predict(x),
            Classifier::RandomForest(m) => m.predict(x),
            Classifier::GradientBoost(m) => m.predict(x),
        }
    }

    /// Split-gain importances for the tree-based kinds.
    pub fn feature_importances(&self) -> Option<Vec<f64>> {
        match self {
            Classifier::MultinomialNb(_) => None,
            Classifier::DecisionTree(m) => m.feature_importances().map(|a| a.to_vec()),
            Classifier::RandomForest(m) => m.feature_importances().map(|a| a.to_vec()),
            Classifier::GradientBoost(m) => Some(m.feature_importances().to_vec()),
        }
    }
}

/// The on-disk model document
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedModel {
    pub model_name: String,
    /// Disease names, index-aligned with the classifier's encoded labels
    pub classes: Vec<String>,
    pub classifier: Classifier,
}

/// Everything measured on the validation subset during training
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// The classifier's own validation score
    pub confidence: f64,
    pub accuracy: f64,
    pub confusion: Array2<usize>,
    pub cross_validation: CVResults,
    pub report: String,
    pub model_path: PathBuf,
}

/// Accuracy and report against the true test labels
#[derive(Debug, Clone)]
pub struct TestEvaluation {
    pub accuracy: f64,
    pub report: String,
}

/// The configured, data-loaded pipeline
pub struct DiseasePredictor {
    config: AppConfig,
    train: SymptomDataset,
    test: SymptomDataset,
    encoder: LabelEncoder,
}

impl DiseasePredictor {
    /// Load both datasets and write the feature correlation heatmap.
    ///
    /// # Panics
    ///
    /// Panics when either table violates the data contract (feature width
    /// not exactly [`FEATURE_COLUMNS`], or label/row count mismatch).
    pub fn new(config: AppConfig) -> Result<Self> {
        let (train, encoder) = dataset::load_training(&config.dataset.training_data_path)?;
        let test = dataset::load_testing(&config.dataset.test_data_path, &encoder)?;

        correlation::feature_correlation(&train.frame, Path::new(HEATMAP_PATH))?;

        if config.verbose {
            info!(
                train_rows = train.features.nrows(),
                test_rows = test.features.nrows(),
                features = FEATURE_COLUMNS,
                classes = encoder.len(),
                "datasets loaded"
            );
        }

        Ok(Self { config, train, test, encoder })
    }

    /// Train the selected classifier, evaluate it on the validation subset,
    /// and persist it under `<model_save_path><model_name>.json`.
    pub fn train(&self, kind: ModelKind) -> Result<TrainingReport> {
        let (x_train, y_train, x_val, y_val) = train_val_split(
            &self.train.features,
            &self.train.labels,
            self.config.dataset.validation_size,
            self.config.random_state,
        )?;

        if self.config.verbose {
            info!(
                train = x_train.nrows(),
                validation = x_val.nrows(),
                model = kind.name(),
                "training"
            );
        }

        let mut classifier = Classifier::build(kind, &self.config)?;
        classifier.fit(&x_train, &y_train)?;

        let y_pred = classifier.predict(&x_val)?;
        let confidence = accuracy_score(&y_val, &y_pred);
        let accuracy = confidence;
        let confusion = confusion_matrix(&y_val, &y_pred, self.encoder.len());
        let report = classification_report(&y_val, &y_pred, self.encoder.classes());
        let cross_validation = self.cross_val_accuracy(kind, &x_val, &y_val)?;

        if self.config.verbose {
            info!(confidence, "training confidence");
            info!(accuracy, "validation accuracy");
            info!(
                mean = cross_validation.mean_score,
                std = cross_validation.std_score,
                folds = cross_validation.n_folds,
                "cross-validation score"
            );
            info!("validation confusion matrix:\n{:?}", confusion);
            info!("classification report:\n{}", report);
            self.log_top_features(&classifier);
        }

        let model_path = self.model_path(kind.name());
        let json = serde_json::to_string_pretty(&PersistedModel {
            model_name: kind.name().to_string(),
            classes: self.encoder.classes().to_vec(),
            classifier,
        })?;
        std::fs::write(&model_path, json)?;

        info!(path = %model_path.display(), "model persisted");

        Ok(TrainingReport {
            confidence,
            accuracy,
            confusion,
            cross_validation,
            report,
            model_path,
        })
    }

    /// Score a previously persisted model.
    ///
    /// Predicts over `features` when given, otherwise over the stored test
    /// features. Returns `Ok(None)` when the saved model cannot be loaded;
    /// that is the expected "no result" outcome, not an error.
    pub fn predict(
        &self,
        saved_model_name: &str,
        features: Option<&Array2<f64>>,
    ) -> Result<Option<TestEvaluation>> {
        let path = self.model_path(saved_model_name);

        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "model not found");
                return Ok(None);
            }
        };

        let persisted: PersistedModel = match serde_json::from_str(&contents) {
            Ok(p) => p,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "model could not be decoded");
                return Ok(None);
            }
        };

        let x = features.unwrap_or(&self.test.features);
        let y_pred = persisted.classifier.predict(x)?;

        let accuracy = accuracy_score(&self.test.labels, &y_pred);
        let report = classification_report(&self.test.labels, &y_pred, &persisted.classes);

        Ok(Some(TestEvaluation { accuracy, report }))
    }

    /// `<model_save_path><model_name>.json` — the save path is a plain
    /// string prefix, not necessarily a directory.
    fn model_path(&self, model_name: &str) -> PathBuf {
        PathBuf::from(format!("{}{}.json", self.config.model_save_path, model_name))
    }

    /// Stratified k-fold accuracy over the validation subset, refitting a
    /// fresh classifier per fold.
    fn cross_val_accuracy(
        &self,
        kind: ModelKind,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<CVResults> {
        let mut cv = CrossValidator::new(CVStrategy::StratifiedKFold {
            n_splits: CV_FOLDS,
            shuffle: true,
        });
        if let Some(seed) = self.config.random_state {
            cv = cv.with_random_state(seed);
        }

        let splits = cv.split(y.len(), Some(y))?;
        let mut scores = Vec::with_capacity(splits.len());

        for split in splits {
            let x_fold = x.select(Axis(0), &split.train_indices);
            let y_fold: Array1<f64> =
                Array1::from_vec(split.train_indices.iter().map(|&i| y[i]).collect());
            let x_held = x.select(Axis(0), &split.test_indices);
            let y_held: Array1<f64> =
                Array1::from_vec(split.test_indices.iter().map(|&i| y[i]).collect());

            let mut classifier = Classifier::build(kind, &self.config)?;
            classifier.fit(&x_fold, &y_fold)?;
            let y_pred = classifier.predict(&x_held)?;
            scores.push(accuracy_score(&y_held, &y_pred));
        }

        Ok(CVResults::from_scores(scores))
    }

    fn log_top_features(&self, classifier: &Classifier) {
        let Some(importances) = classifier.feature_importances() else {
            return;
        };

        let names = self.train.frame.get_column_names();
        let mut ranked: Vec<(usize, f64)> = importances.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        for (idx, importance) in ranked.into_iter().take(5) {
            if importance <= 0.0 {
                break;
            }
            let name = names.get(idx).map(|n| n.as_str()).unwrap_or("?");
            debug!(feature = name, importance, "top feature");
        }
    }

    pub fn test_features(&self) -> &Array2<f64> {
        &self.test.features
    }
}
