//! Integration test: full pipeline end-to-end
//!
//! Exercises the config file → dataset loading → train → persist → reload →
//! score path on a generated symptom table that mirrors the production
//! layout (132 indicator columns, `prognosis` label, one unused trailing
//! column in the training export).

use prognosis::config::AppConfig;
use prognosis::dataset::FEATURE_COLUMNS;
use prognosis::predictor::{DiseasePredictor, ModelKind};
use std::io::Write;
use std::path::Path;

const N_CLASSES: usize = 41;

fn disease_name(class_idx: usize) -> String {
    format!("Disease_{class_idx:02}")
}

/// Write a symptom CSV where each disease is flagged by its own block of
/// three indicator columns — near-separable by construction.
fn write_dataset(path: &Path, rows_per_class: usize, with_extra: bool) {
    let mut f = std::fs::File::create(path).unwrap();

    let mut header: Vec<String> = (0..FEATURE_COLUMNS).map(|i| format!("symptom_{i}")).collect();
    header.push("prognosis".to_string());
    if with_extra {
        header.push("unnamed".to_string());
    }
    writeln!(f, "{}", header.join(",")).unwrap();

    for class_idx in 0..N_CLASSES {
        let hot = class_idx * 3;
        for row in 0..rows_per_class {
            let mut cells: Vec<String> = (0..FEATURE_COLUMNS)
                .map(|i| {
                    // Every third row drops one indicator so classes are
                    // near- rather than perfectly uniform
                    let lit = i >= hot && i < hot + 3 && !(row % 3 == 0 && i == hot + 2);
                    if lit { "1".to_string() } else { "0".to_string() }
                })
                .collect();
            cells.push(disease_name(class_idx));
            if with_extra {
                cells.push(String::new());
            }
            writeln!(f, "{}", cells.join(",")).unwrap();
        }
    }
}

fn write_config(dir: &Path, rows_per_class: usize, verbose: bool) -> AppConfig {
    let training = dir.join("training.csv");
    let testing = dir.join("testing.csv");
    write_dataset(&training, rows_per_class, true);
    write_dataset(&testing, 2, false);

    let models_dir = dir.join("models");
    std::fs::create_dir(&models_dir).unwrap();

    let yaml = format!(
        r#"
verbose: {verbose}
model_save_path: "{models}/"
random_state: 42
dataset:
  training_data_path: "{training}"
  test_data_path: "{testing}"
  validation_size: 0.2
model:
  decision_tree:
    criterion: gini
  random_forest:
    n_estimators: 10
  gradient_boost:
    n_estimators: 5
"#,
        verbose = verbose,
        models = models_dir.display(),
        training = training.display(),
        testing = testing.display(),
    );

    let config_path = dir.join("config.yaml");
    std::fs::write(&config_path, yaml).unwrap();

    AppConfig::load(&config_path).expect("config should load")
}

#[test]
fn test_end_to_end_decision_tree() {
    let dir = tempfile::tempdir().unwrap();
    // 41 classes x 120 rows = 4920 training rows
    let config = write_config(dir.path(), 120, false);

    let predictor = DiseasePredictor::new(config).unwrap();
    let training = predictor.train(ModelKind::DecisionTree).unwrap();

    assert!(
        training.accuracy > 0.9,
        "validation accuracy too low: {}",
        training.accuracy
    );
    assert!(training.cross_validation.mean_score > 0.0);
    assert!(!training.report.is_empty());

    let expected_path = dir.path().join("models").join("decision_tree.json");
    assert!(expected_path.exists(), "model file not written");

    let evaluation = predictor
        .predict("decision_tree", None)
        .unwrap()
        .expect("persisted model should load");
    assert!((0.0..=1.0).contains(&evaluation.accuracy));
    assert!(evaluation.accuracy > 0.9, "test accuracy: {}", evaluation.accuracy);
    assert!(evaluation.report.contains("Disease_00"));
}

#[test]
fn test_end_to_end_naive_bayes_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), 20, false);

    let predictor = DiseasePredictor::new(config).unwrap();
    let training = predictor.train(ModelKind::MultinomialNb).unwrap();
    assert!((0.0..=1.0).contains(&training.accuracy));

    let evaluation = predictor
        .predict("mnb", None)
        .unwrap()
        .expect("persisted model should load");
    assert!((0.0..=1.0).contains(&evaluation.accuracy));
    assert!(!evaluation.report.is_empty());
}

#[test]
fn test_predict_before_training_is_no_result() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), 6, false);

    let predictor = DiseasePredictor::new(config).unwrap();
    assert!(predictor.predict("gradient_boost", None).unwrap().is_none());
}

#[test]
fn test_config_load_failure_disables_pipeline() {
    // Graceful degradation: a missing config yields None, never a panic
    assert!(AppConfig::load(Path::new("/nonexistent/config.yaml")).is_none());
}
