//! Classifier implementations and evaluation tooling.
//!
//! Four classifiers cover the configured model space: multinomial naive
//! Bayes, a CART decision tree, a random forest, and gradient boosted trees.
//! Splitting, scoring, and cross-validation live alongside them.

pub mod cross_validation;
pub mod decision_tree;
pub mod gradient_boosting;
pub mod metrics;
pub mod naive_bayes;
pub mod random_forest;

pub use cross_validation::{CVResults, CVSplit, CVStrategy, CrossValidator};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use gradient_boosting::{GradientBoostingClassifier, GradientBoostingConfig};
pub use metrics::{accuracy_score, classification_report, confusion_matrix, per_class_metrics, ClassMetrics};
pub use naive_bayes::MultinomialNaiveBayes;
pub use random_forest::RandomForest;

use crate::error::{PrognosisError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Split features/labels into train and validation subsets.
///
/// Rows are shuffled (seeded when `random_state` is set) and the last
/// `validation_size` fraction becomes the validation subset. Pure function of
/// its inputs.
pub fn train_val_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    validation_size: f64,
    random_state: Option<u64>,
) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>, Array1<f64>)> {
    let n = x.nrows();

    if n != y.len() {
        return Err(PrognosisError::ShapeError {
            expected: format!("y length = {}", n),
            actual: format!("y length = {}", y.len()),
        });
    }
    if !(validation_size > 0.0 && validation_size < 1.0) {
        return Err(PrognosisError::ValidationError(format!(
            "validation_size must be in (0, 1), got {}",
            validation_size
        )));
    }

    let val_size = ((n as f64 * validation_size).round() as usize).clamp(1, n.saturating_sub(1));

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = match random_state {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    indices.shuffle(&mut rng);

    let (train_idx, val_idx) = indices.split_at(n - val_size);

    let x_train = x.select(Axis(0), train_idx);
    let x_val = x.select(Axis(0), val_idx);
    let y_train = Array1::from_vec(train_idx.iter().map(|&i| y[i]).collect());
    let y_val = Array1::from_vec(val_idx.iter().map(|&i| y[i]).collect());

    Ok((x_train, y_train, x_val, y_val))
}
