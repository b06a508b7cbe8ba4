//! Gradient boosted decision trees.
//!
//! Multiclass softmax boosting: each round fits one regression tree per
//! class on the residuals of the current softmax probabilities, then shrinks
//! the update by the learning rate.

use crate::error::{PrognosisError, Result};
use super::decision_tree::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Boosting hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    /// Boosting rounds (trees per class)
    pub n_estimators: usize,
    /// Shrinkage applied to each tree's contribution
    pub learning_rate: f64,
    /// Depth of the per-round regression trees
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Row fraction each round's trees are fitted on
    pub subsample: f64,
    pub random_state: Option<u64>,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            subsample: 1.0,
            random_state: None,
        }
    }
}

/// Gradient boosting classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    config: GradientBoostingConfig,
    classes: Vec<i64>,
    /// Log prior per class, the round-zero score
    init_scores: Vec<f64>,
    /// `trees[round][class_idx]`
    trees: Vec<Vec<DecisionTree>>,
    feature_importances: Vec<f64>,
}

impl GradientBoostingClassifier {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            classes: Vec::new(),
            init_scores: Vec::new(),
            trees: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    /// Fit the boosted ensemble.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(PrognosisError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        let mut classes: Vec<i64> = y.iter().map(|&v| v.round() as i64).collect();
        classes.sort_unstable();
        classes.dedup();
        if classes.len() < 2 {
            return Err(PrognosisError::ValidationError(
                "gradient boosting needs at least two classes".to_string(),
            ));
        }
        self.classes = classes;
        let k = self.classes.len();

        let y_idx: Vec<usize> = y
            .iter()
            .map(|&v| {
                let label = v.round() as i64;
                self.classes.iter().position(|&c| c == label).unwrap_or(0)
            })
            .collect();

        // Log priors seed the scores
        self.init_scores = (0..k)
            .map(|j| {
                let count = y_idx.iter().filter(|&&yi| yi == j).count();
                ((count as f64 / n_samples as f64).max(1e-12)).ln()
            })
            .collect();

        let mut scores = Array2::from_shape_fn((n_samples, k), |(_, j)| self.init_scores[j]);

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        self.feature_importances = vec![0.0; n_features];
        self.trees = Vec::with_capacity(self.config.n_estimators);

        for _ in 0..self.config.n_estimators {
            let probs = softmax_rows(&scores);
            let sample_indices = self.subsample_indices(n_samples, &mut rng);
            let x_sub = x.select(Axis(0), &sample_indices);

            let mut round_trees = Vec::with_capacity(k);

            for j in 0..k {
                let residuals: Array1<f64> = sample_indices
                    .iter()
                    .map(|&i| {
                        let target = if y_idx[i] == j { 1.0 } else { 0.0 };
                        target - probs[[i, j]]
                    })
                    .collect();

                let mut tree = DecisionTree::new_regressor()
                    .with_max_depth(self.config.max_depth)
                    .with_min_samples_leaf(self.config.min_samples_leaf);
                tree.fit(&x_sub, &residuals)?;

                // Scores advance for every row, not just the fitted subsample
                let update = tree.predict(x)?;
                for i in 0..n_samples {
                    scores[[i, j]] += self.config.learning_rate * update[i];
                }

                if let Some(imp) = tree.feature_importances() {
                    for (f, &v) in imp.iter().enumerate() {
                        self.feature_importances[f] += v;
                    }
                }

                round_trees.push(tree);
            }

            self.trees.push(round_trees);
        }

        let total: f64 = self.feature_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= total;
            }
        }

        Ok(())
    }

    fn subsample_indices(&self, n: usize, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
        if self.config.subsample >= 1.0 {
            return (0..n).collect();
        }
        let sample_size = (((n as f64) * self.config.subsample).ceil() as usize).max(1);
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(rng);
        indices.truncate(sample_size);
        indices.sort_unstable();
        indices
    }

    fn decision_scores(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(PrognosisError::ModelNotFitted);
        }

        let n = x.nrows();
        let k = self.classes.len();
        let mut scores = Array2::from_shape_fn((n, k), |(_, j)| self.init_scores[j]);

        for round_trees in &self.trees {
            for (j, tree) in round_trees.iter().enumerate() {
                let update = tree.predict(x)?;
                for i in 0..n {
                    scores[[i, j]] += self.config.learning_rate * update[i];
                }
            }
        }

        Ok(scores)
    }

    /// Predict class labels.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scores = self.decision_scores(x)?;

        let predictions: Vec<f64> = scores
            .rows()
            .into_iter()
            .map(|row| {
                let best = row
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| {
                        a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|(j, _)| j)
                    .unwrap_or(0);
                self.classes[best] as f64
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Predict per-class probabilities (softmax over decision scores).
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        Ok(softmax_rows(&self.decision_scores(x)?))
    }

    /// Normalized split-gain importances accumulated over all trees.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

fn softmax_rows(scores: &Array2<f64>) -> Array2<f64> {
    let mut out = scores.clone();
    for mut row in out.rows_mut() {
        let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mut sum = 0.0;
        for v in row.iter_mut() {
            *v = (*v - max).exp();
            sum += *v;
        }
        for v in row.iter_mut() {
            *v /= sum;
        }
    }
    out
}
