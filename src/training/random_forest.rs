//! Random forest classifier.
//!
//! Bootstrap-aggregated decision trees with per-tree feature subsampling and
//! majority voting. Trees are grown in parallel, each from its own seeded
//! RNG stream so results are reproducible for a fixed `random_state`.

use crate::error::{PrognosisError, Result};
use super::decision_tree::{Criterion, DecisionTree};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Random forest classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    /// Feature subset each tree was grown on
    feature_indices: Vec<Vec<usize>>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    /// Features considered per tree; `None` means sqrt(n_features)
    pub max_features: Option<usize>,
    pub criterion: Criterion,
    pub random_state: Option<u64>,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            feature_indices: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_leaf: 1,
            max_features: None,
            criterion: Criterion::Gini,
            random_state: None,
            n_features: 0,
            feature_importances: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    fn features_per_tree(&self, n_features: usize) -> usize {
        self.max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .clamp(1, n_features)
    }

    /// Fit the forest to training data.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(PrognosisError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        self.n_features = n_features;
        let features_per_tree = self.features_per_tree(n_features);
        let base_seed = self.random_state.unwrap_or(42);

        let fitted: Vec<(DecisionTree, Vec<usize>)> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));

                // Bootstrap rows
                let sample_indices: Vec<usize> = (0..n_samples)
                    .map(|_| (rng.next_u64() as usize) % n_samples)
                    .collect();

                // Random feature subset
                let mut cols: Vec<usize> = (0..n_features).collect();
                cols.shuffle(&mut rng);
                cols.truncate(features_per_tree);
                cols.sort_unstable();

                let x_boot = x.select(Axis(0), &sample_indices).select(Axis(1), &cols);
                let y_boot: Array1<f64> =
                    Array1::from_vec(sample_indices.iter().map(|&i| y[i]).collect());

                let mut tree = DecisionTree::new_classifier(self.criterion)
                    .with_min_samples_leaf(self.min_samples_leaf);
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }
                tree.fit(&x_boot, &y_boot).ok();

                (tree, cols)
            })
            .collect();

        self.trees = Vec::with_capacity(fitted.len());
        self.feature_indices = Vec::with_capacity(fitted.len());
        for (tree, cols) in fitted {
            self.trees.push(tree);
            self.feature_indices.push(cols);
        }

        self.compute_feature_importances();

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut totals = vec![0.0; self.n_features];
        for (tree, cols) in self.trees.iter().zip(self.feature_indices.iter()) {
            if let Some(imp) = tree.feature_importances() {
                for (j, &col) in cols.iter().enumerate() {
                    if j < imp.len() {
                        totals[col] += imp[j];
                    }
                }
            }
        }

        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            for t in &mut totals {
                *t /= sum;
            }
        }

        self.feature_importances = Some(Array1::from_vec(totals));
    }

    /// Predict by majority vote across trees.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PrognosisError::ModelNotFitted);
        }

        let all_predictions: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .zip(self.feature_indices.par_iter())
            .filter_map(|(tree, cols)| {
                let x_sub = x.select(Axis(1), cols);
                tree.predict(&x_sub).ok()
            })
            .collect();

        if all_predictions.is_empty() {
            return Err(PrognosisError::ValidationError(
                "no tree could make predictions".to_string(),
            ));
        }

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let mut votes: HashMap<i64, usize> = HashMap::new();
                for preds in &all_predictions {
                    *votes.entry(preds[i].round() as i64).or_insert(0) += 1;
                }
                votes
                    .into_iter()
                    .max_by_key(|(_, count)| *count)
                    .map(|(class, _)| class as f64)
                    .unwrap_or(0.0)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Importances averaged over trees and re-normalized.
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Number of fitted trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.2, 0.2],
            [0.1, 0.0],
            [1.0, 1.0],
            [1.1, 1.1],
            [1.2, 1.2],
            [1.1, 1.0],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_classifier() {
        let (x, y) = separable_data();

        let mut rf = RandomForest::new(20).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let predictions = rf.predict(&x).unwrap();
        let accuracy = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count() as f64
            / y.len() as f64;

        assert!(accuracy >= 0.8, "accuracy too low: {}", accuracy);
        assert_eq!(rf.n_trees(), 20);
    }

    #[test]
    fn test_reproducible_with_seed() {
        let (x, y) = separable_data();

        let mut a = RandomForest::new(10).with_random_state(7);
        let mut b = RandomForest::new(10).with_random_state(7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_predict_unfitted() {
        let rf = RandomForest::new(5);
        let x = array![[0.0, 0.0]];
        assert!(matches!(
            rf.predict(&x),
            Err(PrognosisError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_feature_importances() {
        let (x, y) = separable_data();

        let mut rf = RandomForest::new(20).with_random_state(42).with_max_features(2);
        rf.fit(&x, &y).unwrap();

        let importances = rf.feature_importances().unwrap();
        assert_eq!(importances.len(), 2);
        let sum: f64 = importances.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
