//! Multinomial naive Bayes.
//!
//! Suited to the symptom tables this crate consumes: features are
//! non-negative indicator counts, so class-conditional likelihoods reduce to
//! smoothed feature frequencies.

use crate::error::{PrognosisError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Multinomial naive Bayes classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNaiveBayes {
    /// Laplace smoothing
    alpha: f64,
    classes: Vec<i64>,
    class_log_priors: Vec<f64>,
    /// Per class: log probability of each feature
    feature_log_probs: Vec<Vec<f64>>,
}

impl MultinomialNaiveBayes {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            classes: Vec::new(),
            class_log_priors: Vec::new(),
            feature_log_probs: Vec::new(),
        }
    }

    /// Fit the classifier.
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
        self.classes = classes;

        self.class_log_priors = Vec::with_capacity(self.classes.len());
        self.feature_log_probs = Vec::with_capacity(self.classes.len());

        for &class in &self.classes {
            let mut feature_counts = vec![self.alpha; n_features];
            let mut total = self.alpha * n_features as f64;
            let mut class_count = 0usize;

            for (row, &label) in x.rows().into_iter().zip(y.iter()) {
                if label.round() as i64 == class {
                    class_count += 1;
                    for (j, &val) in row.iter().enumerate() {
                        let v = val.max(0.0);
                        feature_counts[j] += v;
                        total += v;
                    }
                }
            }

            self.class_log_priors
                .push((class_count as f64 / n_samples as f64).ln());
            self.feature_log_probs.push(
                feature_counts
                    .iter()
                    .map(|&count| (count / total).ln())
                    .collect(),
            );
        }

        Ok(())
    }

    /// Predict class labels.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let log_probs = self.predict_log_proba(x)?;

        let predictions: Vec<f64> = log_probs
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

    /// Unnormalized joint log probability for each (sample, class).
    pub fn predict_log_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.classes.is_empty() {
            return Err(PrognosisError::ModelNotFitted);
        }

        let n_samples = x.nrows();
        let n_classes = self.classes.len();
        let mut log_probs = Array2::zeros((n_samples, n_classes));

        for (i, row) in x.rows().into_iter().enumerate() {
            for j in 0..n_classes {
                let likelihood: f64 = row
                    .iter()
                    .zip(self.feature_log_probs[j].iter())
                    .map(|(&xi, &log_p)| xi * log_p)
                    .sum();
                log_probs[[i, j]] = self.class_log_priors[j] + likelihood;
            }
        }

        Ok(log_probs)
    }

    /// Class labels seen during fitting, ascending.
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn count_data() -> (Array2<f64>, Array1<f64>) {
        // Class 0 concentrates counts in the first two features, class 1 in
        // the last two.
        let x = Array2::from_shape_vec(
            (10, 4),
            vec![
                5.0, 3.0, 1.0, 0.0,
                4.0, 4.0, 0.0, 1.0,
                6.0, 2.0, 1.0, 0.0,
                5.0, 5.0, 0.0, 0.0,
                4.0, 3.0, 1.0, 1.0,
                0.0, 1.0, 5.0, 4.0,
                1.0, 0.0, 4.0, 5.0,
                0.0, 0.0, 6.0, 3.0,
                1.0, 1.0, 5.0, 5.0,
                0.0, 1.0, 4.0, 4.0,
            ],
        )
        .unwrap();
        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        (x, y)
    }

    #[test]
    fn test_fit_predict() {
        let (x, y) = count_data();

        let mut mnb = MultinomialNaiveBayes::new(1.0);
        mnb.fit(&x, &y).unwrap();

        let predictions = mnb.predict(&x).unwrap();
        assert_eq!(predictions, y);
        assert_eq!(mnb.classes(), &[0, 1]);
    }

    #[test]
    fn test_predict_unfitted() {
        let mnb = MultinomialNaiveBayes::new(1.0);
        let x = Array2::from_shape_vec((1, 2), vec![1.0, 0.0]).unwrap();
        assert!(matches!(
            mnb.predict(&x),
            Err(PrognosisError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let x = Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let y = Array1::from_vec(vec![0.0]);

        let mut mnb = MultinomialNaiveBayes::new(1.0);
        assert!(matches!(
            mnb.fit(&x, &y),
            Err(PrognosisError::ShapeError { .. })
        ));
    }
}
