//! Classification metrics

use ndarray::{Array1, Array2};

/// Fraction of predictions matching the true labels, in [0, 1].
pub fn accuracy_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct: usize = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 0.5)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Multiclass confusion matrix.
///
/// Rows are true classes, columns predicted classes. Labels are dense class
/// indices in `0..n_classes`; anything outside that range is ignored.
pub fn confusion_matrix(y_true: &Array1<f64>, y_pred: &Array1<f64>, n_classes: usize) -> Array2<usize> {
    let mut matrix = Array2::zeros((n_classes, n_classes));
    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        let ti = t.round() as i64;
        let pi = p.round() as i64;
        if ti >= 0 && (ti as usize) < n_classes && pi >= 0 && (pi as usize) < n_classes {
            matrix[[ti as usize, pi as usize]] += 1;
        }
    }
    matrix
}

/// Per-class precision/recall/F1 plus support, derived from a confusion matrix
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Compute per-class metrics from a confusion matrix.
pub fn per_class_metrics(confusion: &Array2<usize>) -> Vec<ClassMetrics> {
    let n_classes = confusion.nrows();
    let mut out = Vec::with_capacity(n_classes);

    for k in 0..n_classes {
        let tp = confusion[[k, k]];
        let support: usize = confusion.row(k).sum();
        let predicted: usize = confusion.column(k).sum();

        let precision = if predicted > 0 {
            tp as f64 / predicted as f64
        } else {
            0.0
        };
        let recall = if support > 0 {
            tp as f64 / support as f64
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        out.push(ClassMetrics { precision, recall, f1, support });
    }

    out
}

/// Render a per-class precision/recall/F1 summary as text.
///
/// One row per class (named when `class_names` covers the index, otherwise
/// the bare index), followed by accuracy, macro-average, and weighted-average
/// rows.
pub fn classification_report(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
    class_names: &[String],
) -> String {
    let n_classes = class_names.len().max(
        y_true
            .iter()
            .chain(y_pred.iter())
            .map(|v| v.round() as i64 + 1)
            .max()
            .unwrap_or(0)
            .max(0) as usize,
    );

    let confusion = confusion_matrix(y_true, y_pred, n_classes);
    let per_class = per_class_metrics(&confusion);

    let name_width = class_names
        .iter()
        .map(|n| n.len())
        .max()
        .unwrap_or(0)
        .max("weighted avg".len());

    let mut report = String::new();
    report.push_str(&format!(
        "{:>width$}  {:>9} {:>9} {:>9} {:>9}\n\n",
        "",
        "precision",
        "recall",
        "f1-score",
        "support",
        width = name_width
    ));

    let total: usize = per_class.iter().map(|m| m.support).sum();
    let mut macro_p = 0.0;
    let mut macro_r = 0.0;
    let mut macro_f = 0.0;
    let mut weighted_p = 0.0;
    let mut weighted_r = 0.0;
    let mut weighted_f = 0.0;

    for (k, m) in per_class.iter().enumerate() {
        let fallback = k.to_string();
        let name = class_names.get(k).map(String::as_str).unwrap_or(&fallback);
        report.push_str(&format!(
            "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
            name,
            m.precision,
            m.recall,
            m.f1,
            m.support,
            width = name_width
        ));

        macro_p += m.precision;
        macro_r += m.recall;
        macro_f += m.f1;
        let w = m.support as f64;
        weighted_p += m.precision * w;
        weighted_r += m.recall * w;
        weighted_f += m.f1 * w;
    }

    let k = per_class.len().max(1) as f64;
    let t = (total.max(1)) as f64;
    let accuracy = accuracy_score(y_true, y_pred);

    report.push('\n');
    report.push_str(&format!(
        "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}\n",
        "accuracy",
        "",
        "",
        accuracy,
        total,
        width = name_width
    ));
    report.push_str(&format!(
        "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
        "macro avg",
        macro_p / k,
        macro_r / k,
        macro_f / k,
        total,
        width = name_width
    ));
    report.push_str(&format!(
        "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
        "weighted avg",
        weighted_p / t,
        weighted_r / t,
        weighted_f / t,
        total,
        width = name_width
    ));

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_accuracy() {
        let y_true = array![0.0, 1.0, 2.0, 1.0];
        let y_pred = array![0.0, 1.0, 1.0, 1.0];
        assert_eq!(accuracy_score(&y_true, &y_pred), 0.75);
    }

    #[test]
    fn test_accuracy_empty() {
        let empty: Array1<f64> = array![];
        assert_eq!(accuracy_score(&empty, &empty), 0.0);
    }

    #[test]
    fn test_confusion_matrix() {
        let y_true = array![0.0, 0.0, 1.0, 1.0, 2.0];
        let y_pred = array![0.0, 1.0, 1.0, 1.0, 0.0];

        let m = confusion_matrix(&y_true, &y_pred, 3);
        assert_eq!(m[[0, 0]], 1);
        assert_eq!(m[[0, 1]], 1);
        assert_eq!(m[[1, 1]], 2);
        assert_eq!(m[[2, 0]], 1);
        assert_eq!(m[[2, 2]], 0);
    }

    #[test]
    fn test_per_class_metrics() {
        let y_true = array![0.0, 0.0, 1.0, 1.0];
        let y_pred = array![0.0, 0.0, 1.0, 0.0];

        let m = confusion_matrix(&y_true, &y_pred, 2);
        let per_class = per_class_metrics(&m);

        assert_eq!(per_class.len(), 2);
        // Class 0: 2 of 3 predicted-0 are correct
        assert!((per_class[0].precision - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(per_class[0].recall, 1.0);
        assert_eq!(per_class[0].support, 2);
        // Class 1: both predicted-1 correct, one missed
        assert_eq!(per_class[1].precision, 1.0);
        assert_eq!(per_class[1].recall, 0.5);
        assert_eq!(per_class[1].support, 2);
    }

    #[test]
    fn test_classification_report_text() {
        let y_true = array![0.0, 0.0, 1.0, 1.0];
        let y_pred = array![0.0, 1.0, 1.0, 1.0];
        let names = vec!["Influenza".to_string(), "Malaria".to_string()];

        let report = classification_report(&y_true, &y_pred, &names);

        assert!(report.contains("Influenza"));
        assert!(report.contains("Malaria"));
        assert!(report.contains("precision"));
        assert!(report.contains("weighted avg"));
    }
}
