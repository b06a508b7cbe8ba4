//! Symptom dataset loading.
//!
//! Both tables share a fixed layout: one column per symptom indicator and a
//! `prognosis` column naming the disease. The training export carries one
//! extra trailing column that is not part of the schema; it is dropped by
//! position without interpretation.

use crate::error::{PrognosisError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use tracing::debug;

/// Required number of symptom columns in every table
pub const FEATURE_COLUMNS: usize = 132;

/// Name of the disease label column
pub const LABEL_COLUMN: &str = "prognosis";

/// Maps disease names to dense class indices and back
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Build the vocabulary from observed labels (sorted, deduplicated).
    pub fn fit(values: &[String]) -> Self {
        let mut classes: Vec<String> = values.to_vec();
        classes.sort();
        classes.dedup();

        let index = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        Self { classes, index }
    }

    /// Encode labels as dense class indices.
    pub fn transform(&self, values: &[String]) -> Result<Array1<f64>> {
        values
            .iter()
            .map(|v| {
                self.index
                    .get(v)
                    .map(|&i| i as f64)
                    .ok_or_else(|| PrognosisError::DataError(format!("unknown prognosis label '{v}'")))
            })
            .collect()
    }

    /// Class names, index-aligned with encoded labels.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// A loaded table: feature matrix, encoded labels, and the source frame
#[derive(Debug, Clone)]
pub struct SymptomDataset {
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
    pub frame: DataFrame,
}

/// Load the training table.
///
/// The label vocabulary is built here; pass the returned encoder to
/// [`load_testing`] so both tables share one encoding.
///
/// # Panics
///
/// Panics when the table does not carry exactly [`FEATURE_COLUMNS`] feature
/// columns, or when the label count differs from the feature-row count.
/// These are data-contract violations, not recoverable conditions.
pub fn load_training(path: &str) -> Result<(SymptomDataset, LabelEncoder)> {
    let df = read_csv(path)?;
    // Training exports end with `prognosis` plus one unused column
    let features = feature_matrix(&df, 2)?;
    let raw_labels = label_values(&df)?;

    let encoder = LabelEncoder::fit(&raw_labels);
    let labels = encoder.transform(&raw_labels)?;

    assert_eq!(
        labels.len(),
        features.nrows(),
        "label count must equal feature-row count"
    );

    debug!(
        rows = df.height(),
        classes = encoder.len(),
        "loaded training data from {path}"
    );

    Ok((
        SymptomDataset { features, labels, frame: df },
        encoder,
    ))
}

/// Load the test table using the training vocabulary.
///
/// # Panics
///
/// Same data contracts as [`load_training`].
pub fn load_testing(path: &str, encoder: &LabelEncoder) -> Result<SymptomDataset> {
    let df = read_csv(path)?;
    // Test exports end with `prognosis` only
    let features = feature_matrix(&df, 1)?;
    let raw_labels = label_values(&df)?;
    let labels = encoder.transform(&raw_labels)?;

    assert_eq!(
        labels.len(),
        features.nrows(),
        "label count must equal feature-row count"
    );

    debug!(rows = df.height(), "loaded test data from {path}");

    Ok(SymptomDataset { features, labels, frame: df })
}

fn read_csv(path: &str) -> Result<DataFrame> {
    let file = File::open(path)
        .map_err(|e| PrognosisError::DataError(format!("{path}: {e}")))?;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| PrognosisError::DataError(format!("{path}: {e}")))
}

/// Slice the leading feature block positionally and convert it to a dense
/// row-major matrix. The last `trailing_columns` columns (label plus any
/// unused extras) are excluded.
fn feature_matrix(df: &DataFrame, trailing_columns: usize) -> Result<Array2<f64>> {
    let feature_count = df.width().saturating_sub(trailing_columns);
    assert_eq!(
        feature_count, FEATURE_COLUMNS,
        "expected exactly {FEATURE_COLUMNS} feature columns, found {feature_count}"
    );

    let columns = &df.get_columns()[..feature_count];
    let col_data: Vec<Vec<f64>> = columns
        .iter()
        .map(|col| {
            let as_f64 = col
                .cast(&DataType::Float64)
                .map_err(|e| PrognosisError::DataError(e.to_string()))?;
            let values: Vec<f64> = as_f64
                .f64()
                .map_err(|e| PrognosisError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn(
        (df.height(), feature_count),
        |(r, c)| col_data[c][r],
    ))
}

fn label_values(df: &DataFrame) -> Result<Vec<String>> {
    let col = df
        .column(LABEL_COLUMN)
        .map_err(|_| PrognosisError::DataError(format!("missing '{LABEL_COLUMN}' column")))?;

    let as_str = col
        .cast(&DataType::String)
        .map_err(|e| PrognosisError::DataError(e.to_string()))?;

    Ok(as_str
        .str()
        .map_err(|e| PrognosisError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or("").to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Write a CSV with `n_features` indicator columns, a prognosis column,
    /// and optionally the training table's extra trailing column.
    fn write_csv(n_features: usize, with_extra: bool, rows: &[(&str, usize)]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();

        let mut header: Vec<String> = (0..n_features).map(|i| format!("symptom_{i}")).collect();
        header.push(LABEL_COLUMN.to_string());
        if with_extra {
            header.push("unnamed".to_string());
        }
        writeln!(f, "{}", header.join(",")).unwrap();

        for &(label, hot) in rows {
            let mut cells: Vec<String> = (0..n_features)
                .map(|i| if i == hot { "1".to_string() } else { "0".to_string() })
                .collect();
            cells.push(label.to_string());
            if with_extra {
                cells.push(String::new());
            }
            writeln!(f, "{}", cells.join(",")).unwrap();
        }

        f
    }

    fn sample_rows() -> Vec<(&'static str, usize)> {
        vec![
            ("Flu", 0),
            ("Flu", 0),
            ("Malaria", 5),
            ("Malaria", 5),
            ("Typhoid", 9),
        ]
    }

    #[test]
    fn test_load_training_valid() {
        let f = write_csv(FEATURE_COLUMNS, true, &sample_rows());
        let (dataset, encoder) = load_training(f.path().to_str().unwrap()).unwrap();

        assert_eq!(dataset.features.nrows(), 5);
        assert_eq!(dataset.features.ncols(), FEATURE_COLUMNS);
        assert_eq!(dataset.labels.len(), dataset.features.nrows());
        // Sorted vocabulary
        assert_eq!(encoder.classes(), &["Flu", "Malaria", "Typhoid"]);
        assert_eq!(dataset.labels[0], 0.0);
        assert_eq!(dataset.labels[2], 1.0);
        assert_eq!(dataset.labels[4], 2.0);
    }

    #[test]
    #[should_panic(expected = "feature columns")]
    fn test_load_training_too_narrow() {
        let f = write_csv(FEATURE_COLUMNS - 1, true, &sample_rows());
        let _ = load_training(f.path().to_str().unwrap());
    }

    #[test]
    #[should_panic(expected = "feature columns")]
    fn test_load_training_too_wide() {
        let f = write_csv(FEATURE_COLUMNS + 1, true, &sample_rows());
        let _ = load_training(f.path().to_str().unwrap());
    }

    #[test]
    fn test_load_testing_shares_vocabulary() {
        let train = write_csv(FEATURE_COLUMNS, true, &sample_rows());
        let (_, encoder) = load_training(train.path().to_str().unwrap()).unwrap();

        let test = write_csv(FEATURE_COLUMNS, false, &[("Malaria", 5), ("Flu", 0)]);
        let dataset = load_testing(test.path().to_str().unwrap(), &encoder).unwrap();

        assert_eq!(dataset.labels.to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_unknown_test_label_is_an_error() {
        let train = write_csv(FEATURE_COLUMNS, true, &sample_rows());
        let (_, encoder) = load_training(train.path().to_str().unwrap()).unwrap();

        let test = write_csv(FEATURE_COLUMNS, false, &[("Dengue", 3)]);
        let result = load_testing(test.path().to_str().unwrap(), &encoder);
        assert!(matches!(result, Err(PrognosisError::DataError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_training("/nonexistent/training.csv");
        assert!(matches!(result, Err(PrognosisError::DataError(_))));
    }

    #[test]
    fn test_label_encoder_roundtrip() {
        let values = vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ];
        let encoder = LabelEncoder::fit(&values);

        assert_eq!(encoder.classes(), &["a", "b", "c"]);
        let encoded = encoder.transform(&values).unwrap();
        assert_eq!(encoded.to_vec(), vec![1.0, 0.0, 1.0, 2.0]);
        assert!(encoder.transform(&["d".to_string()]).is_err());
    }
}
