//! Feature correlation report.
//!
//! Computes pairwise Pearson correlation over the numeric columns of the
//! training table and renders it as a heatmap PNG. The report is a side
//! effect only; nothing downstream consumes it.

use crate::error::{PrognosisError, Result};
use ndarray::Array2;
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Fixed output location for the heatmap, overwritten on every run
pub const HEATMAP_PATH: &str = "feature_correlation.png";

/// YlGnBu-style gradient stops, low correlation to high
const GRADIENT: [(u8, u8, u8); 5] = [
    (255, 255, 217),
    (199, 233, 180),
    (65, 182, 196),
    (34, 94, 168),
    (8, 29, 88),
];

/// Compute the correlation matrix of `df`'s numeric columns and write the
/// heatmap to `path`.
pub fn feature_correlation(df: &DataFrame, path: &Path) -> Result<()> {
    let (names, corr) = correlation_matrix(df)?;
    render_heatmap(&corr, path)?;
    info!(
        features = names.len(),
        path = %path.display(),
        "wrote feature correlation heatmap"
    );
    Ok(())
}

/// Pairwise Pearson correlation over numeric columns.
///
/// Zero-variance columns correlate as 0.0 with everything (the coefficient
/// is undefined there; 0.0 keeps the matrix renderable).
pub fn correlation_matrix(df: &DataFrame) -> Result<(Vec<String>, Array2<f64>)> {
    let mut names = Vec::new();
    let mut centered: Vec<Vec<f64>> = Vec::new();
    let mut norms: Vec<f64> = Vec::new();

    for col in df.get_columns() {
        if !is_numeric(col.dtype()) {
            continue;
        }

        let as_f64 = col
            .cast(&DataType::Float64)
            .map_err(|e| PrognosisError::DataError(e.to_string()))?;
        let values: Vec<f64> = as_f64
            .f64()
            .map_err(|e| PrognosisError::DataError(e.to_string()))?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();

        let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
        let column: Vec<f64> = values.iter().map(|v| v - mean).collect();
        let norm = column.iter().map(|v| v * v).sum::<f64>().sqrt();

        names.push(col.name().to_string());
        centered.push(column);
        norms.push(norm);
    }

    let n = names.len();
    let mut corr = Array2::zeros((n, n));

    for i in 0..n {
        for j in i..n {
            let value = if norms[i] > 0.0 && norms[j] > 0.0 {
                let dot: f64 = centered[i]
                    .iter()
                    .zip(centered[j].iter())
                    .map(|(a, b)| a * b)
                    .sum();
                dot / (norms[i] * norms[j])
            } else {
                0.0
            };
            corr[[i, j]] = value;
            corr[[j, i]] = value;
        }
    }

    Ok((names, corr))
}

/// Render a square cell heatmap of `corr` to `path` as a PNG.
pub fn render_heatmap(corr: &Array2<f64>, path: &Path) -> Result<()> {
    let n = corr.nrows();
    if n == 0 {
        return Err(PrognosisError::PlotError(
            "no numeric columns to plot".to_string(),
        ));
    }

    let cell = (512 / n).clamp(1, 16) as u32;
    let size = n as u32 * cell;
    let mut img = image::RgbImage::new(size, size);

    for i in 0..n {
        for j in 0..n {
            let color = colorize(corr[[i, j]]);
            for dy in 0..cell {
                for dx in 0..cell {
                    img.put_pixel(j as u32 * cell + dx, i as u32 * cell + dy, color);
                }
            }
        }
    }

    img.save(path)
        .map_err(|e| PrognosisError::PlotError(e.to_string()))
}

/// Map a correlation in [-1, 1] onto the gradient.
fn colorize(value: f64) -> image::Rgb<u8> {
    let t = ((value.clamp(-1.0, 1.0) + 1.0) / 2.0) * (GRADIENT.len() - 1) as f64;
    let lower = t.floor() as usize;
    let upper = (lower + 1).min(GRADIENT.len() - 1);
    let frac = t - lower as f64;

    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (r0, g0, b0) = GRADIENT[lower];
    let (r1, g1, b1) = GRADIENT[upper];

    image::Rgb([lerp(r0, r1), lerp(g0, g1), lerp(b0, b1)])
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}
