//! Attribute Similarity Engine
//!
//! Standardizes the candidate feature matrix (z-score per column, population
//! statistics over the candidate rows only) and ranks by Euclidean distance to
//! the anchor row.
//!
//! The scaling basis is the candidate set. Filtering before ranking changes
//! both the one-hot columns and the means/deviations, so distances from two
//! differently filtered queries live in different spaces.

use super::{top_k, validate_k, RankedHit, Score, SimilarityEngine, SimilarityMode};
use crate::error::{RecommendError, RecommendResult};
use crate::features::{attribute_matrix, FeatureMatrix};
use crate::trail::Trail;

/// Column means and population standard deviations (ddof = 0)
fn column_stats(features: &FeatureMatrix) -> (Vec<f64>, Vec<f64>) {
    let n = features.n_rows() as f64;
    let width = features.n_cols();

    let mut mean = vec![0.0; width];
    for i in 0..features.n_rows() {
        for (j, value) in features.row(i).iter().enumerate() {
            mean[j] += value;
        }
    }
    mean.iter_mut().for_each(|m| *m /= n);

    let mut std = vec![0.0; width];
    for i in 0..features.n_rows() {
        for (j, value) in features.row(i).iter().enumerate() {
            std[j] += (value - mean[j]).powi(2);
        }
    }
    std.iter_mut().for_each(|s| *s = (*s / n).sqrt());

    (mean, std)
}

/// Rescale each column to zero mean, unit variance
///
/// Constant columns are centred only (they become all zeros).
pub fn standardize(features: &FeatureMatrix) -> FeatureMatrix {
    let (mean, std) = column_stats(features);
    let width = features.n_cols();

    let mut scaled = features.clone();
    for (idx, value) in scaled.values_mut().iter_mut().enumerate() {
        let j = idx % width;
        *value -= mean[j];
        if std[j] > 1e-12 {
            *value /= std[j];
        }
    }

    scaled
}

/// Euclidean distance from every row to `anchor_row`
pub fn distances(scaled: &FeatureMatrix, anchor_row: usize) -> RecommendResult<Vec<f64>> {
    if anchor_row >= scaled.n_rows() {
        return Err(RecommendError::not_found(format!("row {}", anchor_row)));
    }

    let anchor = scaled.row(anchor_row);
    let distances = (0..scaled.n_rows())
        .map(|i| {
            scaled
                .row(i)
                .iter()
                .zip(anchor)
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .collect();

    Ok(distances)
}

/// Closest trails first, anchor excluded, ties in table order
pub fn rank(distances: &[f64], anchor_row: usize, k: usize) -> RecommendResult<Vec<(usize, f64)>> {
    validate_k(k)?;
    if anchor_row >= distances.len() {
        return Err(RecommendError::not_found(format!("row {}", anchor_row)));
    }

    Ok(top_k(distances, anchor_row, k, |a, b| a.total_cmp(b)))
}

/// Engine adapter for the attribute strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeSimilarity;

impl SimilarityEngine for AttributeSimilarity {
    fn mode(&self) -> SimilarityMode {
        SimilarityMode::Attribute
    }

    fn rank(&self, trails: &[Trail], anchor: usize, k: usize) -> RecommendResult<Vec<RankedHit>> {
        let features = attribute_matrix(trails)?;
        let scaled = standardize(&features);
        let distances = distances(&scaled, anchor)?;

        let hits = rank(&distances, anchor, k)?
            .into_iter()
            .map(|(index, distance)| RankedHit {
                index,
                score: Score::Distance(distance),
            })
            .collect();

        Ok(hits)
    }
}
