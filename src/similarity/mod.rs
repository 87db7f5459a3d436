//! Similarity Engines
//!
//! Two interchangeable strategies behind `SimilarityEngine`:
//! - `name`: count-vectorized trail names + pairwise cosine similarity
//! - `attribute`: z-scored numeric/one-hot features + Euclidean distance
//!
//! Both exclude the anchor from their output and break ties by table order.

pub mod attribute;
pub mod name;

pub use attribute::AttributeSimilarity;
pub use name::{CountVectorizer, NameSimilarity};

use crate::error::{RecommendError, RecommendResult};
use crate::trail::Trail;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Which engine ranks the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMode {
    Name,
    Attribute,
}

impl SimilarityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMode::Name => "name",
            SimilarityMode::Attribute => "attribute",
        }
    }

    /// Engine instance for this mode
    pub fn engine(&self) -> Box<dyn SimilarityEngine + Send + Sync> {
        match self {
            SimilarityMode::Name => Box::new(NameSimilarity),
            SimilarityMode::Attribute => Box::new(AttributeSimilarity),
        }
    }
}

impl fmt::Display for SimilarityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMode {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SimilarityMode::Name),
            "attribute" => Ok(SimilarityMode::Attribute),
            other => Err(RecommendError::invalid(format!(
                "unknown similarity mode '{}' (expected 'name' or 'attribute')",
                other
            ))),
        }
    }
}

/// Score attached to a ranked candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Cosine similarity in [0, 1], higher is closer
    Similarity(f64),
    /// Euclidean distance >= 0, lower is closer
    Distance(f64),
    /// Fallback match, no similarity computed
    Unranked,
}

/// One candidate in a ranked result, indexed into the candidate set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedHit {
    pub index: usize,
    pub score: Score,
}

/// Ranks a candidate set against an anchor row
pub trait SimilarityEngine {
    fn mode(&self) -> SimilarityMode;

    /// Top-`k` candidates for `anchor`, anchor excluded
    ///
    /// Fails with `TrailNotFound` when `anchor` is not a row of `trails`.
    fn rank(&self, trails: &[Trail], anchor: usize, k: usize) -> RecommendResult<Vec<RankedHit>>;
}

/// Square pairwise similarity matrix, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub(crate) fn zeros(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    pub(crate) fn set_symmetric(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.size + j] = value;
        self.values[j * self.size + i] = value;
    }
}

pub(crate) fn validate_k(k: usize) -> RecommendResult<()> {
    if k < 1 {
        return Err(RecommendError::invalid("result count k must be >= 1"));
    }
    Ok(())
}

/// Stable top-k over a score vector, skipping `anchor`
///
/// `better` orders two scores; equal scores keep table order.
pub(crate) fn top_k(
    scores: &[f64],
    anchor: usize,
    k: usize,
    better: impl Fn(&f64, &f64) -> Ordering,
) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(i, _)| *i != anchor)
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| better(&a.1, &b.1));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("name".parse::<SimilarityMode>().unwrap(), SimilarityMode::Name);
        assert_eq!(" Attribute ".parse::<SimilarityMode>().unwrap(), SimilarityMode::Attribute);
        assert!(matches!(
            "tfidf".parse::<SimilarityMode>(),
            Err(RecommendError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_top_k_stable_ties() {
        let scores = [1.0, 0.5, 0.9, 0.5, 0.9];
        let ranked = top_k(&scores, 0, 10, |a, b| b.total_cmp(a));
        let order: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_top_k_excludes_anchor_and_truncates() {
        let scores = [0.0, 3.0, 1.0, 2.0];
        let ranked = top_k(&scores, 2, 2, |a, b| a.total_cmp(b));
        assert_eq!(ranked, vec![(0, 0.0), (3, 2.0)]);
    }

    #[test]
    fn test_validate_k() {
        assert!(validate_k(0).is_err());
        assert!(validate_k(1).is_ok());
    }
}
