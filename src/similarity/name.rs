//! Name Similarity Engine
//!
//! Bag-of-words over trail names: lowercase, split on anything that is not
//! alphanumeric or `_`, keep tokens of two or more characters. Each name
//! becomes a sparse term-count vector and pairs are compared with cosine
//! similarity.

use super::{top_k, validate_k, RankedHit, Score, SimilarityEngine, SimilarityMatrix, SimilarityMode};
use crate::error::{RecommendError, RecommendResult};
use crate::features::name_documents;
use crate::trail::Trail;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Sparse term counts, sorted by term index
///
/// Trail names rarely exceed a handful of distinct terms.
pub type TermCounts = SmallVec<[(usize, f64); 8]>;

/// Split text into normalized terms
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(|token| token.to_lowercase())
}

/// Term vocabulary fitted on a set of documents
#[derive(Debug, Clone, Default)]
pub struct CountVectorizer {
    vocabulary: FxHashMap<String, usize>,
}

impl CountVectorizer {
    /// Fit the vocabulary. Term indices follow sorted term order.
    pub fn fit(documents: &[&str]) -> Self {
        let mut terms: Vec<String> = documents.iter().flat_map(|doc| tokenize(doc)).collect();
        terms.sort_unstable();
        terms.dedup();

        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();

        Self { vocabulary }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Count vector for a document; out-of-vocabulary terms are ignored
    pub fn transform(&self, document: &str) -> TermCounts {
        let mut counts: TermCounts = SmallVec::new();

        for term in tokenize(document) {
            let Some(idx) = self.term_index(&term) else {
                continue;
            };
            match counts.iter_mut().find(|(i, _)| *i == idx) {
                Some(entry) => entry.1 += 1.0,
                None => counts.push((idx, 1.0)),
            }
        }

        counts.sort_unstable_by_key(|(idx, _)| *idx);
        counts
    }
}

fn norm(v: &TermCounts) -> f64 {
    v.iter().map(|(_, c)| c * c).sum::<f64>().sqrt()
}

fn dot(a: &TermCounts, b: &TermCounts) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

/// Cosine similarity of two count vectors; 0.0 if either is all zeros
pub fn cosine(a: &TermCounts, b: &TermCounts) -> f64 {
    let denom = norm(a) * norm(b);
    if denom == 0.0 {
        return 0.0;
    }
    (dot(a, b) / denom).clamp(0.0, 1.0)
}

/// Fit a vectorizer on `names` and compute the full cosine matrix
pub fn build(names: &[&str]) -> RecommendResult<(CountVectorizer, SimilarityMatrix)> {
    if names.is_empty() {
        return Err(RecommendError::EmptyDataset);
    }

    let vectorizer = CountVectorizer::fit(names);
    let vectors: Vec<TermCounts> = names.iter().map(|n| vectorizer.transform(n)).collect();

    let n = vectors.len();
    let mut matrix = SimilarityMatrix::zeros(n);

    for i in 0..n {
        // Exact 1.0 on the diagonal for any name with at least one term
        let self_sim = if vectors[i].is_empty() { 0.0 } else { 1.0 };
        matrix.set_symmetric(i, i, self_sim);

        for j in (i + 1)..n {
            matrix.set_symmetric(i, j, cosine(&vectors[i], &vectors[j]));
        }
    }

    tracing::debug!(
        "Name similarity: {} trails, {} terms",
        n,
        vectorizer.vocabulary_len()
    );

    Ok((vectorizer, matrix))
}

/// Most similar trails to `anchor_index`, descending score, anchor excluded
pub fn rank(anchor_index: usize, matrix: &SimilarityMatrix, k: usize) -> RecommendResult<Vec<(usize, f64)>> {
    validate_k(k)?;
    if anchor_index >= matrix.size() {
        return Err(RecommendError::not_found(format!("row {}", anchor_index)));
    }

    Ok(top_k(matrix.row(anchor_index), anchor_index, k, |a, b| b.total_cmp(a)))
}

/// Engine adapter for the name strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct NameSimilarity;

impl SimilarityEngine for NameSimilarity {
    fn mode(&self) -> SimilarityMode {
        SimilarityMode::Name
    }

    fn rank(&self, trails: &[Trail], anchor: usize, k: usize) -> RecommendResult<Vec<RankedHit>> {
        let names = name_documents(trails)?;
        let (_, matrix) = build(&names)?;

        let hits = rank(anchor, &matrix, k)?
            .into_iter()
            .map(|(index, score)| RankedHit {
                index,
                score: Score::Similarity(score),
            })
            .collect();

        Ok(hits)
    }
}
