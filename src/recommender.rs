//! Recommendation facade
//!
//! One query runs filter → build → rank → format against an explicit
//! `TrailData`. Nothing is shared between queries except the read-only source
//! table, so batches fan out with rayon.

use crate::config::RecommenderConfig;
use crate::data::{trails_from_frame, TrailData};
use crate::error::{RecommendError, RecommendResult};
use crate::filter::TrailFilters;
use crate::format::{format_hits, TrailResult};
use crate::ranker::{self, RankerState};
use crate::similarity::SimilarityMode;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One recommendation request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecommendQuery {
    /// Exact trail name, or a substring for fallback search
    pub term: String,
    pub mode: SimilarityMode,
    #[serde(default)]
    pub filters: TrailFilters,
    /// Maximum number of results, must be >= 1
    pub k: usize,
}

impl RecommendQuery {
    pub fn new(term: impl Into<String>, mode: SimilarityMode, k: usize) -> Self {
        Self {
            term: term.into(),
            mode,
            filters: TrailFilters::default(),
            k,
        }
    }

    pub fn with_filters(mut self, filters: TrailFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn validate(&self) -> RecommendResult<()> {
        if self.k < 1 {
            return Err(RecommendError::invalid(format!(
                "k must be >= 1, got {}",
                self.k
            )));
        }
        Ok(())
    }
}

/// How the results were produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultMode {
    SimilarityRanked,
    FallbackUnranked,
    NoResults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub mode: ResultMode,
    pub results: Vec<TrailResult>,
}

impl Recommendation {
    pub fn empty() -> Self {
        Self {
            mode: ResultMode::NoResults,
            results: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Recommender {
    config: RecommenderConfig,
}

impl Recommender {
    pub fn new(config: RecommenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Resolve one query
    ///
    /// Fails with `EmptyDataset` when the source table has no rows. An empty
    /// filtered view is not an error and ends in `NoResults`.
    pub fn recommend(&self, data: &TrailData, query: &RecommendQuery) -> RecommendResult<Recommendation> {
        query.validate()?;
        if data.is_empty() {
            return Err(RecommendError::EmptyDataset);
        }

        let start = Instant::now();

        let view = query.filters.apply(data.frame())?;
        let candidates = trails_from_frame(&view)?;

        let engine = query.mode.engine();
        let state = ranker::run(&candidates, &query.term, engine.as_ref(), query.k)?;

        let recommendation = match state {
            RankerState::Ranked { hits, fallback } => Recommendation {
                mode: if fallback {
                    ResultMode::FallbackUnranked
                } else {
                    ResultMode::SimilarityRanked
                },
                results: format_hits(&candidates, &hits, &self.config.formatter),
            },
            _ => Recommendation::empty(),
        };

        tracing::debug!(
            "Query '{}' ({}, k={}) over {} candidates: {:?} with {} results in {:?}",
            query.term,
            query.mode,
            query.k,
            candidates.len(),
            recommendation.mode,
            recommendation.results.len(),
            start.elapsed()
        );

        Ok(recommendation)
    }

    /// Resolve independent queries in parallel, results in input order
    pub fn recommend_batch(
        &self,
        data: &TrailData,
        queries: &[RecommendQuery],
    ) -> Vec<RecommendResult<Recommendation>> {
        queries
            .par_iter()
            .map(|query| self.recommend(data, query))
            .collect()
    }
}
