//! Ranker & Fallback
//!
//! State machine over one candidate set:
//!
//! ```text
//! Lookup --found--> (engine) --ok--> Ranked
//!    |                  |  '--no hits--> NoResults
//!    |            TrailNotFound
//!    v                  v
//! FallbackSearch <------+
//!    |--matches--> Ranked (fallback, table order)
//!    '--none-----> NoResults
//! ```
//!
//! Only `TrailNotFound` leads to fallback. Any other engine error is returned
//! as-is so real failures are not hidden behind a name search.

use crate::error::{RecommendError, RecommendResult};
use crate::similarity::{RankedHit, Score, SimilarityEngine};
use crate::trail::Trail;

/// Result of resolving the query string to an anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(usize),
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RankerState {
    Lookup,
    /// Terminal. `fallback` marks substring matches that were not scored.
    Ranked { hits: Vec<RankedHit>, fallback: bool },
    FallbackSearch,
    /// Terminal
    NoResults,
}

impl RankerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RankerState::Ranked { .. } | RankerState::NoResults)
    }
}

/// Exact, case-sensitive name match. Names are unique, so the first hit is the only one.
pub fn lookup(trails: &[Trail], term: &str) -> LookupOutcome {
    trails
        .iter()
        .position(|t| t.name == term)
        .map_or(LookupOutcome::NotFound, LookupOutcome::Found)
}

/// Case-sensitive substring search over names, table order, truncated to `k`
pub fn fallback_search(trails: &[Trail], term: &str, k: usize) -> Vec<RankedHit> {
    trails
        .iter()
        .enumerate()
        .filter(|(_, t)| t.name.contains(term))
        .take(k)
        .map(|(index, _)| RankedHit {
            index,
            score: Score::Unranked,
        })
        .collect()
}

/// Advance one state
pub fn step(
    state: RankerState,
    trails: &[Trail],
    term: &str,
    engine: &dyn SimilarityEngine,
    k: usize,
) -> RecommendResult<RankerState> {
    let next = match state {
        RankerState::Lookup => match lookup(trails, term) {
            LookupOutcome::Found(anchor) => match engine.rank(trails, anchor, k) {
                // Anchor was the only candidate
                Ok(hits) if hits.is_empty() => RankerState::NoResults,
                Ok(hits) => RankerState::Ranked { hits, fallback: false },
                Err(RecommendError::TrailNotFound { name }) => {
                    tracing::debug!("Engine could not resolve anchor {}, falling back", name);
                    RankerState::FallbackSearch
                }
                Err(e) => return Err(e),
            },
            LookupOutcome::NotFound => {
                tracing::debug!("No trail named '{}' in candidate set", term);
                RankerState::FallbackSearch
            }
        },
        RankerState::FallbackSearch => {
            let hits = fallback_search(trails, term, k);
            if hits.is_empty() {
                RankerState::NoResults
            } else {
                RankerState::Ranked { hits, fallback: true }
            }
        }
        terminal => terminal,
    };

    Ok(next)
}

/// Run from `Lookup` to a terminal state
pub fn run(
    trails: &[Trail],
    term: &str,
    engine: &dyn SimilarityEngine,
    k: usize,
) -> RecommendResult<RankerState> {
    let mut state = RankerState::Lookup;
    while !state.is_terminal() {
        state = step(state, trails, term, engine, k)?;
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::{AttributeSimilarity, NameSimilarity, SimilarityMode};

    fn trails() -> Vec<Trail> {
        vec![
            Trail::new("Lake Matheson Walk", "West Coast", "Loop", 1.5, 4.4, 60.0),
            Trail::new("Roys Peak Track", "Otago", "Return", 6.0, 16.0, 1258.0),
            Trail::new("Blue Lake Track", "Nelson Tasman", "Return", 2.0, 8.0, 150.0),
            Trail::new("Lake Marian Track", "Southland", "Return", 3.0, 6.0, 400.0),
        ]
    }

    /// Engine that always fails with the given error
    struct Failing(fn() -> RecommendError);

    impl SimilarityEngine for Failing {
        fn mode(&self) -> SimilarityMode {
            SimilarityMode::Name
        }

        fn rank(&self, _: &[Trail], _: usize, _: usize) -> RecommendResult<Vec<RankedHit>> {
            Err((self.0)())
        }
    }

    #[test]
    fn test_lookup_exact_and_case_sensitive() {
        let trails = trails();
        assert_eq!(lookup(&trails, "Blue Lake Track"), LookupOutcome::Found(2));
        assert_eq!(lookup(&trails, "blue lake track"), LookupOutcome::NotFound);
    }

    #[test]
    fn test_found_anchor_is_ranked() {
        let state = run(&trails(), "Blue Lake Track", &NameSimilarity, 2).unwrap();
        match state {
            RankerState::Ranked { hits, fallback } => {
                assert!(!fallback);
                assert_eq!(hits.len(), 2);
                assert_eq!(hits[0].index, 3);
                assert!(hits.iter().all(|h| h.index != 2));
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn test_substring_fallback_in_table_order() {
        let state = run(&trails(), "Lake", &AttributeSimilarity, 10).unwrap();
        match state {
            RankerState::Ranked { hits, fallback } => {
                assert!(fallback);
                let order: Vec<usize> = hits.iter().map(|h| h.index).collect();
                assert_eq!(order, vec![0, 2, 3]);
                assert!(hits.iter().all(|h| h.score == Score::Unranked));
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn test_fallback_truncates_to_k() {
        let hits = fallback_search(&trails(), "Track", 2);
        assert_eq!(hits.iter().map(|h| h.index).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_fallback_is_case_sensitive() {
        assert!(fallback_search(&trails(), "lake", 10).is_empty());
    }

    #[test]
    fn test_no_match_is_no_results() {
        let state = run(&trails(), "Nonexistent Trail", &NameSimilarity, 5).unwrap();
        assert_eq!(state, RankerState::NoResults);
    }

    #[test]
    fn test_engine_not_found_degrades_to_fallback() {
        let engine = Failing(|| RecommendError::not_found("Blue Lake Track"));
        let state = run(&trails(), "Blue Lake Track", &engine, 5).unwrap();
        assert!(matches!(state, RankerState::Ranked { fallback: true, .. }));
    }

    #[test]
    fn test_other_engine_errors_propagate() {
        let engine = Failing(|| RecommendError::malformed(3, "bad profile"));
        let result = run(&trails(), "Blue Lake Track", &engine, 5);
        assert!(matches!(result, Err(RecommendError::MalformedRecord { row: 3, .. })));
    }

    #[test]
    fn test_anchor_alone_is_no_results() {
        let trails = vec![Trail::new("Roys Peak Track", "Otago", "Return", 6.0, 16.0, 1258.0)];
        for engine in [&NameSimilarity as &dyn SimilarityEngine, &AttributeSimilarity] {
            let state = run(&trails, "Roys Peak Track", engine, 5).unwrap();
            assert_eq!(state, RankerState::NoResults);
        }
    }

    #[test]
    fn test_terminal_states_are_fixed_points() {
        let trails = trails();
        let state = step(RankerState::NoResults, &trails, "x", &NameSimilarity, 1).unwrap();
        assert_eq!(state, RankerState::NoResults);
    }
}
