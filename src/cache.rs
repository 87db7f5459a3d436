//! Memoization key for recommendation results
//!
//! Similarity spaces depend on the filtered candidate set, so a cached result
//! is only reusable for the same dataset, the same filters, the same query
//! text, the same mode and the same `k`.

use crate::data::TrailData;
use crate::filter::TrailFilters;
use crate::recommender::RecommendQuery;
use crate::similarity::SimilarityMode;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecommendationKey {
    pub dataset_version: u64,
    pub filters: TrailFilters,
    pub query: String,
    pub mode: SimilarityMode,
    pub k: usize,
}

impl RecommendationKey {
    pub fn new(data: &TrailData, query: &RecommendQuery) -> Self {
        Self {
            dataset_version: data.version(),
            filters: query.filters.clone(),
            query: query.term.clone(),
            mode: query.mode,
            k: query.k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::DurationBucket;
    use rustc_hash::FxHashSet;

    fn key(version: u64, filters: TrailFilters, k: usize) -> RecommendationKey {
        RecommendationKey {
            dataset_version: version,
            filters,
            query: "Blue Lake Track".to_string(),
            mode: SimilarityMode::Name,
            k,
        }
    }

    #[test]
    fn test_key_distinguishes_filter_context() {
        let mut keys = FxHashSet::default();
        keys.insert(key(1, TrailFilters::default(), 5));
        keys.insert(key(1, TrailFilters::default().with_duration(DurationBucket::FiveHoursPlus), 5));
        keys.insert(key(2, TrailFilters::default(), 5));
        keys.insert(key(1, TrailFilters::default(), 6));
        keys.insert(key(1, TrailFilters::default(), 5));

        assert_eq!(keys.len(), 4);
    }
}
