//! Trail Recommender
//!
//! Content-based recommendations over a snapshot of hiking trails.
//!
//! - `data/`: CSV loading and normalization with Polars
//! - `filter/`: region and bucket filters over the trail table
//! - `features/` + `similarity/`: name (cosine) and attribute (Euclidean) engines
//! - `ranker/`: anchor lookup, top-k and substring fallback
//! - `format/`: output schema
//! - `recommender/`: the per-query pipeline and batch entry point
//!
//! The HTTP layer lives behind the `api` feature.

pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod filter;
pub mod format;
pub mod ranker;
pub mod recommender;
pub mod similarity;
pub mod trail;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use cache::RecommendationKey;
pub use config::{CacheConfig, FormatterConfig, RecommenderConfig};
pub use data::TrailData;
pub use error::{RecommendError, RecommendResult};
pub use filter::{AscentBucket, DurationBucket, LengthBucket, TrailFilters};
pub use format::{decompose_duration, TrailResult};
pub use recommender::{Recommendation, RecommendQuery, Recommender, ResultMode};
pub use similarity::{SimilarityEngine, SimilarityMode};
pub use trail::{Coordinates, Trail};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
