//! Error taxonomy for the recommendation core
//!
//! Only `TrailNotFound` is recovered inside the core (it drives fallback
//! search). Everything else reaches the caller.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    /// No rows to operate on
    #[error("dataset is empty")]
    EmptyDataset,

    /// Anchor trail could not be resolved in the candidate set
    #[error("trail not found: {name}")]
    TrailNotFound { name: String },

    /// Caller-contract violation, rejected before any computation
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A row that cannot be turned into a trail record
    #[error("malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error("table operation failed: {0}")]
    Table(#[from] PolarsError),
}

impl RecommendError {
    pub fn not_found(name: impl Into<String>) -> Self {
        RecommendError::TrailNotFound { name: name.into() }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        RecommendError::InvalidParameter(message.into())
    }

    pub fn malformed(row: usize, reason: impl Into<String>) -> Self {
        RecommendError::MalformedRecord {
            row,
            reason: reason.into(),
        }
    }
}

pub type RecommendResult<T> = std::result::Result<T, RecommendError>;
