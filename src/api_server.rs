//! Axum API server
//!
//! JSON endpoints over the recommender, with a Moka cache in front of the
//! per-query pipeline. Every client error, including a malformed query
//! string, is answered as `400 {"error": ...}`.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use moka::future::Cache;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::cache::RecommendationKey;
use crate::config::RecommenderConfig;
use crate::data::TrailData;
use crate::error::RecommendError;
use crate::filter::TrailFilters;
use crate::recommender::{Recommendation, RecommendQuery, Recommender};
use crate::similarity::SimilarityMode;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub data: Arc<TrailData>,
    pub recommender: Arc<Recommender>,
    pub cache: Cache<RecommendationKey, Arc<Recommendation>>,
}

impl AppState {
    /// Load the dataset and optional config file
    pub fn load(data_path: &Path, config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => {
                tracing::info!("Loading recommender config from {:?}", path);
                RecommenderConfig::load(path)?
            }
            None => RecommenderConfig::default(),
        };

        let data = TrailData::load(data_path)?;
        Ok(Self::new(data, config))
    }

    pub fn new(data: TrailData, config: RecommenderConfig) -> Self {
        tracing::info!("Initializing Moka cache...");
        let cache = Cache::builder()
            .max_capacity(config.cache.max_capacity)
            .time_to_live(Duration::from_secs(config.cache.ttl_secs))
            .build();

        Self {
            data: Arc::new(data),
            recommender: Arc::new(Recommender::new(config)),
            cache,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/trails/recommend", get(recommend_trails))
        .route("/api/trails/regions", get(list_regions))
        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "trails": state.data.len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Query string of `/api/trails/recommend`; labels as shown in the UI
#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    pub q: String,
    pub mode: Option<String>,
    pub k: Option<usize>,
    pub region: Option<String>,
    pub duration: Option<String>,
    pub length: Option<String>,
    pub ascent: Option<String>,
}

impl RecommendParams {
    fn into_query(self, default_results: usize) -> Result<RecommendQuery, RecommendError> {
        let mode = match self.mode.as_deref() {
            Some(mode) => mode.parse::<SimilarityMode>()?,
            None => SimilarityMode::Name,
        };

        let filters = TrailFilters::from_labels(
            self.region.as_deref(),
            self.duration.as_deref(),
            self.length.as_deref(),
            self.ascent.as_deref(),
        )?;

        let query = RecommendQuery {
            term: self.q,
            mode,
            filters,
            k: self.k.unwrap_or(default_results),
        };
        query.validate()?;
        Ok(query)
    }
}

async fn recommend_trails(
    State(state): State<AppState>,
    params: Result<Query<RecommendParams>, QueryRejection>,
) -> Result<Json<Recommendation>, AppError> {
    let Query(params) = params?;
    let query = params.into_query(state.recommender.config().default_results)?;
    let cache_key = RecommendationKey::new(&state.data, &query);

    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for '{}'", query.term);
        return Ok(Json(cached.as_ref().clone()));
    }

    // CPU-bound work: run in blocking thread pool
    let data = state.data.clone();
    let recommender = state.recommender.clone();
    let recommendation = tokio::task::spawn_blocking(move || recommender.recommend(&data, &query))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    state
        .cache
        .insert(cache_key, Arc::new(recommendation.clone()))
        .await;

    Ok(Json(recommendation))
}

async fn list_regions(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let regions = state.data.regions()?;

    Ok(Json(serde_json::json!({
        "rows": regions.len(),
        "data": regions
    })))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl From<RecommendError> for AppError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::InvalidParameter(_) => AppError::BadRequest(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(mode: Option<&str>, k: Option<usize>, duration: Option<&str>) -> RecommendParams {
        RecommendParams {
            q: "Blue Lake Track".to_string(),
            mode: mode.map(str::to_string),
            k,
            region: None,
            duration: duration.map(str::to_string),
            length: None,
            ascent: None,
        }
    }

    #[test]
    fn test_params_defaults() {
        let query = params(None, None, None).into_query(5).unwrap();
        assert_eq!(query.mode, SimilarityMode::Name);
        assert_eq!(query.k, 5);
        assert!(query.filters.is_unrestricted());
    }

    #[test]
    fn test_params_invalid_values_are_bad_requests() {
        for bad in [
            params(Some("tfidf"), None, None),
            params(None, Some(0), None),
            params(None, None, Some("2-3h")),
        ] {
            let err = AppError::from(bad.into_query(5).unwrap_err());
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[test]
    fn test_internal_errors_map_to_500() {
        let response = AppError::from(RecommendError::EmptyDataset).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
