//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::cache::{NWaySetAssociativeCache, Upsert};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
    StatsResponse,
};

/// The cache served over HTTP.
pub type ServerCache = NWaySetAssociativeCache<String, String>;

/// Application state shared across all handlers.
///
/// The cache locks each set internally, so it is shared through a plain
/// `Arc` with no outer lock.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache
    pub cache: Arc<ServerCache>,
}

impl AppState {
    /// Creates a new AppState with the given cache.
    pub fn new(cache: ServerCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Fails if the configured dimensions are invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = NWaySetAssociativeCache::new(config.number_of_sets, config.set_size)?;
        Ok(Self::new(cache))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair, evicting the least recently used key of the
/// target set if it is full.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidArgument(error_msg));
    }

    let evicted = match state.cache.insert(req.key.clone(), req.value) {
        Upsert::Evicted { key, .. } => {
            debug!(key = %req.key, evicted = %key, "Set evicted an entry");
            Some(key)
        }
        Upsert::Inserted | Upsert::Updated { .. } => None,
    };

    Ok(Json(SetResponse::new(req.key, evicted)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state.cache.get(key.as_str())?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.remove(key.as_str()) {
        return Err(CacheError::KeyNotFound(format!("{:?}", key)));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear();
    Json(ClearResponse::new())
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = &state.cache;
    Json(StatsResponse::new(
        cache.stats(),
        cache.number_of_sets(),
        cache.set_size(),
    ))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        AppState::new(NWaySetAssociativeCache::new(16, 4).unwrap())
    }

    fn set_request(key: &str, value: &str) -> Json<SetRequest> {
        Json(SetRequest {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let result = set_handler(State(state.clone()), set_request("test_key", "test_value")).await;
        assert!(result.is_ok());
        assert!(result.unwrap().evicted.is_none());

        let result = get_handler(State(state.clone()), Path("test_key".to_string())).await;
        let response = result.unwrap();
        assert_eq!(response.value, "test_value");
    }

    #[tokio::test]
    async fn test_set_handler_reports_eviction() {
        let state = AppState::new(NWaySetAssociativeCache::new(1, 1).unwrap());

        set_handler(State(state.clone()), set_request("first", "1")).await.unwrap();
        let response = set_handler(State(state.clone()), set_request("second", "2"))
            .await
            .unwrap();

        assert_eq!(response.evicted.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state();

        let result = get_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::KeyNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();
        set_handler(State(state.clone()), set_request("to_delete", "value"))
            .await
            .unwrap();

        let result = delete_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(result.is_ok());

        let result = get_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(result.is_err());

        let result = delete_handler(State(state), Path("to_delete".to_string())).await;
        assert!(matches!(result, Err(CacheError::KeyNotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_handler() {
        let state = test_state();
        set_handler(State(state.clone()), set_request("a", "1")).await.unwrap();
        set_handler(State(state.clone()), set_request("b", "2")).await.unwrap();

        clear_handler(State(state.clone())).await;

        assert!(state.cache.is_empty());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();
        set_handler(State(state.clone()), set_request("a", "1")).await.unwrap();
        let _ = get_handler(State(state.clone()), Path("a".to_string())).await;
        let _ = get_handler(State(state.clone()), Path("b".to_string())).await;

        let response = stats_handler(State(state)).await;
        assert_eq!(response.stats.hits, 1);
        assert_eq!(response.stats.misses, 1);
        assert_eq!(response.stats.total_entries, 1);
        assert_eq!(response.stats.capacity, 64);
        assert_eq!(response.number_of_sets, 16);
        assert_eq!(response.set_size, 4);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state();

        // Empty key is invalid
        let result = set_handler(State(state), set_request("", "value")).await;
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
    }

    #[test]
    fn test_from_config_rejects_zero_sets() {
        let config = Config {
            number_of_sets: 0,
            ..Config::default()
        };
        assert!(AppState::from_config(&config).is_err());
    }
}
