use crate::config::AnalyzerConfig;
use crate::detection::ContentCategory;
use crate::pipeline::{AnalysisReport, Pipeline};
use crate::store::{RecordStore, StoredAnalysis, StoreStats};
use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

/// Shared state for the JSON API. The pipeline is immutable and lock-free;
/// the SQLite store sits behind a mutex because its connection is not Sync.
pub struct AppState {
    pipeline: Pipeline,
    store: Mutex<RecordStore>,
    min_content_length: usize,
    persist_threshold: u32,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub content: String,
    #[serde(rename = "type")]
    pub category: Option<ContentCategory>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn internal_error(err: anyhow::Error) -> ApiError {
    log::error!("Request failed: {err:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal server error".to_string(),
        }),
    )
}

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "analysis not found".to_string(),
        }),
    )
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/api/history", get(history))
        .route("/api/history/:id", get(history_entry).delete(delete_entry))
        .route("/api/stats", get(stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(config: AnalyzerConfig) -> Result<()> {
    let store = RecordStore::open(&config.server.database_path)?;
    let state = Arc::new(AppState {
        pipeline: Pipeline::new(config.detection.clone()),
        store: Mutex::new(store),
        min_content_length: config.server.min_content_length,
        persist_threshold: config.server.persist_threshold,
    });

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen))?;
    log::info!("API server listening on {}", config.server.listen);

    axum::serve(listener, router(state))
        .await
        .context("API server error")?;
    Ok(())
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> std::result::Result<Json<AnalysisReport>, ApiError> {
    let content = request.content.trim();
    if content.chars().count() < state.min_content_length {
        return Err(bad_request("content too short to analyze"));
    }

    let report = state.pipeline.analyze(content, request.category);

    if report.detection.threat_score >= state.persist_threshold {
        let store = state.store.lock().expect("store mutex poisoned");
        store
            .save(content, &report)
            .map_err(internal_error)?;
    }

    Ok(Json(report))
}

async fn history(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<Vec<StoredAnalysis>>, ApiError> {
    let store = state.store.lock().expect("store mutex poisoned");
    let entries = store.list_all().map_err(internal_error)?;
    Ok(Json(entries))
}

async fn history_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> std::result::Result<Json<StoredAnalysis>, ApiError> {
    let store = state.store.lock().expect("store mutex poisoned");
    let entry = store.get(id).map_err(internal_error)?;
    entry.map(Json).ok_or_else(not_found)
}

async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> std::result::Result<Json<DeleteResponse>, ApiError> {
    let store = state.store.lock().expect("store mutex poisoned");
    let deleted = store.delete(id).map_err(internal_error)?;
    if deleted {
        Ok(Json(DeleteResponse { deleted }))
    } else {
        Err(not_found())
    }
}

async fn stats(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<StoreStats>, ApiError> {
    let store = state.store.lock().expect("store mutex poisoned");
    let stats = store.stats().map_err(internal_error)?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state(persist_threshold: u32) -> Arc<AppState> {
        Arc::new(AppState {
            pipeline: Pipeline::default(),
            store: Mutex::new(RecordStore::open_in_memory().unwrap()),
            min_content_length: 5,
            persist_threshold,
        })
    }

    #[tokio::test]
    async fn short_content_is_rejected() {
        let state = test_state(20);
        let request = AnalyzeRequest {
            content: "hi".to_string(),
            category: None,
        };
        let result = analyze(State(state), Json(request)).await;
        let (status, _) = result.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn flagged_analyses_are_persisted() {
        let state = test_state(20);
        let request = AnalyzeRequest {
            content: "URGENT: verify your identity at http://bit.ly/x".to_string(),
            category: None,
        };
        let response = analyze(State(state.clone()), Json(request)).await.unwrap();
        assert!(response.0.detection.threat_score >= 20);

        let stored = state.store.lock().unwrap().list_all().unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn benign_analyses_are_not_persisted() {
        let state = test_state(20);
        let request = AnalyzeRequest {
            content: "just confirming our meeting tomorrow at noon".to_string(),
            category: None,
        };
        analyze(State(state.clone()), Json(request)).await.unwrap();

        let stored = state.store.lock().unwrap().list_all().unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn missing_history_entry_is_404() {
        let state = test_state(20);
        let result = history_entry(State(state), Path(42)).await;
        let (status, _) = result.err().unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_then_stats_reflect_removal() {
        let state = test_state(0);
        let request = AnalyzeRequest {
            content: "URGENT: your account is suspended, act now".to_string(),
            category: None,
        };
        analyze(State(state.clone()), Json(request)).await.unwrap();

        let id = state.store.lock().unwrap().list_all().unwrap()[0].id;
        let response = delete_entry(State(state.clone()), Path(id)).await.unwrap();
        assert!(response.0.deleted);

        let stats = stats_of(&state).await;
        assert_eq!(stats.total_analyses, 0);
    }

    async fn stats_of(state: &Arc<AppState>) -> StoreStats {
        let response = stats(State(state.clone())).await.unwrap();
        response.0
    }
}
