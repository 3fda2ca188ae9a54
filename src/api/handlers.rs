use super::types::*;
use crate::error::{ServiceError, ValidationError};
use crate::index::IndexEngine;
use crate::orchestrator::{HealthReport, Orchestrator, RefreshAccepted, SearchQuery};

use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, detail: String) -> ApiError {
    (status, Json(ErrorResponse { detail }))
}

fn validation_error(e: ValidationError) -> ApiError {
    tracing::debug!("Rejected request: {}", e);
    api_error(StatusCode::BAD_REQUEST, e.to_string())
}

fn service_error(e: ServiceError) -> ApiError {
    let status = e.status_code();
    if status.is_server_error() {
        tracing::warn!("Search unavailable ({}): {}", status, e);
    } else {
        tracing::debug!("Rejected search: {}", e);
    }
    api_error(status, e.to_string())
}

pub async fn handle_health<E: IndexEngine>(
    Extension(orchestrator): Extension<Arc<Orchestrator<E>>>,
) -> Json<HealthReport> {
    Json(orchestrator.health_status())
}

/// Queues a rebuild and returns immediately. Progress is visible on `/health`.
pub async fn handle_refresh<E: IndexEngine>(
    Extension(orchestrator): Extension<Arc<Orchestrator<E>>>,
    Json(req): Json<RefreshRequest>,
) -> Result<(StatusCode, Json<RefreshAccepted>), ApiError> {
    let accepted = orchestrator
        .refresh_async(req.year, &req.semester, req.allowed_subjects)
        .map_err(validation_error)?;

    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

pub async fn handle_search<E: IndexEngine>(
    Extension(orchestrator): Extension<Arc<Orchestrator<E>>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse<E::Hit>>, ApiError> {
    let query = SearchQuery {
        query: req.query.clone(),
        threshold: req.threshold,
        year: req.year,
        semester: req.semester,
        allowed_subjects: req.allowed_subjects,
    };

    let outcome = orchestrator.search(query).await.map_err(service_error)?;

    Ok(Json(SearchResponse {
        query: req.query,
        threshold: req.threshold,
        count: outcome.hits.len(),
        year: outcome.term.year(),
        semester: outcome.term.semester(),
        allowed_subjects: outcome.entry.allowed_subjects().cloned(),
        last_refreshed: outcome.entry.last_refreshed(),
        results: outcome.hits,
    }))
}
