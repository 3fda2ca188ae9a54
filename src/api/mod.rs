//! HTTP API Module
//!
//! Public endpoints of the service:
//! - `GET /health`: Build status, queue, last error and built indexes.
//! - `POST /refresh`: Queue an index rebuild for a term (`202 Accepted`).
//! - `POST /search`: Query the index of a term (`503` while it is not built yet).

pub mod handlers;
pub mod types;

use crate::index::IndexEngine;
use crate::orchestrator::Orchestrator;
use handlers::{handle_health, handle_refresh, handle_search};

use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

pub const ENDPOINT_HEALTH: &str = "/health";
pub const ENDPOINT_REFRESH: &str = "/refresh";
pub const ENDPOINT_SEARCH: &str = "/search";

pub fn router<E: IndexEngine>(orchestrator: Arc<Orchestrator<E>>) -> Router {
    Router::new()
        .route(ENDPOINT_HEALTH, get(handle_health::<E>))
        .route(ENDPOINT_REFRESH, post(handle_refresh::<E>))
        .route(ENDPOINT_SEARCH, post(handle_search::<E>))
        .layer(Extension(orchestrator))
}
