//! HTTP Data Transfer Objects
//!
//! Request and response bodies of the public endpoints. Field names follow the
//! wire format (`snake_case`).

use crate::index::SubjectFilter;
use crate::term::Semester;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_THRESHOLD: f32 = 0.3;

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

/// Body of `POST /refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub year: i32,
    pub semester: String,
    #[serde(default)]
    pub allowed_subjects: Option<Vec<String>>,
}

/// Body of `POST /search`.
///
/// `year` and `semester` may be omitted when a default term is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub allowed_subjects: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse<H> {
    pub query: String,
    pub threshold: f32,
    pub count: usize,
    pub year: i32,
    pub semester: Semester,
    /// Subject filter the searched index was built with.
    pub allowed_subjects: Option<SubjectFilter>,
    pub last_refreshed: DateTime<Utc>,
    pub results: Vec<H>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
