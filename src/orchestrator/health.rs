//! Health Status Derivation
//!
//! `/health` reports a single status word derived from the build state. The
//! derivation is a pure function over a `BuildSnapshot`.

use crate::builder::{BuildSnapshot, QueueStatus};
use crate::index::IndexDescriptor;

use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Waiting,
    Queued,
    Building,
    Ok,
    Error,
}

/// Picks the status by priority, first match wins:
/// building, queued, ok, error, waiting.
pub fn derive_status(snapshot: &BuildSnapshot, has_indexes: bool) -> HealthStatus {
    if snapshot.building {
        HealthStatus::Building
    } else if !snapshot.queue.is_empty() {
        HealthStatus::Queued
    } else if has_indexes {
        HealthStatus::Ok
    } else if snapshot.last_error.is_some() {
        HealthStatus::Error
    } else {
        HealthStatus::Waiting
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub building: bool,
    /// Seconds, rounded to one decimal place.
    pub build_duration_seconds: Option<f64>,
    pub queue: QueueStatus,
    pub last_error: Option<String>,
    pub indexes: Vec<IndexDescriptor>,
}

impl HealthReport {
    pub fn from_snapshot(snapshot: BuildSnapshot, indexes: Vec<IndexDescriptor>) -> Self {
        let status = derive_status(&snapshot, !indexes.is_empty());

        Self {
            status,
            building: snapshot.building,
            build_duration_seconds: duration_seconds(snapshot.build_duration),
            queue: snapshot.queue,
            last_error: snapshot.last_error,
            indexes,
        }
    }
}

/// Seconds rounded to tenths. A zero-length (or absent) build reports `None`.
pub(crate) fn duration_seconds(duration: Option<Duration>) -> Option<f64> {
    duration
        .filter(|duration| !duration.is_zero())
        .map(|duration| round_tenths(duration.as_secs_f64()))
}

fn round_tenths(seconds: f64) -> f64 {
    (seconds * 10.0).round() / 10.0
}
