//! Index Engine Boundary
//!
//! The orchestrator never looks inside an index. It asks an `IndexEngine` which
//! terms exist, asks it to build an index for one term, and later hands the built
//! index back to it together with a query.

use super::types::SubjectFilter;
use crate::term::Term;

use anyhow::Result;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by engine operations.
pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

pub trait IndexEngine: Send + Sync + 'static {
    /// Opaque, immutable handle to a built index.
    type Index: Send + Sync + 'static;
    /// A single search result as returned to HTTP callers.
    type Hit: Serialize + Send + 'static;

    /// Enumerates the terms an index should be built for at startup.
    fn discover(&self) -> EngineFuture<'_, Vec<Term>>;

    /// Loads the data for `term` and builds a searchable index from it.
    ///
    /// When `allowed_subjects` is set only records of those subjects are indexed.
    fn build<'a>(
        &'a self,
        term: Term,
        allowed_subjects: Option<&'a SubjectFilter>,
    ) -> EngineFuture<'a, Self::Index>;

    /// Runs `query` against a previously built index.
    ///
    /// Results scoring below `threshold` or outside `allowed_subjects` are dropped.
    fn search<'a>(
        &'a self,
        index: &'a Self::Index,
        query: &'a str,
        threshold: f32,
        allowed_subjects: Option<&'a SubjectFilter>,
    ) -> EngineFuture<'a, Vec<Self::Hit>>;
}
