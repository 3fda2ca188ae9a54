use super::index::CatalogIndex;
use super::source::CatalogClient;
use super::types::CourseHit;
use crate::index::{EngineFuture, IndexEngine, SubjectFilter};
use crate::term::{Term, TermBounds};

use anyhow::Context;

pub struct CatalogEngine {
    client: CatalogClient,
    bounds: TermBounds,
}

impl CatalogEngine {
    pub fn new(client: CatalogClient, bounds: TermBounds) -> Self {
        Self { client, bounds }
    }
}

impl IndexEngine for CatalogEngine {
    type Index = CatalogIndex;
    type Hit = CourseHit;

    fn discover(&self) -> EngineFuture<'_, Vec<Term>> {
        Box::pin(async move {
            let raw_terms = self
                .client
                .fetch_terms()
                .await
                .context("discovering catalog terms")?;

            let mut terms = Vec::with_capacity(raw_terms.len());
            for raw in raw_terms {
                match Term::parse(raw.year, &raw.semester, &self.bounds) {
                    Ok(term) => terms.push(term),
                    Err(e) => tracing::warn!("Skipping catalog term {} {}: {}", raw.year, raw.semester, e),
                }
            }
            terms.sort();
            terms.dedup();
            Ok(terms)
        })
    }

    fn build<'a>(
        &'a self,
        term: Term,
        allowed_subjects: Option<&'a SubjectFilter>,
    ) -> EngineFuture<'a, Self::Index> {
        Box::pin(async move {
            let courses = self
                .client
                .fetch_courses(term)
                .await
                .with_context(|| format!("loading courses for {}", term))?;

            let index = CatalogIndex::build(courses, allowed_subjects);
            if index.is_empty() {
                anyhow::bail!("no courses found for {}", term);
            }

            tracing::info!(
                "Indexed {} course(s) / {} token(s) for {}",
                index.len(),
                index.token_count(),
                term
            );
            Ok(index)
        })
    }

    fn search<'a>(
        &'a self,
        index: &'a Self::Index,
        query: &'a str,
        threshold: f32,
        allowed_subjects: Option<&'a SubjectFilter>,
    ) -> EngineFuture<'a, Vec<Self::Hit>> {
        Box::pin(async move { Ok(index.search(query, threshold, allowed_subjects)) })
    }
}
