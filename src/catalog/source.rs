//! Catalog Backend Client
//!
//! Talks to the service that owns the course data:
//! - `GET {base}/terms` lists the terms it has courses for.
//! - `GET {base}/courses?year=<year>&semester=<semester>` lists the courses of one term.
//!
//! Transient network errors are retried a few times with doubling delay and jitter.

use super::types::{CourseRecord, RawTerm};
use crate::term::Term;

use anyhow::{Context, Result};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_ATTEMPTS: usize = 3;

pub struct CatalogClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn terms_url(&self) -> String {
        format!("{}/terms", self.base_url)
    }

    pub fn courses_url(&self, term: Term) -> String {
        format!(
            "{}/courses?year={}&semester={}",
            self.base_url,
            term.year(),
            term.semester()
        )
    }

    pub async fn fetch_terms(&self) -> Result<Vec<RawTerm>> {
        let url = self.terms_url();
        let response = self.get_with_retry(&url).await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("GET {} failed: {}", url, response.status()));
        }

        response
            .json()
            .await
            .with_context(|| format!("decoding term list from {}", url))
    }

    pub async fn fetch_courses(&self, term: Term) -> Result<Vec<CourseRecord>> {
        let url = self.courses_url(term);
        let response = self.get_with_retry(&url).await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("GET {} failed: {}", url, response.status()));
        }

        let courses: Vec<CourseRecord> = response
            .json()
            .await
            .with_context(|| format!("decoding courses for {} from {}", term, url))?;

        tracing::debug!("Loaded {} course(s) for {}", courses.len(), term);
        Ok(courses)
    }

    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut delay_ms = 150u64;

        for attempt in 0..REQUEST_ATTEMPTS {
            let response = self
                .http_client
                .get(url)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await;

            match response {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == REQUEST_ATTEMPTS {
                        return Err(anyhow::anyhow!(e).context(format!("GET {}", url)));
                    }
                    tracing::debug!("GET {} failed (attempt {}): {}", url, attempt + 1, e);
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(1200);
                }
            }
        }

        Err(anyhow::anyhow!("Retry attempts exhausted"))
    }
}
