//! Course Catalog Engine
//!
//! The `IndexEngine` the service runs with in production.
//!
//! ## Workflow
//! 1. **Discover**: Ask the catalog backend which terms it has courses for.
//! 2. **Load**: Download the course records of one term.
//! 3. **Build**: Tokenize every course (code, subject, title, description) into an
//!    inverted index.
//! 4. **Search**: Score courses by the share of query tokens they contain.
//!
//! ## Submodules
//! - **`source`**: HTTP client for the catalog backend, with retry and jitter.
//! - **`tokenizer`**: Text normalization shared by indexing and querying.
//! - **`index`**: `CatalogIndex`, the inverted index and its scoring.
//! - **`engine`**: `CatalogEngine`, gluing the above into an `IndexEngine`.
//! - **`types`**: Course records and search hits.

pub mod engine;
pub mod index;
pub mod source;
pub mod tokenizer;
pub mod types;

pub use engine::CatalogEngine;
