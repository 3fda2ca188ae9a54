//! Academic Term Module
//!
//! Identifies which catalog an index belongs to. Every index in the service is
//! keyed by a `Term`, a validated `(year, semester)` pair.
//!
//! ## Responsibilities
//! - **Normalization**: Semester names are trimmed and compared case-insensitively
//!   (`" fall "`, `"FALL"` and `"Fall"` are the same semester).
//! - **Validation**: Years must fall inside the configured `TermBounds`.
//! - **Resolution**: Search requests may omit the term and fall back to the
//!   configured default term.

pub mod types;

pub use types::{resolve_term, Semester, Term, TermBounds};
