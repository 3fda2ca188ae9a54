use serde::{Deserialize, Serialize};

/// A course as served by the catalog backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseRecord {
    pub code: String,
    pub title: String,
    pub subject: String,
    #[serde(default)]
    pub description: String,
}

/// Term as listed by the catalog backend, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTerm {
    pub year: i32,
    pub semester: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseHit {
    pub code: String,
    pub title: String,
    pub subject: String,
    /// Fraction of the distinct query tokens found in the course, in `[0, 1]`.
    pub score: f32,
}
