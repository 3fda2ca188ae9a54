use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four canonical academic periods.
///
/// Variants are declared in calendar order so that `Ord` sorts terms of the
/// same year chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Semester {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Semester {
    pub const ALL: [Semester; 4] = [
        Semester::Winter,
        Semester::Spring,
        Semester::Summer,
        Semester::Fall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::Winter => "Winter",
            Semester::Spring => "Spring",
            Semester::Summer => "Summer",
            Semester::Fall => "Fall",
        }
    }
}

impl FromStr for Semester {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Semester::ALL
            .into_iter()
            .find(|semester| semester.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::InvalidSemester {
                given: raw.to_string(),
            })
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range of years a `Term` may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermBounds {
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for TermBounds {
    fn default() -> Self {
        Self {
            min_year: 2000,
            max_year: 2100,
        }
    }
}

impl TermBounds {
    pub fn check(&self, year: i32) -> Result<(), ValidationError> {
        if year < self.min_year || year > self.max_year {
            return Err(ValidationError::YearOutOfRange {
                year,
                min: self.min_year,
                max: self.max_year,
            });
        }
        Ok(())
    }
}

/// A validated `(year, semester)` pair.
///
/// Fields are private: the only way to obtain a `Term` is through one of the
/// validating constructors, so a `Term` in hand is always within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Term {
    year: i32,
    semester: Semester,
}

impl Term {
    pub fn new(year: i32, semester: Semester, bounds: &TermBounds) -> Result<Self, ValidationError> {
        bounds.check(year)?;
        Ok(Self { year, semester })
    }

    /// Validates a raw semester string (trimmed, case-insensitive) together with the year.
    pub fn parse(year: i32, semester: &str, bounds: &TermBounds) -> Result<Self, ValidationError> {
        let semester = semester.parse::<Semester>()?;
        Self::new(year, semester, bounds)
    }

    /// Parses a `"<year> <semester>"` label such as `"2025 Fall"`.
    pub fn parse_label(label: &str, bounds: &TermBounds) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidTermFormat {
            given: label.to_string(),
        };

        let mut parts = label.split_whitespace();
        let (Some(year), Some(semester), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let year = year.parse::<i32>().map_err(|_| invalid())?;

        Self::parse(year, semester, bounds)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn semester(&self) -> Semester {
        self.semester
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.year, self.semester)
    }
}

/// Resolves the term a search request targets.
///
/// An explicit `(year, semester)` pair always wins and is validated. When either
/// half is missing the configured default is used; without a default the request
/// cannot be served.
pub fn resolve_term(
    year: Option<i32>,
    semester: Option<&str>,
    default: Option<&Term>,
    bounds: &TermBounds,
) -> Result<Term, ValidationError> {
    match (year, semester) {
        (Some(year), Some(semester)) if !semester.is_empty() => {
            Term::parse(year, semester, bounds)
        }
        _ => default.copied().ok_or(ValidationError::TermRequired),
    }
}
