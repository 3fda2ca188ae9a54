use crate::term::Term;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Set of subject codes an index (or a search) is restricted to.
pub type SubjectFilter = BTreeSet<String>;

/// Turns a raw list of subjects from a request into a filter.
///
/// Entries are trimmed and deduplicated. An absent or effectively empty list
/// means "no restriction".
pub fn normalize_subjects(raw: Option<Vec<String>>) -> Option<SubjectFilter> {
    let filter: SubjectFilter = raw?
        .into_iter()
        .map(|subject| subject.trim().to_string())
        .filter(|subject| !subject.is_empty())
        .collect();

    if filter.is_empty() {
        None
    } else {
        Some(filter)
    }
}

/// A built index for one term, plus the metadata it was built with.
///
/// Never mutated after construction. A rebuild creates a new entry which replaces
/// this one in the `IndexStore`; holders of the old `Arc` keep a consistent view.
#[derive(Debug)]
pub struct IndexEntry<I> {
    term: Term,
    allowed_subjects: Option<SubjectFilter>,
    last_refreshed: DateTime<Utc>,
    index: I,
}

impl<I> IndexEntry<I> {
    pub(crate) fn new(
        term: Term,
        allowed_subjects: Option<SubjectFilter>,
        last_refreshed: DateTime<Utc>,
        index: I,
    ) -> Self {
        Self {
            term,
            allowed_subjects,
            last_refreshed,
            index,
        }
    }

    pub fn term(&self) -> Term {
        self.term
    }

    pub fn allowed_subjects(&self) -> Option<&SubjectFilter> {
        self.allowed_subjects.as_ref()
    }

    pub fn last_refreshed(&self) -> DateTime<Utc> {
        self.last_refreshed
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn describe(&self) -> IndexDescriptor {
        IndexDescriptor {
            term: self.term,
            allowed_subjects: self.allowed_subjects.clone(),
            last_refreshed: self.last_refreshed,
        }
    }
}

/// Read-only summary of an `IndexEntry`, reported by `/health`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexDescriptor {
    pub term: Term,
    pub allowed_subjects: Option<SubjectFilter>,
    pub last_refreshed: DateTime<Utc>,
}
