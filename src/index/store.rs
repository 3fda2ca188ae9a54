//! Index Store
//!
//! In-memory map from `Term` to the latest built `IndexEntry`. Backed by a
//! `DashMap`, so a lookup for one term never waits on a write to another.

use super::types::{IndexDescriptor, IndexEntry, SubjectFilter};
use crate::term::Term;

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

pub struct IndexStore<I> {
    entries: DashMap<Term, Arc<IndexEntry<I>>>,
}

impl<I> IndexStore<I> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Returns the current entry for `term`, if one has been built.
    pub fn get(&self, term: &Term) -> Option<Arc<IndexEntry<I>>> {
        self.entries.get(term).map(|entry| entry.value().clone())
    }

    /// Installs a freshly built index for `term`, replacing any previous entry.
    pub fn put(
        &self,
        term: Term,
        allowed_subjects: Option<SubjectFilter>,
        index: I,
    ) -> Arc<IndexEntry<I>> {
        self.put_at(term, allowed_subjects, index, Utc::now())
    }

    /// Same as `put` with an explicit clock reading.
    ///
    /// `last_refreshed` of a replacement is always strictly later than the entry it
    /// replaces; if the clock has not advanced the stamp is bumped by 1µs.
    pub(crate) fn put_at(
        &self,
        term: Term,
        allowed_subjects: Option<SubjectFilter>,
        index: I,
        now: DateTime<Utc>,
    ) -> Arc<IndexEntry<I>> {
        match self.entries.entry(term) {
            Entry::Occupied(mut occupied) => {
                let previous = occupied.get().last_refreshed();
                let stamp = if now > previous {
                    now
                } else {
                    previous + Duration::microseconds(1)
                };
                let entry = Arc::new(IndexEntry::new(term, allowed_subjects, stamp, index));
                occupied.insert(entry.clone());
                entry
            }
            Entry::Vacant(vacant) => {
                let entry = Arc::new(IndexEntry::new(term, allowed_subjects, now, index));
                vacant.insert(entry.clone());
                entry
            }
        }
    }

    /// Snapshot of every entry's metadata, ordered by term.
    pub fn describe_all(&self) -> Vec<IndexDescriptor> {
        let mut descriptors: Vec<IndexDescriptor> = self
            .entries
            .iter()
            .map(|entry| entry.value().describe())
            .collect();
        descriptors.sort_by(|a, b| a.term.cmp(&b.term));
        descriptors
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<I> Default for IndexStore<I> {
    fn default() -> Self {
        Self::new()
    }
}
