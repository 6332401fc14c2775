// src/tags.rs
//! The vocabulary of tags already in use.
//!
//! Seeded from the database schema, then grown as documents are written.
//! Advisory only: generation may still return unseen tags, and those are
//! accepted. The remote option set grows on its own when a document is
//! updated with a new tag, so nothing is ever written back from here.

use crate::api::DocumentStore;
use crate::error::AppError;
use crate::error_recovery::RetryPolicy;
use indexmap::IndexSet;
use std::sync::Arc;

/// Process-wide, append-only set of known tags.
///
/// Mutated only by the single processing task; a parallel pipeline would
/// need to put this behind a lock.
pub struct TagRegistry {
    store: Arc<dyn DocumentStore>,
    retry: RetryPolicy,
    vocabulary: IndexSet<String>,
}

impl TagRegistry {
    pub fn new(store: Arc<dyn DocumentStore>, retry: RetryPolicy) -> Self {
        Self {
            store,
            retry,
            vocabulary: IndexSet::new(),
        }
    }

    /// Reads the tag property's option set from the schema.
    ///
    /// Options are merged into what is already known, so loading again
    /// never forgets a remembered tag.
    pub async fn load(&mut self) -> Result<&IndexSet<String>, AppError> {
        let store = &self.store;
        let schema = self
            .retry
            .run("load tag vocabulary", || store.get_schema())
            .await?;

        self.vocabulary.extend(schema.tag_options);
        log::info!("Tag vocabulary loaded: {} tag(s)", self.vocabulary.len());
        Ok(&self.vocabulary)
    }

    /// Adds accepted tags; returns how many were new.
    pub fn remember<I, S>(&mut self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.vocabulary.len();
        self.vocabulary.extend(tags.into_iter().map(Into::into));
        let added = self.vocabulary.len() - before;
        if added > 0 {
            log::debug!("Learned {} new tag(s)", added);
        }
        added
    }

    /// Known tags, in the order they were first seen.
    pub fn vocabulary(&self) -> Vec<String> {
        self.vocabulary.iter().cloned().collect()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.vocabulary.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }
}
