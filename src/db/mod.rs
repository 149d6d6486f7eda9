//! In-memory document database with named, lazily-created collections.
//!
//! DESIGN
//! ======
//! A `Database` is an ordered list of named `Collection`s; each collection
//! is an insertion-ordered list of schema-less documents. Queries are
//! predicate scans, which is plenty for a single user's widget library.
//!
//! Every structural or document change bumps a revision counter. The
//! persistence task compares the current revision against the last
//! persisted one to decide whether a flush is needed, so dirtiness never
//! has to be tracked by callers.

pub mod backend;

use serde::{Deserialize, Serialize};

use crate::widget::Document;

// =============================================================================
// COLLECTION
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    name: String,
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(skip)]
    revision: u64,
}

impl Collection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), documents: Vec::new(), revision: 0 }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn find<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a Document>
    where
        P: Fn(&Document) -> bool + 'a,
    {
        self.documents.iter().filter(move |&doc| predicate(doc))
    }

    pub fn find_one<P>(&self, predicate: P) -> Option<&Document>
    where
        P: Fn(&Document) -> bool,
    {
        self.documents.iter().find(|&doc| predicate(doc))
    }

    pub fn insert(&mut self, doc: Document) {
        self.documents.push(doc);
        self.revision += 1;
    }

    /// Apply `mutator` to every matching document in place. Returns the
    /// number of documents touched.
    pub fn update_where<P, M>(&mut self, predicate: P, mut mutator: M) -> usize
    where
        P: Fn(&Document) -> bool,
        M: FnMut(&mut Document),
    {
        let mut touched = 0;
        for doc in self.documents.iter_mut().filter(|doc| predicate(&**doc)) {
            mutator(doc);
            touched += 1;
        }
        if touched > 0 {
            self.revision += 1;
        }
        touched
    }

    /// Remove every matching document. Returns the number removed.
    pub fn remove_where<P>(&mut self, predicate: P) -> usize
    where
        P: Fn(&Document) -> bool,
    {
        let before = self.documents.len();
        self.documents.retain(|doc| !predicate(doc));
        let removed = before - self.documents.len();
        if removed > 0 {
            self.revision += 1;
        }
        removed
    }
}

// =============================================================================
// DATABASE
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    collections: Vec<Collection>,
    #[serde(skip)]
    structure_revision: u64,
}

impl Database {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get_collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }

    pub fn get_collection_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.name == name)
    }

    /// Return the named collection, registering an empty one first if absent.
    pub fn get_or_create_collection(&mut self, name: &str) -> &mut Collection {
        let index = match self.collections.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                tracing::debug!(collection = name, "creating collection");
                self.collections.push(Collection::new(name));
                self.structure_revision += 1;
                self.collections.len() - 1
            }
        };
        &mut self.collections[index]
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(Collection::name)
    }

    /// Monotonic change counter across the whole database.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.structure_revision + self.collections.iter().map(|c| c.revision).sum::<u64>()
    }

    /// Total documents across all collections.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.collections.iter().map(Collection::len).sum()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
