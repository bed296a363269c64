//! In-memory translation catalog.
//!
//! A [`Catalog`] accumulates the translatable strings found by one or more
//! extraction runs. Entries are unique by `(context, singular)` and keep
//! their insertion order; inserting a key that already exists merges into
//! the existing entry instead of duplicating it.

use std::collections::HashMap;

pub mod pot;

/// A source location where an entry's text was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// File path relative to the scan's logical root.
    pub path: String,
    /// Line number of the marker call, when known.
    pub line: Option<u32>,
}

impl Reference {
    pub fn new(path: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

/// One distinct translatable string identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Translation context, disambiguating identical singular texts.
    pub context: Option<String>,
    pub singular: String,
    pub plural: Option<String>,
    /// Every source location the text was found at, in insertion order.
    pub references: Vec<Reference>,
    /// Comments extracted from the source for translators.
    pub comments: Vec<String>,
}

impl Entry {
    pub fn new(context: Option<&str>, singular: impl Into<String>) -> Self {
        Self {
            context: context.map(str::to_owned),
            singular: singular.into(),
            plural: None,
            references: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn add_reference(&mut self, path: impl Into<String>, line: Option<u32>) {
        self.references.push(Reference::new(path, line));
    }

    /// Merges another entry with the same identity into this one.
    ///
    /// References are appended without deduplication, the plural form is
    /// taken when this entry has none, and comments are appended unless
    /// already present.
    pub fn merge_from(&mut self, other: Entry) {
        if self.plural.is_none() {
            self.plural = other.plural;
        }
        self.references.extend(other.references);
        for comment in other.comments {
            if !self.comments.contains(&comment) {
                self.comments.push(comment);
            }
        }
    }
}

type EntryKey = (Option<String>, String);

/// Ordered collection of entries, unique by `(context, singular)`.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    entries: Vec<Entry>,
    index: HashMap<EntryKey, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn find(&self, context: Option<&str>, singular: &str) -> Option<&Entry> {
        let key = (context.map(str::to_owned), singular.to_owned());
        self.index.get(&key).map(|&i| &self.entries[i])
    }

    /// Returns the entry for `(context, singular)`, appending a new empty
    /// one when the key is not present yet.
    pub fn insert(&mut self, context: Option<&str>, singular: &str) -> &mut Entry {
        let key = (context.map(str::to_owned), singular.to_owned());
        if let Some(&i) = self.index.get(&key) {
            return &mut self.entries[i];
        }
        self.entries.push(Entry::new(context, singular));
        let i = self.entries.len() - 1;
        self.index.insert(key, i);
        &mut self.entries[i]
    }

    /// Adds a whole entry, merging it into an existing entry with the same
    /// identity if one is present.
    pub fn push(&mut self, entry: Entry) {
        let key = (entry.context.clone(), entry.singular.clone());
        if let Some(&i) = self.index.get(&key) {
            self.entries[i].merge_from(entry);
        } else {
            self.entries.push(entry);
            self.index.insert(key, self.entries.len() - 1);
        }
    }

    /// Merges every entry of `other` into this catalog, preserving
    /// `other`'s extraction order for entries not seen before.
    pub fn merge_from(&mut self, other: Catalog) {
        for entry in other.entries {
            self.push(entry);
        }
    }

    /// Rewrites every reference path to start with `prefix` followed by a
    /// slash. An empty prefix leaves all references untouched.
    pub fn prefix_references(&mut self, prefix: &str) {
        if prefix.is_empty() {
            return;
        }
        for entry in &mut self.entries {
            for reference in &mut entry.references {
                reference.path = format!("{prefix}/{}", reference.path);
            }
        }
    }

    /// Total number of references across all entries.
    pub fn reference_count(&self) -> usize {
        self.entries.iter().map(|e| e.references.len()).sum()
    }
}
