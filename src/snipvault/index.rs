//! # Inverted Index
//!
//! Maps normalized search terms to the IDs of the snippets whose searchable
//! text (title, description, code, language) contains them.
//!
//! ## Term Normalization
//!
//! [`normalize`] turns free text into terms in five steps:
//!
//! 1. A `.` directly between two digits is dropped (`1.21` → `121`), so
//!    version-like tokens are searchable as one unit.
//! 2. Hyphens are dropped (`Quick-Sort` → `QuickSort`).
//! 3. Every remaining run of non-alphanumeric characters becomes one space.
//! 4. Tokens are lower-cased.
//! 5. Duplicates are removed, keeping first-seen order.
//!
//! Queries go through the same function, so `search("Quick-Sort")` finds a
//! snippet titled "quicksort".
//!
//! ## Maintenance
//!
//! The index cannot diff old and new content, so an update is always a full
//! [`InvertedIndex::remove_from_index`] followed by
//! [`InvertedIndex::index_snippet`]. Posting lists that become empty are
//! removed. The index is never persisted; it is rebuilt on every load.

use crate::model::Snippet;
use std::collections::{HashMap, HashSet};

/// Splits text into normalized, deduplicated search terms.
pub fn normalize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut cleaned = String::with_capacity(text.len());

    for (i, &ch) in chars.iter().enumerate() {
        match ch {
            '.' if is_digit_at(&chars, i.checked_sub(1)) && is_digit_at(&chars, Some(i + 1)) => {}
            '-' => {}
            c if c.is_alphanumeric() => cleaned.push(c),
            _ => cleaned.push(' '),
        }
    }

    let mut seen = HashSet::new();
    cleaned
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

fn is_digit_at(chars: &[char], idx: Option<usize>) -> bool {
    idx.and_then(|i| chars.get(i))
        .is_some_and(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<i64>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the snippet's ID to the posting list of every term it contains.
    ///
    /// Idempotent: indexing the same snippet twice leaves a single posting.
    pub fn index_snippet(&mut self, snippet: &Snippet) {
        let id = snippet.id;
        for term in normalize(&snippet.searchable_text()) {
            let posting = self.postings.entry(term).or_default();
            if !posting.contains(&id) {
                posting.push(id);
            }
        }
    }

    /// Removes `id` from every posting list, dropping lists left empty.
    pub fn remove_from_index(&mut self, id: i64) {
        self.postings.retain(|_, posting| {
            posting.retain(|&p| p != id);
            !posting.is_empty()
        });
    }

    /// OR search: IDs matching any query term, each once.
    ///
    /// A query with no terms yields an empty result. Order follows query
    /// terms, then posting order; it carries no relevance meaning.
    pub fn search(&self, query: &str) -> Vec<i64> {
        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for term in normalize(query) {
            if let Some(posting) = self.postings.get(&term) {
                for &id in posting {
                    if seen.insert(id) {
                        results.push(id);
                    }
                }
            }
        }
        results
    }

    /// Discards every posting and re-indexes the given snippets.
    pub fn rebuild<'a, I>(&mut self, snippets: I)
    where
        I: IntoIterator<Item = &'a Snippet>,
    {
        self.postings.clear();
        for snippet in snippets {
            self.index_snippet(snippet);
        }
    }

    pub fn postings(&self, term: &str) -> Option<&[i64]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}
