use crate::error::Result;
use crate::model::Snippet;
use crate::store::Store;

/// Snippet operations available to callers.
///
/// Filters and searches return an empty list when nothing matches; only
/// lookups by ID report `NotFound`.
#[derive(Debug, Clone, Copy)]
pub struct SnippetRepository<'a> {
    store: &'a Store,
}

impl<'a> SnippetRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<Snippet> {
        self.store.list()
    }

    pub fn find_by_id(&self, id: i64) -> Result<Snippet> {
        self.store.find_by_id(id)
    }

    /// `0` selects uncategorized snippets.
    pub fn find_by_category(&self, category_id: i64) -> Vec<Snippet> {
        self.store
            .scan(|s: &Snippet| s.category_id == category_id)
    }

    pub fn find_by_tag(&self, tag_id: i64) -> Vec<Snippet> {
        self.store.scan(|s: &Snippet| s.has_tag(tag_id))
    }

    /// Language match ignoring case, like every other name lookup.
    pub fn find_by_language(&self, language: &str) -> Vec<Snippet> {
        let wanted = language.to_lowercase();
        self.store
            .scan(|s: &Snippet| s.language.to_lowercase() == wanted)
    }

    /// Snippets containing any term of `query`, sorted by ID.
    pub fn search(&self, query: &str) -> Vec<Snippet> {
        self.store.search(query)
    }

    pub fn create(&self, snippet: Snippet) -> Result<Snippet> {
        self.store.create(snippet)
    }

    pub fn update(&self, snippet: Snippet) -> Result<Snippet> {
        self.store.update(snippet)
    }

    pub fn delete(&self, id: i64) -> Result<Snippet> {
        self.store.delete(id)
    }
}
