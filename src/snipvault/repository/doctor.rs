//! Read-only consistency report.
//!
//! Deleting a category or tag never touches the snippets that refer to it,
//! so those references can dangle. The report lists them; fixing them (or
//! not) is left to the caller.

use crate::store::Store;

/// A snippet field pointing at an entity that no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingRef {
    pub snippet_id: i64,
    pub missing_id: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub missing_categories: Vec<DanglingRef>,
    pub missing_tags: Vec<DanglingRef>,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.missing_categories.is_empty() && self.missing_tags.is_empty()
    }
}

pub fn run(store: &Store) -> DoctorReport {
    store.view(|tables| {
        let mut snippets: Vec<_> = tables.snippets().values().collect();
        snippets.sort_by_key(|s| s.id);

        let mut report = DoctorReport::default();
        for snippet in snippets {
            if !snippet.is_uncategorized()
                && !tables.categories().contains_key(&snippet.category_id)
            {
                report.missing_categories.push(DanglingRef {
                    snippet_id: snippet.id,
                    missing_id: snippet.category_id,
                });
            }
            for &tag_id in &snippet.tags {
                if !tables.tags().contains_key(&tag_id) {
                    report.missing_tags.push(DanglingRef {
                        snippet_id: snippet.id,
                        missing_id: tag_id,
                    });
                }
            }
        }
        report
    })
}
