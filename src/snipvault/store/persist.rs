//! # Persistence
//!
//! The whole store lives in one JSON document:
//!
//! ```text
//! {
//!   "snippets":   [ { "id", "title", "language", "code", "description",
//!                     "category_id", "tags": [..], "created_at", "updated_at" } ],
//!   "categories": [ { "id", "name", "created_at", "updated_at" } ],
//!   "tags":       [ { "id", "name", "created_at", "updated_at" } ],
//!   "next_snippet_id": 1,
//!   "next_category_id": 1,
//!   "next_tag_id": 1
//! }
//! ```
//!
//! Collections are written as arrays sorted by ID. Absent or `null` arrays
//! read back as empty; absent counters read back as 1. The inverted index is
//! not part of the file and is rebuilt from the snippets on every load.
//!
//! ## Save
//!
//! Tables and counters are snapshotted under their locks, then serialized and
//! written with the locks released. The bytes go to a hidden sibling temp
//! file which is renamed over the target, so the target is either the old
//! file or the new one, never a partial write.
//!
//! ## Load
//!
//! - Missing file: not an error, in-memory state is left as it is.
//! - Unreadable file: `Io` error. Unparseable file: `Malformed` error. A
//!   record whose ID is below 1 or repeats another record of its kind:
//!   `CorruptRecord` error. In every case in-memory state is left as it is.
//! - Otherwise everything is replaced at once, under both locks.

use super::{IdCounters, Store, Stored, Tables};
use crate::error::{Result, SnipError};
use crate::index::InvertedIndex;
use crate::model::{null_as_default, Category, Entity, Snippet, Tag};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use uuid::Uuid;

fn first_id() -> i64 {
    1
}

/// On-disk shape of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreFile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub snippets: Vec<Snippet>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(default = "first_id")]
    pub next_snippet_id: i64,
    #[serde(default = "first_id")]
    pub next_category_id: i64,
    #[serde(default = "first_id")]
    pub next_tag_id: i64,
}

impl StoreFile {
    fn counters(&self) -> IdCounters {
        IdCounters {
            next_snippet_id: self.next_snippet_id,
            next_category_id: self.next_category_id,
            next_tag_id: self.next_tag_id,
        }
    }
}

/// What [`Store::load_from`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No file at the path; nothing was changed.
    Missing,
    Loaded {
        snippets: usize,
        categories: usize,
        tags: usize,
    },
}

fn sorted_values<T: Clone>(map: &HashMap<i64, T>) -> Vec<T> {
    let mut entries: Vec<(&i64, &T)> = map.iter().collect();
    entries.sort_by_key(|(id, _)| **id);
    entries.into_iter().map(|(_, v)| v.clone()).collect()
}

fn keyed<T: Stored>(items: Vec<T>) -> Result<HashMap<i64, T>> {
    let mut table = HashMap::with_capacity(items.len());
    for item in items {
        let id = item.id();
        if id < 1 {
            return Err(SnipError::CorruptRecord {
                kind: T::KIND,
                id,
                problem: "is not a positive ID",
            });
        }
        if table.insert(id, item).is_some() {
            return Err(SnipError::CorruptRecord {
                kind: T::KIND,
                id,
                problem: "appears more than once",
            });
        }
    }
    Ok(table)
}

impl Store {
    /// A consistent copy of every collection and counter.
    pub fn snapshot(&self) -> StoreFile {
        let tables = self.read_tables();
        let ids = self.lock_ids();
        StoreFile {
            snippets: sorted_values(&tables.snippets),
            categories: sorted_values(&tables.categories),
            tags: sorted_values(&tables.tags),
            next_snippet_id: ids.next_snippet_id,
            next_category_id: ids.next_category_id,
            next_tag_id: ids.next_tag_id,
        }
    }

    /// Replaces all state with the contents of `file`, rebuilding the index.
    ///
    /// Every record is checked before anything is replaced, so a rejected
    /// file leaves the store as it was.
    pub fn restore(&self, file: StoreFile) -> Result<()> {
        let counters = file.counters();
        let snippets = keyed(file.snippets)?;
        let categories = keyed(file.categories)?;
        let tags = keyed(file.tags)?;
        let mut index = InvertedIndex::new();
        index.rebuild(snippets.values());

        let fresh = Tables {
            snippets,
            categories,
            tags,
            index,
        };

        let mut tables = self.write_tables();
        let mut ids = self.lock_ids();
        *tables = fresh;
        *ids = counters;
        Ok(())
    }

    /// Writes the store to `path` atomically.
    pub fn save_to(&self, path: &Path, pretty: bool) -> Result<()> {
        let snapshot = self.snapshot();
        let content = if pretty {
            serde_json::to_string_pretty(&snapshot)
        } else {
            serde_json::to_string(&snapshot)
        }
        .map_err(SnipError::Serialization)?;

        write_atomic(path, &content)?;

        tracing::debug!(
            path = %path.display(),
            snippets = snapshot.snippets.len(),
            categories = snapshot.categories.len(),
            tags = snapshot.tags.len(),
            size_bytes = content.len(),
            "saved store"
        );
        Ok(())
    }

    /// Replaces the store's state with the file at `path`, if there is one.
    pub fn load_from(&self, path: &Path) -> Result<LoadOutcome> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no data file, starting empty");
                return Ok(LoadOutcome::Missing);
            }
            Err(e) => return Err(SnipError::Io(e)),
        };

        let file: StoreFile =
            serde_json::from_str(&content).map_err(|source| SnipError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let outcome = LoadOutcome::Loaded {
            snippets: file.snippets.len(),
            categories: file.categories.len(),
            tags: file.tags.len(),
        };
        self.restore(file)?;

        tracing::debug!(path = %path.display(), ?outcome, "loaded store");
        Ok(outcome)
    }
}

/// Writes `content` to a hidden sibling temp file, then renames it over `path`.
///
/// The rename is the only step that touches `path`. If anything fails the
/// temp file is removed and the previous file is left as it was.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir).map_err(SnipError::Io)?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SnipError::Config(format!("Not a file path: {}", path.display())))?;
    let tmp_path = dir.join(format!(".{}-{}.tmp", file_name, Uuid::new_v4()));

    let written = fs::write(&tmp_path, content).and_then(|_| fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(SnipError::Io(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityKind;
    use tempfile::TempDir;

    fn populated() -> Store {
        let store = Store::new();
        let cat = store.create(Category::new("Algorithms").unwrap()).unwrap();
        let tag = store.create(Tag::new("sorting").unwrap()).unwrap();
        store.create(
            Snippet::new("Quick Sort", "rust", "fn qs() {}")
                .unwrap()
                .with_description("in-place")
                .with_category(cat.id)
                .with_tags([tag.id]),
        )
        .unwrap();
        store.create(Snippet::new("Merge Sort", "go", "func ms() {}").unwrap()).unwrap();
        store
    }

    fn leftover_tmp_files(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        let store = populated();
        store.delete::<Snippet>(2).unwrap();
        store.save_to(&path, true).unwrap();

        let fresh = Store::new();
        let outcome = fresh.load_from(&path).unwrap();

        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                snippets: 1,
                categories: 1,
                tags: 1
            }
        );
        assert_eq!(fresh.snapshot(), store.snapshot());
        assert_eq!(fresh.next_ids().next_snippet_id, 3);
        assert_eq!(fresh.search_ids("quick"), vec![1]);
    }

    #[test]
    fn test_save_leaves_no_tmp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        populated().save_to(&path, false).unwrap();

        assert!(path.exists());
        assert!(leftover_tmp_files(dir.path()).is_empty());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data").join("snippets.json");
        populated().save_to(&path, true).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_failure_leaves_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        fs::write(&path, "previous").unwrap();

        // A directory squatting on the target makes the rename fail.
        let blocked = dir.path().join("blocked.json");
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("inner"), "x").unwrap();
        assert!(populated().save_to(&blocked, true).is_err());

        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
        assert!(leftover_tmp_files(dir.path()).is_empty());
    }

    #[test]
    fn test_file_uses_wire_field_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        populated().save_to(&path, true).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["next_snippet_id"], 3);
        assert_eq!(value["next_category_id"], 2);
        assert_eq!(value["next_tag_id"], 2);
        let first = &value["snippets"][0];
        for field in [
            "id",
            "title",
            "language",
            "code",
            "description",
            "category_id",
            "tags",
            "created_at",
            "updated_at",
        ] {
            assert!(first.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(value["snippets"][1]["tags"], serde_json::json!([]));
        assert_eq!(value["categories"][0]["name"], "Algorithms");
    }

    #[test]
    fn test_load_missing_file_keeps_state() {
        let dir = TempDir::new().unwrap();
        let store = Store::new();
        let outcome = store.load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(outcome, LoadOutcome::Missing);
        assert_eq!(store.count::<Snippet>(), 0);
        assert_eq!(store.next_ids(), IdCounters::default());
    }

    #[test]
    fn test_load_malformed_file_keeps_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        fs::write(&path, "{ \"snippets\": [ oops").unwrap();

        let store = populated();
        let before = store.snapshot();
        let err = store.load_from(&path).unwrap_err();

        assert!(matches!(err, SnipError::Malformed { .. }));
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.search_ids("quick"), vec![1]);
    }

    #[test]
    fn test_load_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = Store::new();
        let err = store.load_from(dir.path()).unwrap_err();
        assert!(matches!(err, SnipError::Io(_)));
    }

    #[test]
    fn test_load_null_and_absent_collections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        fs::write(&path, r#"{"snippets": null, "next_snippet_id": 4}"#).unwrap();

        let store = Store::new();
        store.load_from(&path).unwrap();
        let snapshot = store.snapshot();
        assert!(snapshot.snippets.is_empty());
        assert!(snapshot.categories.is_empty());
        assert!(snapshot.tags.is_empty());
        assert_eq!(snapshot.next_snippet_id, 4);
        assert_eq!(snapshot.next_category_id, 1);
    }

    #[test]
    fn test_load_keeps_non_positive_counters_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        fs::write(
            &path,
            r#"{"snippets": [], "categories": [], "tags": [],
                "next_snippet_id": 0, "next_category_id": -3, "next_tag_id": 1}"#,
        )
        .unwrap();

        let store = Store::new();
        store.load_from(&path).unwrap();
        assert_eq!(store.next_ids().next_snippet_id, 0);
        assert_eq!(store.next_ids().next_category_id, -3);

        let resaved = dir.path().join("resaved.json");
        store.save_to(&resaved, false).unwrap();
        let again = Store::new();
        again.load_from(&resaved).unwrap();
        assert_eq!(again.next_ids(), store.next_ids());

        assert_eq!(store.create(Category::new("x").unwrap()).unwrap().id(), 1);
    }

    #[test]
    fn test_stale_counter_never_reissues_loaded_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        let store = populated();
        store.save_to(&path, true).unwrap();

        let mut value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        value["next_snippet_id"] = serde_json::json!(1);
        fs::write(&path, value.to_string()).unwrap();

        let reloaded = Store::new();
        reloaded.load_from(&path).unwrap();
        let created = reloaded.create(Snippet::new("Heap Sort", "c", "heap()").unwrap()).unwrap();
        assert_eq!(created.id, 3);
    }

    #[test]
    fn test_counter_at_upper_bound_round_trips_and_refuses_to_wrap() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        fs::write(
            &path,
            r#"{"snippets": [], "next_snippet_id": 9223372036854775807}"#,
        )
        .unwrap();

        let store = Store::new();
        store.load_from(&path).unwrap();
        assert_eq!(store.next_ids().next_snippet_id, i64::MAX);

        let err = store
            .create(Snippet::new("Quick Sort", "rust", "qs()").unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            SnipError::IdsExhausted {
                kind: EntityKind::Snippet
            }
        ));
        assert!(store.create(Snippet::new("again", "rust", "x").unwrap()).is_err());
        assert_eq!(store.count::<Snippet>(), 0);
        assert_eq!(store.next_ids().next_snippet_id, i64::MAX);

        // Other kinds keep counting.
        assert_eq!(store.create(Tag::new("cli").unwrap()).unwrap().id, 1);

        let resaved = dir.path().join("resaved.json");
        store.save_to(&resaved, false).unwrap();
        let again = Store::new();
        again.load_from(&resaved).unwrap();
        assert_eq!(again.next_ids().next_snippet_id, i64::MAX);
    }

    #[test]
    fn test_repeated_id_is_rejected_and_keeps_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        let source = populated();
        source.save_to(&path, true).unwrap();

        let mut value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        value["snippets"][0]["id"] = serde_json::json!(3);
        value["snippets"][1]["id"] = serde_json::json!(3);
        fs::write(&path, value.to_string()).unwrap();

        let store = populated();
        let before = store.snapshot();
        let err = store.load_from(&path).unwrap_err();

        assert!(matches!(
            err,
            SnipError::CorruptRecord {
                kind: EntityKind::Snippet,
                id: 3,
                ..
            }
        ));
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.search_ids("quick"), vec![1]);
    }

    #[test]
    fn test_non_positive_record_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        fs::write(
            &path,
            r#"{"categories": [
                {"id": 0, "name": "Algorithms",
                 "created_at": "2024-03-01T10:00:00Z", "updated_at": "2024-03-01T10:00:00Z"}
            ]}"#,
        )
        .unwrap();

        let store = Store::new();
        let err = store.load_from(&path).unwrap_err();
        assert!(matches!(
            err,
            SnipError::CorruptRecord {
                kind: EntityKind::Category,
                id: 0,
                ..
            }
        ));
        assert_eq!(store.count::<Category>(), 0);
    }
}
