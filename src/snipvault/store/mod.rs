//! # Storage Layer
//!
//! [`Store`] is the single in-memory aggregate holding every snippet,
//! category and tag, the inverted index over snippets, and the three ID
//! counters. Repositories borrow it; nothing holds it globally.
//!
//! ## Locking
//!
//! Two locks guard the state:
//!
//! - `tables`: an `RwLock` over the three collections and the index. Index
//!   and snippet data always change under the same write guard, so a reader
//!   never sees one without the other.
//! - `ids`: a `Mutex` over [`IdCounters`], held only for the counter bump.
//!
//! `create` takes its ID from `ids` before it asks for the tables write
//! guard, so issuing an ID never waits on a reader walking the collections.
//! When both locks are held at once the order is always `tables`, then `ids`.
//! `save` snapshots under both. An ID is always issued before its entity is
//! inserted, so outside a concurrent load every ID in a snapshot sits below
//! that snapshot's counter.
//! The counter may run ahead of the contents while a create is in flight.
//!
//! A poisoned lock is recovered rather than propagated: every mutation leaves
//! the tables consistent before it can panic.
//!
//! ## Copies
//!
//! Every read returns owned clones. Mutating a returned value has no effect
//! until it is passed back through [`Store::update`].
//!
//! ## Persistence
//!
//! See [`persist`] for the file format and the atomic save/load cycle.

use crate::error::{EntityKind, Result, SnipError};
use crate::index::InvertedIndex;
use crate::model::{Category, Entity, Snippet, Tag};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub mod ids;
pub mod persist;

pub use ids::IdCounters;
pub use persist::{LoadOutcome, StoreFile};

/// The identity-keyed collections plus the index derived from snippets.
#[derive(Debug, Default)]
pub struct Tables {
    snippets: HashMap<i64, Snippet>,
    categories: HashMap<i64, Category>,
    tags: HashMap<i64, Tag>,
    index: InvertedIndex,
}

impl Tables {
    pub fn snippets(&self) -> &HashMap<i64, Snippet> {
        &self.snippets
    }

    pub fn categories(&self) -> &HashMap<i64, Category> {
        &self.categories
    }

    pub fn tags(&self) -> &HashMap<i64, Tag> {
        &self.tags
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }
}

/// A record kind the store knows how to hold.
///
/// The hooks run under the tables write guard, right after the entity is
/// inserted into or removed from its table.
pub trait Stored: Entity + Send + Sync {
    const KIND: EntityKind;

    fn table(tables: &Tables) -> &HashMap<i64, Self>;

    fn table_mut(tables: &mut Tables) -> &mut HashMap<i64, Self>;

    fn after_insert(_tables: &mut Tables, _entity: &Self) {}

    fn after_remove(_tables: &mut Tables, _id: i64) {}
}

impl Stored for Snippet {
    const KIND: EntityKind = EntityKind::Snippet;

    fn table(tables: &Tables) -> &HashMap<i64, Self> {
        &tables.snippets
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<i64, Self> {
        &mut tables.snippets
    }

    fn after_insert(tables: &mut Tables, entity: &Self) {
        tables.index.index_snippet(entity);
    }

    fn after_remove(tables: &mut Tables, id: i64) {
        tables.index.remove_from_index(id);
    }
}

impl Stored for Category {
    const KIND: EntityKind = EntityKind::Category;

    fn table(tables: &Tables) -> &HashMap<i64, Self> {
        &tables.categories
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<i64, Self> {
        &mut tables.categories
    }
}

impl Stored for Tag {
    const KIND: EntityKind = EntityKind::Tag;

    fn table(tables: &Tables) -> &HashMap<i64, Self> {
        &tables.tags
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<i64, Self> {
        &mut tables.tags
    }
}

#[derive(Debug, Default)]
pub struct Store {
    tables: RwLock<Tables>,
    ids: Mutex<IdCounters>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_tables(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tables(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_ids(&self) -> MutexGuard<'_, IdCounters> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue<T: Stored>(&self) -> Result<i64> {
        self.lock_ids().issue(T::KIND)
    }

    /// Assigns the next unused ID for `T`'s kind and inserts the entity.
    ///
    /// Whatever ID the entity carried is overwritten. Fails only when the
    /// kind's counter is exhausted.
    pub fn create<T: Stored>(&self, entity: T) -> Result<T> {
        let id = self.issue::<T>()?;
        let mut tables = self.write_tables();
        self.insert_new(&mut tables, entity, id)
    }

    /// Like [`Store::create`], but `check` must pass against the current
    /// table first.
    ///
    /// `check` runs under a read guard before an ID is issued, so an entity
    /// it rejects consumes no ID. It runs again under the write guard before
    /// the insert. A create that loses that second check to a concurrent
    /// insert has already spent its ID.
    pub fn create_checked<T, F>(&self, entity: T, check: F) -> Result<T>
    where
        T: Stored,
        F: Fn(&HashMap<i64, T>, &T) -> Result<()>,
    {
        check(T::table(&self.read_tables()), &entity)?;
        let id = self.issue::<T>()?;

        let mut tables = self.write_tables();
        check(T::table(&tables), &entity)?;
        self.insert_new(&mut tables, entity, id)
    }

    fn insert_new<T: Stored>(&self, tables: &mut Tables, mut entity: T, id: i64) -> Result<T> {
        let mut id = id;
        while T::table(tables).contains_key(&id) {
            // Only reachable when a loaded counter lagged behind stored data.
            tracing::warn!(kind = %T::KIND, id, "skipping ID already in use");
            id = self.issue::<T>()?;
        }

        entity.set_id(id);
        T::table_mut(tables).insert(id, entity.clone());
        T::after_insert(tables, &entity);

        tracing::debug!(kind = %T::KIND, id, "created entity");
        Ok(entity)
    }

    pub fn find_by_id<T: Stored>(&self, id: i64) -> Result<T> {
        let tables = self.read_tables();
        T::table(&tables)
            .get(&id)
            .cloned()
            .ok_or(SnipError::NotFound { kind: T::KIND, id })
    }

    /// Replaces the stored value at `entity.id()` and refreshes `updated_at`.
    ///
    /// Never creates: an absent ID is `NotFound`.
    pub fn update<T: Stored>(&self, entity: T) -> Result<T> {
        self.update_checked(entity, |_, _| Ok(()))
    }

    /// Like [`Store::update`], but runs `check` against the current table
    /// first, under the same write guard.
    pub fn update_checked<T, F>(&self, mut entity: T, check: F) -> Result<T>
    where
        T: Stored,
        F: FnOnce(&HashMap<i64, T>, &T) -> Result<()>,
    {
        let id = entity.id();
        let mut tables = self.write_tables();
        if !T::table(&tables).contains_key(&id) {
            return Err(SnipError::NotFound { kind: T::KIND, id });
        }
        check(T::table(&tables), &entity)?;

        entity.touch();
        T::after_remove(&mut tables, id);
        T::table_mut(&mut tables).insert(id, entity.clone());
        T::after_insert(&mut tables, &entity);

        tracing::debug!(kind = %T::KIND, id, "updated entity");
        Ok(entity)
    }

    /// Removes and returns the entity. Its ID is never issued again.
    pub fn delete<T: Stored>(&self, id: i64) -> Result<T> {
        let mut tables = self.write_tables();
        let removed = T::table_mut(&mut tables)
            .remove(&id)
            .ok_or(SnipError::NotFound { kind: T::KIND, id })?;
        T::after_remove(&mut tables, id);

        tracing::debug!(kind = %T::KIND, id, "deleted entity");
        Ok(removed)
    }

    /// Every entity of kind `T`, sorted by ID.
    pub fn list<T: Stored>(&self) -> Vec<T> {
        self.scan(|_: &T| true)
    }

    /// Entities of kind `T` matching `predicate`, sorted by ID.
    pub fn scan<T, P>(&self, mut predicate: P) -> Vec<T>
    where
        T: Stored,
        P: FnMut(&T) -> bool,
    {
        let tables = self.read_tables();
        let mut found: Vec<T> = T::table(&tables)
            .values()
            .filter(|e| predicate(e))
            .cloned()
            .collect();
        found.sort_by_key(|e| e.id());
        found
    }

    pub fn count<T: Stored>(&self) -> usize {
        T::table(&self.read_tables()).len()
    }

    /// Snippet IDs matching any term of `query`; order carries no meaning.
    pub fn search_ids(&self, query: &str) -> Vec<i64> {
        self.read_tables().index.search(query)
    }

    /// Snippets matching any term of `query`, sorted by ID.
    pub fn search(&self, query: &str) -> Vec<Snippet> {
        let tables = self.read_tables();
        let mut found: Vec<Snippet> = tables
            .index
            .search(query)
            .into_iter()
            .filter_map(|id| tables.snippets.get(&id).cloned())
            .collect();
        found.sort_by_key(|s| s.id);
        found
    }

    /// Runs `f` against a consistent view of all three collections.
    pub fn view<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        f(&self.read_tables())
    }

    /// Current counter values.
    pub fn next_ids(&self) -> IdCounters {
        *self.lock_ids()
    }
}
