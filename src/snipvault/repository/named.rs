//! Categories and tags share one set of rules: names are unique ignoring
//! case, lookups by name ignore case, and deleting one leaves the snippets
//! that reference it untouched.

use crate::error::{Result, SnipError};
use crate::model::validation::require_text;
use crate::model::{Category, Named, Tag};
use crate::store::{Store, Stored};
use std::collections::HashMap;
use std::marker::PhantomData;

pub type CategoryRepository<'a> = NamedRepository<'a, Category>;
pub type TagRepository<'a> = NamedRepository<'a, Tag>;

/// Operations on a kind addressed by name.
#[derive(Debug)]
pub struct NamedRepository<'a, T> {
    store: &'a Store,
    kind: PhantomData<fn() -> T>,
}

impl<T> Clone for NamedRepository<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NamedRepository<'_, T> {}

impl<'a, T: Stored + Named> NamedRepository<'a, T> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            kind: PhantomData,
        }
    }

    pub fn list(&self) -> Vec<T> {
        self.store.list()
    }

    pub fn find_by_id(&self, id: i64) -> Result<T> {
        self.store.find_by_id(id)
    }

    /// Lowest-ID entity whose name matches, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Result<T> {
        self.store
            .scan(|e: &T| same_name(e.name(), name))
            .into_iter()
            .next()
            .ok_or_else(|| SnipError::NameNotFound {
                kind: T::KIND,
                name: name.to_string(),
            })
    }

    /// `DuplicateName` if the name is taken; no ID is spent in that case.
    pub fn create(&self, entity: T) -> Result<T> {
        self.store
            .create_checked(entity, |table, e| ensure_unique(table, e, false))
    }

    /// Keeping its own name is fine; taking another entity's is not.
    pub fn update(&self, entity: T) -> Result<T> {
        self.store
            .update_checked(entity, |table, e| ensure_unique(table, e, true))
    }

    pub fn rename(&self, id: i64, name: &str) -> Result<T> {
        require_text("name", name)?;
        let mut entity = self.find_by_id(id)?;
        entity.set_name(name.to_string());
        self.update(entity)
    }

    pub fn delete(&self, id: i64) -> Result<T> {
        self.store.delete(id)
    }

    /// Returns the entity with this name, creating it first if none exists.
    pub fn ensure(&self, name: &str) -> Result<T> {
        match self.find_by_name(name) {
            Ok(found) => Ok(found),
            Err(e) if e.is_not_found() => match self.create(T::from_name(name)?) {
                // Lost a race with another creator of the same name.
                Err(e) if e.is_duplicate_name() => self.find_by_name(name),
                other => other,
            },
            Err(e) => Err(e),
        }
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Fails with `DuplicateName` if any entity other than `candidate` itself
/// already carries its name.
fn ensure_unique<T: Stored + Named>(
    table: &HashMap<i64, T>,
    candidate: &T,
    exclude_self: bool,
) -> Result<()> {
    let clash = table.values().any(|existing| {
        !(exclude_self && existing.id() == candidate.id())
            && same_name(existing.name(), candidate.name())
    });
    if clash {
        return Err(SnipError::DuplicateName {
            kind: T::KIND,
            name: candidate.name().to_string(),
        });
    }
    Ok(())
}
