//! # Repository Facade
//!
//! The only entry point callers (CLI, TUI, or anything else) use. [`Vault`]
//! owns the [`Store`] and the path of its data file; the per-kind
//! repositories borrow the store from it:
//!
//! ```no_run
//! use snipvault::model::{Category, Snippet};
//! use snipvault::repository::Vault;
//!
//! # fn main() -> snipvault::error::Result<()> {
//! let vault = Vault::open("snippets.json")?;
//! let algorithms = vault.categories().create(Category::new("Algorithms")?)?;
//! vault.snippets().create(
//!     Snippet::new("Quick Sort", "rust", "fn quick_sort() {}")?.with_category(algorithms.id),
//! )?;
//! vault.save()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Rules Added on Top of the Store
//!
//! - Category and tag names are unique ignoring case, on create and on
//!   rename. The check and the write happen under one lock.
//! - Name and language lookups ignore case.
//! - Filters and searches return empty lists, never `NotFound`.
//! - Deleting a category or tag does not cascade; see [`doctor`].
//!
//! ## Persistence
//!
//! Every operation is in-memory. Nothing reaches disk until [`Vault::save`].

pub mod doctor;
pub mod named;
pub mod snippet;

use crate::error::Result;
use crate::store::{LoadOutcome, Store};
use std::path::{Path, PathBuf};

pub use doctor::{DanglingRef, DoctorReport};
pub use named::{CategoryRepository, NamedRepository, TagRepository};
pub use snippet::SnippetRepository;

/// Top-level handle: owns the store and knows where it is saved.
#[derive(Debug)]
pub struct Vault {
    store: Store,
    path: PathBuf,
    pretty_json: bool,
}

impl Vault {
    /// An empty vault bound to `path`. Nothing is read.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: Store::new(),
            path: path.into(),
            pretty_json: true,
        }
    }

    /// A vault bound to `path`, loaded from it if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let vault = Self::new(path);
        vault.load()?;
        Ok(vault)
    }

    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn snippets(&self) -> SnippetRepository<'_> {
        SnippetRepository::new(&self.store)
    }

    pub fn categories(&self) -> CategoryRepository<'_> {
        CategoryRepository::new(&self.store)
    }

    pub fn tags(&self) -> TagRepository<'_> {
        TagRepository::new(&self.store)
    }

    pub fn save(&self) -> Result<()> {
        self.store.save_to(&self.path, self.pretty_json)
    }

    pub fn load(&self) -> Result<LoadOutcome> {
        self.store.load_from(&self.path)
    }

    pub fn doctor(&self) -> DoctorReport {
        doctor::run(&self.store)
    }
}
