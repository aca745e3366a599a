//! # Snipvault Architecture
//!
//! Snipvault is the **storage-and-search engine** of a personal code-snippet
//! manager. It holds three related collections (snippets, categories, tags)
//! in memory, hands out durable numeric IDs, persists everything to a single
//! JSON file and answers full-text and attribute lookups. Argument parsing,
//! rendering and terminal UIs live in the applications built on top of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository Facade (repository/)                            │
//! │  - Vault: owns the store and the data file path             │
//! │  - One repository per kind: CRUD, filters, search           │
//! │  - Case-insensitive name uniqueness for categories and tags │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Entity Store (store/)                                      │
//! │  - Identity-keyed tables behind one RwLock                  │
//! │  - ID counters behind their own Mutex                       │
//! │  - Inverted index kept in step with snippet mutations       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Persistence (store/persist.rs)                             │
//! │  - Snapshot under lock, write temp file, rename into place  │
//! │  - Load rebuilds the index; missing file means first run    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Invariants
//!
//! - Once an ID has been issued for a kind, no later entity of that kind gets
//!   it, across deletes and restarts.
//! - The index always reflects the current snippet contents.
//! - A failed save leaves the previous file intact; a failed load leaves the
//!   in-memory state intact.
//!
//! ## Error Handling
//!
//! Everything fallible returns [`error::Result`]. Errors are returned, never
//! logged and swallowed; deciding whether one is fatal is the caller's job.
//!
//! ## Module Overview
//!
//! - [`repository`]: The facade and the [`repository::Vault`] handle
//! - [`store`]: In-memory tables, ID allocation and persistence
//! - [`index`]: Term normalization and the inverted index
//! - [`model`]: `Snippet`, `Category`, `Tag` and their validation
//! - [`config`]: Per-directory configuration (`config.json`)
//! - [`init`]: Locating and opening the default vault
//! - [`logging`]: Optional `tracing` subscriber setup
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod index;
pub mod init;
pub mod logging;
pub mod model;
pub mod repository;
pub mod store;

pub use error::{EntityKind, Result, SnipError};
pub use repository::Vault;
