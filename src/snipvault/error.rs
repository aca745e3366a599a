use crate::model::validation::ValidationError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The three record kinds held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Snippet,
    Category,
    Tag,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Snippet => write!(f, "Snippet"),
            EntityKind::Category => write!(f, "Category"),
            EntityKind::Tag => write!(f, "Tag"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SnipError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("{kind} not found: '{name}'")]
    NameNotFound { kind: EntityKind, name: String },

    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed data file {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupt data file: {kind} ID {id} {problem}")]
    CorruptRecord {
        kind: EntityKind,
        id: i64,
        problem: &'static str,
    },

    #[error("No {kind} IDs left to issue")]
    IdsExhausted { kind: EntityKind },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid entity: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SnipError {
    /// True for both id and name lookups that found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SnipError::NotFound { .. } | SnipError::NameNotFound { .. }
        )
    }

    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, SnipError::DuplicateName { .. })
    }
}

pub type Result<T> = std::result::Result<T, SnipError>;
