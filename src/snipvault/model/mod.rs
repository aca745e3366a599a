//! Core record types: [`Snippet`], [`Category`] and [`Tag`].
//!
//! Every record carries a numeric identity (`0` until the store assigns one)
//! and created/updated timestamps. Identity is assigned exclusively by
//! [`Store::create`](crate::store::Store::create); constructors never set it.
//!
//! A snippet refers to its category and tags by ID. `category_id == 0` means
//! uncategorized, which is a permanent, valid state. References are not
//! checked against the other collections, so they may dangle after a
//! category or tag is deleted (see [`Vault::doctor`](crate::repository::Vault::doctor)).

pub mod validation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

use validation::{require_text, ValidationError};

/// Identity contract shared by every stored record.
pub trait Entity: Clone {
    fn id(&self) -> i64;

    /// Only the store calls this, when it assigns a fresh ID.
    fn set_id(&mut self, id: i64);

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    /// Refresh `updated_at` to now.
    fn touch(&mut self);
}

/// Records addressed by a human-readable name (categories and tags).
pub trait Named: Entity {
    /// A fresh, unassigned record carrying `name`.
    fn from_name(name: &str) -> Result<Self, ValidationError>;

    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);
}

/// Treats an explicit JSON `null` the same as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub language: String,
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub category_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: BTreeSet<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Snippet {
    pub fn new(
        title: impl Into<String>,
        language: impl Into<String>,
        code: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        let language = language.into();
        let code = code.into();
        require_text("title", &title)?;
        require_text("language", &language)?;
        require_text("code", &code)?;

        let now = Utc::now();
        Ok(Self {
            id: 0,
            title,
            language,
            code,
            description: String::new(),
            category_id: 0,
            tags: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn with_tags<I: IntoIterator<Item = i64>>(mut self, tags: I) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Returns true if the tag was not already present.
    pub fn add_tag(&mut self, tag_id: i64) -> bool {
        self.tags.insert(tag_id)
    }

    /// Returns true if the tag was present.
    pub fn remove_tag(&mut self, tag_id: i64) -> bool {
        self.tags.remove(&tag_id)
    }

    pub fn has_tag(&self, tag_id: i64) -> bool {
        self.tags.contains(&tag_id)
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category_id == 0
    }

    /// Title, description, code and language joined by single spaces.
    ///
    /// An empty description still contributes its separator; normalization
    /// collapses it away.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title, self.description, self.code, self.language
        )
    }
}

impl Entity for Snippet {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        require_text("name", &name)?;
        let now = Utc::now();
        Ok(Self {
            id: 0,
            name,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        require_text("name", &name)?;
        let now = Utc::now();
        Ok(Self {
            id: 0,
            name,
            created_at: now,
            updated_at: now,
        })
    }
}

macro_rules! impl_named_entity {
    ($ty:ty) => {
        impl Entity for $ty {
            fn id(&self) -> i64 {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = id;
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }

            fn updated_at(&self) -> DateTime<Utc> {
                self.updated_at
            }

            fn touch(&mut self) {
                self.updated_at = Utc::now();
            }
        }

        impl Named for $ty {
            fn from_name(name: &str) -> Result<Self, ValidationError> {
                Self::new(name)
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn set_name(&mut self, name: String) {
                self.name = name;
            }
        }
    };
}

impl_named_entity!(Category);
impl_named_entity!(Tag);
