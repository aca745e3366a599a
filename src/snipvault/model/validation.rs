//! Field validation for entity constructors.
//!
//! The store itself never re-validates content; these checks run once, when
//! a value is built, so everything that reaches the store is well formed:
//! - Snippet title, language and code must be non-blank
//! - Category and tag names must be non-blank

/// Checks that a required text field has at least one non-whitespace character.
///
/// # Examples
/// ```
/// use snipvault::model::validation::{require_text, ValidationError};
///
/// assert!(require_text("title", "Quick Sort").is_ok());
/// assert_eq!(
///     require_text("title", "   "),
///     Err(ValidationError::Blank("title"))
/// );
/// ```
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(())
}

/// Error type for entity field validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty or whitespace-only
    Blank(&'static str),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Blank(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}
