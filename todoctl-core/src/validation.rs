//! Name rules for lists and todos
//!
//! Every rule is checked independently; a failing name reports all of
//! its violations in rule order.

use std::fmt;

use crate::model::TodoList;

/// Shortest accepted list or todo name, in characters
pub const MIN_NAME_LEN: usize = 1;

/// Longest accepted list or todo name, in characters
pub const MAX_NAME_LEN: usize = 100;

/// A single broken rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// List name outside the allowed length range
    ListNameLength { min: usize, max: usize },

    /// Another list already uses this name (case-insensitive)
    DuplicateListName,

    /// Todo name outside the allowed length range
    TodoNameLength { min: usize, max: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListNameLength { min, max } => write!(
                f,
                "The list name must be between {} and {} characters long.",
                min, max
            ),
            Self::DuplicateListName => write!(f, "There is already a list by that name."),
            Self::TodoNameLength { min, max } => write!(
                f,
                "The todo must be between {} and {} characters long.",
                min, max
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Non-empty collection of broken rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Human-readable messages, one per broken rule.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    fn check(errors: Vec<ValidationError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self(errors))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join(" "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(e: ValidationError) -> Self {
        Self(vec![e])
    }
}

fn length_ok(name: &str) -> bool {
    (MIN_NAME_LEN..=MAX_NAME_LEN).contains(&name.chars().count())
}

/// Check a list name against length and uniqueness among `existing`.
///
/// Callers renaming a list pass the other lists only, so a list may keep
/// its own name or change its case.
///
/// ```
/// use todoctl_core::model::TodoList;
/// use todoctl_core::validation::validate_list_name;
///
/// let lists = vec![TodoList::new(1, "Groceries")];
/// assert!(validate_list_name("Chores", &lists).is_ok());
/// assert!(validate_list_name("groceries", &lists).is_err());
/// assert!(validate_list_name("", &lists).is_err());
/// ```
pub fn validate_list_name(name: &str, existing: &[TodoList]) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if !length_ok(name) {
        errors.push(ValidationError::ListNameLength {
            min: MIN_NAME_LEN,
            max: MAX_NAME_LEN,
        });
    }

    let lowered = name.to_lowercase();
    if existing.iter().any(|l| l.name.to_lowercase() == lowered) {
        errors.push(ValidationError::DuplicateListName);
    }

    ValidationErrors::check(errors)
}

/// Check a todo name's length.
pub fn validate_todo_name(name: &str) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if !length_ok(name) {
        errors.push(ValidationError::TodoNameLength {
            min: MIN_NAME_LEN,
            max: MAX_NAME_LEN,
        });
    }

    ValidationErrors::check(errors)
}
