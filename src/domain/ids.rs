//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for the identifiers that flow through a
//! sync cycle. Each type keeps entity names and row keys from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configured entity name
///
/// Identifies one sync pipeline. The name doubles as the checkpoint file stem,
/// so it is restricted to lowercase ASCII letters, digits, `_` and `-`.
///
/// # Examples
///
/// ```
/// use searchsync::domain::ids::EntityName;
/// use std::str::FromStr;
///
/// let entity = EntityName::from_str("movies").unwrap();
/// assert_eq!(entity.as_str(), "movies");
/// assert!(EntityName::new("../etc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityName(String);

impl EntityName {
    /// Creates a new EntityName from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(EntityName)` if the name is valid, `Err` otherwise
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Entity name cannot be empty".to_string());
        }

        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-'))
        {
            return Err(format!(
                "Invalid character '{c}' in entity name '{name}'. Allowed: a-z, 0-9, '_', '-'"
            ));
        }

        Ok(Self(name))
    }

    /// Returns the entity name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntityName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityName> for String {
    fn from(name: EntityName) -> Self {
        name.0
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source row primary key
///
/// Keys are compared as text, which is the tie-breaker of the sync cursor. The
/// empty key is reserved as the lowest possible value and only appears in the
/// epoch-zero cursor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Creates a new RowId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(RowId)` if the key is non-empty, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.is_empty() {
            return Err("Row ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// The sentinel key that sorts before every real key
    pub fn min() -> Self {
        Self(String::new())
    }

    /// Whether this is the sentinel key
    pub fn is_min(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the row ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RowId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for RowId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
