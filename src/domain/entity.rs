//! Entity kinds and source relations
//!
//! An entity kind selects the change query and document shape for a pipeline.
//! A relation names a source table whose rows can be joined into a document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Document family produced by a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Film works joined with their genres and credited persons
    Movies,
    /// Genre rows
    Genres,
    /// Persons joined with the films they are credited on
    Persons,
}

impl EntityKind {
    /// All supported kinds
    pub const ALL: [EntityKind; 3] = [EntityKind::Movies, EntityKind::Genres, EntityKind::Persons];

    /// Returns the kind as configured in TOML
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Movies => "movies",
            EntityKind::Genres => "genres",
            EntityKind::Persons => "persons",
        }
    }

    /// The source relation whose rows drive this kind's changes
    pub fn primary_relation(&self) -> Relation {
        match self {
            EntityKind::Movies => Relation::FilmWork,
            EntityKind::Genres => Relation::Genre,
            EntityKind::Persons => Relation::Person,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movies" => Ok(EntityKind::Movies),
            "genres" => Ok(EntityKind::Genres),
            "persons" => Ok(EntityKind::Persons),
            other => Err(format!(
                "unknown entity kind '{other}'. Supported kinds: movies, genres, persons"
            )),
        }
    }
}

/// Source table a row reference points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    FilmWork,
    Person,
    Genre,
}

impl Relation {
    /// Table name in the source schema
    pub fn table_name(&self) -> &'static str {
        match self {
            Relation::FilmWork => "film_work",
            Relation::Person => "person",
            Relation::Genre => "genre",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}
