//! Movie documents
//!
//! A film work is joined with its genres and credited persons. Persons are
//! grouped by role and de-duplicated by id; every list is sorted so that the
//! same rows always produce byte-identical documents.

use super::fields::{optional_f64, optional_str, required_str, resolve};
use super::Transformer;
use crate::domain::entity::{EntityKind, Relation};
use crate::domain::ids::RowId;
use crate::domain::row::{RelatedRows, SourceRow};
use crate::domain::Result;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
struct PersonRef {
    // Field order gives (name, id) ordering
    name: String,
    id: String,
}

#[derive(Debug, Serialize)]
struct MovieDocument {
    id: String,
    imdb_rating: Option<f64>,
    genre: Vec<String>,
    title: String,
    description: Option<String>,
    director: Option<String>,
    actors_names: Vec<String>,
    writers_names: Vec<String>,
    actors: Vec<PersonRef>,
    writers: Vec<PersonRef>,
}

#[derive(Default)]
struct Credits {
    actors: BTreeMap<RowId, String>,
    writers: BTreeMap<RowId, String>,
    directors: BTreeMap<RowId, String>,
}

impl Credits {
    fn slot(&mut self, role: &str) -> Option<&mut BTreeMap<RowId, String>> {
        match role {
            "actor" => Some(&mut self.actors),
            "writer" => Some(&mut self.writers),
            "director" => Some(&mut self.directors),
            _ => None,
        }
    }
}

fn sorted(people: BTreeMap<RowId, String>) -> Vec<PersonRef> {
    let mut list: Vec<PersonRef> = people
        .into_iter()
        .map(|(id, name)| PersonRef {
            name,
            id: id.into_inner(),
        })
        .collect();
    list.sort();
    list
}

/// Builds `movies` documents
#[derive(Debug, Clone, Copy, Default)]
pub struct MovieTransformer;

impl Transformer for MovieTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::Movies
    }

    fn build_body(&self, row: &SourceRow, related: &RelatedRows) -> Result<Value> {
        let title = required_str(&row.id, &row.columns, "title")?;
        let description = optional_str(&row.id, &row.columns, "description")?;
        let imdb_rating = optional_f64(&row.id, &row.columns, "rating")?;

        let mut genres = BTreeSet::new();
        let mut credits = Credits::default();

        for reference in &row.references {
            match reference.relation {
                Relation::Genre => {
                    let genre = resolve(related, &row.id, Relation::Genre, &reference.id)?;
                    genres.insert(required_str(&row.id, &genre.columns, "name")?);
                }
                Relation::Person => {
                    let Some(slot) = reference.role.as_deref().and_then(|r| credits.slot(r))
                    else {
                        continue;
                    };
                    let person = resolve(related, &row.id, Relation::Person, &reference.id)?;
                    let name = required_str(&row.id, &person.columns, "full_name")?;
                    slot.entry(reference.id.clone()).or_insert(name);
                }
                Relation::FilmWork => {}
            }
        }

        let actors = sorted(credits.actors);
        let writers = sorted(credits.writers);
        let director = sorted(credits.directors).into_iter().next().map(|p| p.name);

        let doc = MovieDocument {
            id: row.id.as_str().to_string(),
            imdb_rating,
            genre: genres.into_iter().collect(),
            title,
            description,
            director,
            actors_names: actors.iter().map(|p| p.name.clone()).collect(),
            writers_names: writers.iter().map(|p| p.name.clone()).collect(),
            actors,
            writers,
        };
        Ok(serde_json::to_value(doc)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::row::{RelatedRow, RowRef};
    use chrono::Utc;
    use serde_json::json;

    fn id(s: &str) -> RowId {
        RowId::new(s).unwrap()
    }

    fn related() -> RelatedRows {
        let mut related = RelatedRows::new();
        related.extend([
            RelatedRow::new(Relation::Person, id("p1")).with_column("full_name", json!("Mark Hamill")),
            RelatedRow::new(Relation::Person, id("p2")).with_column("full_name", json!("Carrie Fisher")),
            RelatedRow::new(Relation::Person, id("p3")).with_column("full_name", json!("George Lucas")),
            RelatedRow::new(Relation::Genre, id("g1")).with_column("name", json!("Sci-Fi")),
            RelatedRow::new(Relation::Genre, id("g2")).with_column("name", json!("Action")),
        ]);
        related
    }

    fn film() -> SourceRow {
        SourceRow::new(id("f1"), Utc::now())
            .with_column("title", json!("Star Wars"))
            .with_column("description", json!("A long time ago"))
            .with_column("rating", json!(8.6))
            .with_reference(RowRef::new(Relation::Person, id("p1")).with_role("actor"))
            .with_reference(RowRef::new(Relation::Person, id("p2")).with_role("actor"))
            .with_reference(RowRef::new(Relation::Person, id("p1")).with_role("actor"))
            .with_reference(RowRef::new(Relation::Person, id("p3")).with_role("director"))
            .with_reference(RowRef::new(Relation::Person, id("p3")).with_role("writer"))
            .with_reference(RowRef::new(Relation::Genre, id("g1")))
            .with_reference(RowRef::new(Relation::Genre, id("g2")))
            .with_reference(RowRef::new(Relation::Genre, id("g1")))
    }

    #[test]
    fn test_movie_document_shape() {
        let body = MovieTransformer.build_body(&film(), &related()).unwrap();

        assert_eq!(
            body,
            json!({
                "id": "f1",
                "imdb_rating": 8.6,
                "genre": ["Action", "Sci-Fi"],
                "title": "Star Wars",
                "description": "A long time ago",
                "director": "George Lucas",
                "actors_names": ["Carrie Fisher", "Mark Hamill"],
                "writers_names": ["George Lucas"],
                "actors": [
                    {"name": "Carrie Fisher", "id": "p2"},
                    {"name": "Mark Hamill", "id": "p1"}
                ],
                "writers": [{"name": "George Lucas", "id": "p3"}]
            })
        );
    }

    #[test]
    fn test_reference_order_does_not_change_document() {
        let mut reversed = film();
        reversed.references.reverse();

        let a = MovieTransformer.build_body(&film(), &related()).unwrap();
        let b = MovieTransformer.build_body(&reversed, &related()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_person_is_data_shape() {
        let row = film().with_reference(RowRef::new(Relation::Person, id("p404")).with_role("actor"));
        let err = MovieTransformer.build_body(&row, &related()).unwrap_err();
        assert!(err.to_string().contains("p404"));
    }

    #[test]
    fn test_missing_title_is_data_shape() {
        let mut row = film();
        row.columns.remove("title");
        assert!(MovieTransformer.build_body(&row, &related()).is_err());
    }

    #[test]
    fn test_unknown_role_ignored() {
        let row = SourceRow::new(id("f2"), Utc::now())
            .with_column("title", json!("Short"))
            .with_reference(RowRef::new(Relation::Person, id("p404")).with_role("producer"));

        let body = MovieTransformer.build_body(&row, &RelatedRows::new()).unwrap();
        assert_eq!(body["actors"], json!([]));
        assert_eq!(body["director"], Value::Null);
    }
}
