//! SQL for change detection and related-row lookups
//!
//! Every change query yields the same four columns (`id`, `modified_at`,
//! `columns`, `refs`) and is wrapped in one keyset page: rows strictly after
//! `($1, $2)` ordered by `(modified_at, id)` with ids compared in the "C"
//! collation, limited to `$3`.
//!
//! The inner queries first narrow to keys touched at or after `$1` so the
//! aggregation only covers candidate rows. `modified_at` is the greatest of the
//! timestamps the pre-filter checks, which keeps the filter a superset of the
//! keyset predicate.

use crate::domain::entity::{EntityKind, Relation};

/// Film works, stamped with the latest change among the film, its linked
/// persons and genres, and the links themselves
fn movies_changes(schema: &str) -> String {
    format!(
        r#"SELECT fw.id::text AS id,
       GREATEST(
           fw.updated_at,
           MAX(p.updated_at),
           MAX(g.updated_at),
           MAX(pfw.created_at),
           MAX(gfw.created_at)
       )::timestamptz AS modified_at,
       jsonb_build_object(
           'title', fw.title,
           'description', fw.description,
           'rating', fw.rating
       ) AS columns,
       COALESCE(
           jsonb_agg(DISTINCT jsonb_build_object('relation', 'person', 'id', p.id::text, 'role', pfw.role))
               FILTER (WHERE p.id IS NOT NULL),
           '[]'::jsonb
       ) || COALESCE(
           jsonb_agg(DISTINCT jsonb_build_object('relation', 'genre', 'id', g.id::text))
               FILTER (WHERE g.id IS NOT NULL),
           '[]'::jsonb
       ) AS refs
FROM {schema}.film_work fw
LEFT OUTER JOIN {schema}.person_film_work pfw ON pfw.film_work_id = fw.id
LEFT OUTER JOIN {schema}.person p ON p.id = pfw.person_id
LEFT OUTER JOIN {schema}.genre_film_work gfw ON gfw.film_work_id = fw.id
LEFT OUTER JOIN {schema}.genre g ON g.id = gfw.genre_id
WHERE fw.id IN (
    SELECT touched_fw.id
    FROM {schema}.film_work touched_fw
    WHERE touched_fw.updated_at >= $1::timestamptz
    UNION
    SELECT touched_pfw.film_work_id
    FROM {schema}.person_film_work touched_pfw
    JOIN {schema}.person touched_p ON touched_p.id = touched_pfw.person_id
    WHERE touched_p.updated_at >= $1::timestamptz
       OR touched_pfw.created_at >= $1::timestamptz
    UNION
    SELECT touched_gfw.film_work_id
    FROM {schema}.genre_film_work touched_gfw
    JOIN {schema}.genre touched_g ON touched_g.id = touched_gfw.genre_id
    WHERE touched_g.updated_at >= $1::timestamptz
       OR touched_gfw.created_at >= $1::timestamptz
)
GROUP BY fw.id"#
    )
}

fn genres_changes(schema: &str) -> String {
    format!(
        r#"SELECT g.id::text AS id,
       g.updated_at::timestamptz AS modified_at,
       jsonb_build_object('name', g.name, 'description', g.description) AS columns,
       '[]'::jsonb AS refs
FROM {schema}.genre g
WHERE g.updated_at >= $1::timestamptz"#
    )
}

/// Persons with links to the films they are credited on, stamped with the
/// latest change to the person or to one of their credits
fn persons_changes(schema: &str) -> String {
    format!(
        r#"SELECT p.id::text AS id,
       GREATEST(p.updated_at, MAX(pfw.created_at))::timestamptz AS modified_at,
       jsonb_build_object('full_name', p.full_name) AS columns,
       COALESCE(
           jsonb_agg(jsonb_build_object('relation', 'film_work', 'id', pfw.film_work_id::text, 'role', pfw.role))
               FILTER (WHERE pfw.film_work_id IS NOT NULL),
           '[]'::jsonb
       ) AS refs
FROM {schema}.person p
LEFT OUTER JOIN {schema}.person_film_work pfw ON pfw.person_id = p.id
WHERE p.id IN (
    SELECT touched_p.id
    FROM {schema}.person touched_p
    WHERE touched_p.updated_at >= $1::timestamptz
    UNION
    SELECT touched_pfw.person_id
    FROM {schema}.person_film_work touched_pfw
    WHERE touched_pfw.created_at >= $1::timestamptz
)
GROUP BY p.id"#
    )
}

/// Keyset page over one entity kind's changes
///
/// Parameters: `$1` cursor timestamp (timestamptz), `$2` cursor id (text),
/// `$3` limit (bigint).
pub fn changed_rows(kind: EntityKind, schema: &str) -> String {
    let inner = match kind {
        EntityKind::Movies => movies_changes(schema),
        EntityKind::Genres => genres_changes(schema),
        EntityKind::Persons => persons_changes(schema),
    };

    format!(
        r#"SELECT changed.id, changed.modified_at, changed.columns, changed.refs
FROM (
{inner}
) AS changed
WHERE (changed.modified_at, changed.id COLLATE "C") > ($1::timestamptz, $2::text COLLATE "C")
ORDER BY changed.modified_at, changed.id COLLATE "C"
LIMIT $3"#
    )
}

/// Lookup of related rows by key
///
/// Parameter: `$1` ids (text[]).
pub fn related_rows(relation: Relation, schema: &str) -> String {
    let columns = match relation {
        Relation::FilmWork => {
            "jsonb_build_object('title', r.title, 'rating', r.rating)"
        }
        Relation::Person => "jsonb_build_object('full_name', r.full_name)",
        Relation::Genre => "jsonb_build_object('name', r.name, 'description', r.description)",
    };

    format!(
        "SELECT r.id::text AS id, {columns} AS columns FROM {schema}.{table} r WHERE r.id::text = ANY($1)",
        table = relation.table_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(EntityKind::Movies, "content.film_work")]
    #[test_case(EntityKind::Genres, "content.genre")]
    #[test_case(EntityKind::Persons, "content.person")]
    fn test_changed_rows_uses_compound_keyset(kind: EntityKind, table: &str) {
        let sql = changed_rows(kind, "content");
        assert!(sql.contains(table));
        assert!(sql.contains(r#"(changed.modified_at, changed.id COLLATE "C") > ($1::timestamptz"#));
        assert!(sql.contains(r#"ORDER BY changed.modified_at, changed.id COLLATE "C""#));
        assert!(sql.trim_end().ends_with("LIMIT $3"));
    }

    #[test]
    fn test_movies_modified_at_folds_in_related_rows() {
        let sql = changed_rows(EntityKind::Movies, "content");
        for stamp in [
            "fw.updated_at",
            "MAX(p.updated_at)",
            "MAX(g.updated_at)",
            "MAX(pfw.created_at)",
            "MAX(gfw.created_at)",
        ] {
            assert!(sql.contains(stamp), "missing {stamp}");
        }
    }

    #[test]
    fn test_persons_modified_at_folds_in_credits() {
        let sql = changed_rows(EntityKind::Persons, "content");
        assert!(sql.contains("GREATEST(p.updated_at, MAX(pfw.created_at))::timestamptz AS modified_at"));
    }

    #[test_case(EntityKind::Movies, &["touched_fw.updated_at", "touched_p.updated_at", "touched_pfw.created_at", "touched_g.updated_at", "touched_gfw.created_at"])]
    #[test_case(EntityKind::Genres, &["g.updated_at"])]
    #[test_case(EntityKind::Persons, &["touched_p.updated_at", "touched_pfw.created_at"])]
    fn test_inner_query_prefilters_before_grouping(kind: EntityKind, stamps: &[&str]) {
        let sql = changed_rows(kind, "content");
        let inner_end = sql.find(") AS changed").unwrap();
        let inner = &sql[..inner_end];

        for stamp in stamps {
            assert!(
                inner.contains(&format!("{stamp} >= $1::timestamptz")),
                "{kind}: {stamp} not pre-filtered"
            );
        }
        if let Some(group_by) = inner.find("GROUP BY") {
            assert!(inner.find("\nWHERE ").unwrap() < group_by);
        }
    }

    #[test]
    fn test_related_rows_query() {
        let sql = related_rows(Relation::Person, "public");
        assert!(sql.contains("FROM public.person r"));
        assert!(sql.contains("ANY($1)"));
    }
}
