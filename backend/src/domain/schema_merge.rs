//! Incremental schema updates.
//!
//! Tables are keyed by name: a same-named table replaces the existing entry
//! in place, anything else is appended. Relationships are keyed by their
//! `(from.table, from.column, to.table, to.column)` tuple: a duplicate is
//! skipped, anything else is appended. The input schema is never modified.

use std::collections::HashSet;

use tracing::warn;

use super::schema::{Schema, SchemaUpdate};

/// Result of folding a [`SchemaUpdate`] into a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged: Schema,
    /// Tables present in the request, replacements included.
    pub added_tables: usize,
    /// Relationships present in the request, skipped duplicates included.
    pub added_relationships: usize,
    /// Request tables that replaced an existing table.
    pub replaced_tables: usize,
    /// Request relationships dropped as duplicates.
    pub skipped_relationships: usize,
}

impl MergeOutcome {
    /// Table count after the merge.
    pub fn total_tables(&self) -> usize {
        self.merged.tables.len()
    }

    /// Relationship count after the merge.
    pub fn total_relationships(&self) -> usize {
        self.merged.relationships.len()
    }
}

/// Merge `update` into a copy of `current`.
///
/// Callers reject empty updates and a missing schema before calling this;
/// the merge itself cannot fail.
///
/// # Examples
/// ```
/// use nl2sql::domain::{Column, Schema, SchemaUpdate, Table, merge_schema};
///
/// let current = Schema {
///     database_name: "shop".into(),
///     tables: vec![Table::new("orders", vec![Column::new("id", "INT")])],
///     relationships: vec![],
/// };
/// let update = SchemaUpdate {
///     tables: vec![Table::new("orders", vec![Column::new("uuid", "UUID")])],
///     relationships: vec![],
/// };
/// let outcome = merge_schema(&current, &update);
/// assert_eq!(outcome.total_tables(), 1);
/// assert_eq!(outcome.replaced_tables, 1);
/// ```
pub fn merge_schema(current: &Schema, update: &SchemaUpdate) -> MergeOutcome {
    let mut merged = current.clone();
    let mut replaced_tables = 0;
    let mut skipped_relationships = 0;

    for table in &update.tables {
        match merged.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => {
                warn!(table = %table.name, "table already exists; replacing");
                *existing = table.clone();
                replaced_tables += 1;
            }
            None => merged.tables.push(table.clone()),
        }
    }

    let mut seen: HashSet<(String, String, String, String)> = merged
        .relationships
        .iter()
        .map(|rel| owned_key(rel.key()))
        .collect();
    for rel in &update.relationships {
        if seen.insert(owned_key(rel.key())) {
            merged.relationships.push(rel.clone());
        } else {
            warn!(
                from = %rel.from,
                to = %rel.to,
                "relationship already exists; skipping"
            );
            skipped_relationships += 1;
        }
    }

    MergeOutcome {
        merged,
        added_tables: update.tables.len(),
        added_relationships: update.relationships.len(),
        replaced_tables,
        skipped_relationships,
    }
}

fn owned_key((a, b, c, d): (&str, &str, &str, &str)) -> (String, String, String, String) {
    (a.to_owned(), b.to_owned(), c.to_owned(), d.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{Column, ColumnRef, Relationship, RelationshipKind, Table};
    use rstest::{fixture, rstest};

    fn rel(from: (&str, &str), to: (&str, &str), kind: RelationshipKind) -> Relationship {
        Relationship::new(
            ColumnRef::new(from.0, from.1),
            ColumnRef::new(to.0, to.1),
            kind,
        )
    }

    #[fixture]
    fn current() -> Schema {
        Schema {
            database_name: "shop".to_owned(),
            tables: vec![
                Table::new("orders", vec![Column::new("id", "INT").primary_key()]),
                Table::new("items", vec![Column::new("id", "INT").primary_key()]),
            ],
            relationships: vec![rel(
                ("items", "order_id"),
                ("orders", "id"),
                RelationshipKind::ManyToOne,
            )],
        }
    }

    #[rstest]
    fn new_entries_are_appended(current: Schema) {
        let update = SchemaUpdate {
            tables: vec![Table::new("customers", vec![Column::new("id", "INT")])],
            relationships: vec![rel(
                ("orders", "customer_id"),
                ("customers", "id"),
                RelationshipKind::ManyToOne,
            )],
        };

        let outcome = merge_schema(&current, &update);

        assert_eq!(outcome.total_tables(), current.tables.len() + 1);
        assert_eq!(outcome.total_relationships(), current.relationships.len() + 1);
        assert_eq!(outcome.merged.tables[2].name, "customers");
        assert_eq!(outcome.merged.relationships[1], update.relationships[0]);
        assert_eq!((outcome.replaced_tables, outcome.skipped_relationships), (0, 0));
    }

    #[rstest]
    fn same_named_table_replaces_in_place(current: Schema) {
        let replacement = Table::new(
            "orders",
            vec![Column::new("id", "BIGINT"), Column::new("total", "DECIMAL(10,2)")],
        );
        let update = SchemaUpdate {
            tables: vec![replacement.clone()],
            relationships: Vec::new(),
        };

        let outcome = merge_schema(&current, &update);

        assert_eq!(outcome.total_tables(), 2);
        assert_eq!(outcome.merged.tables[0], replacement);
        assert_eq!(outcome.merged.tables[1].name, "items");
        assert_eq!(outcome.added_tables, 1);
        assert_eq!(outcome.replaced_tables, 1);
    }

    #[rstest]
    fn duplicate_relationship_is_skipped_regardless_of_kind(current: Schema) {
        let update = SchemaUpdate {
            tables: Vec::new(),
            relationships: vec![rel(
                ("items", "order_id"),
                ("orders", "id"),
                RelationshipKind::OneToOne,
            )],
        };

        let outcome = merge_schema(&current, &update);

        assert_eq!(outcome.merged.relationships, current.relationships);
        assert_eq!(outcome.added_relationships, 1);
        assert_eq!(outcome.skipped_relationships, 1);
    }

    #[rstest]
    fn reversed_direction_is_a_distinct_relationship(current: Schema) {
        let update = SchemaUpdate {
            tables: Vec::new(),
            relationships: vec![rel(
                ("orders", "id"),
                ("items", "order_id"),
                RelationshipKind::OneToMany,
            )],
        };

        let outcome = merge_schema(&current, &update);
        assert_eq!(outcome.total_relationships(), 2);
    }

    #[rstest]
    fn duplicates_within_one_request_are_collapsed(current: Schema) {
        let fresh = rel(("a", "x"), ("b", "y"), RelationshipKind::OneToOne);
        let update = SchemaUpdate {
            tables: Vec::new(),
            relationships: vec![fresh.clone(), fresh],
        };

        let outcome = merge_schema(&current, &update);
        assert_eq!(outcome.total_relationships(), 2);
        assert_eq!(outcome.skipped_relationships, 1);
        assert_eq!(outcome.added_relationships, 2);
    }

    #[rstest]
    fn input_schema_is_untouched(current: Schema) {
        let before = current.clone();
        let update = SchemaUpdate {
            tables: vec![Table::new("orders", Vec::new())],
            relationships: vec![rel(("a", "x"), ("b", "y"), RelationshipKind::OneToOne)],
        };

        let _outcome = merge_schema(&current, &update);
        assert_eq!(current, before);
    }

    #[rstest]
    fn replacing_orders_and_linking_new_customers(current: Schema) {
        let update = SchemaUpdate {
            tables: vec![Table::new("orders", vec![Column::new("order_no", "TEXT")])],
            relationships: vec![rel(
                ("orders", "id"),
                ("customers", "id"),
                RelationshipKind::ManyToOne,
            )],
        };

        let outcome = merge_schema(&current, &update);

        let orders: Vec<_> = outcome
            .merged
            .tables
            .iter()
            .filter(|t| t.name == "orders")
            .collect();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].columns[0].name, "order_no");
        assert_eq!(
            outcome.merged.relationships.last(),
            update.relationships.last()
        );
        assert_eq!((outcome.added_tables, outcome.added_relationships), (1, 1));
    }
}
