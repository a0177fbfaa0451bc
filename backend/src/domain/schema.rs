//! Relational schema description fed to the prompt builder.
//!
//! Tables and columns are ordered; the order is display-significant and is
//! preserved through serialisation and merging. References between tables
//! (foreign keys and relationships) are by name only and are never checked
//! against the table list.
//!
//! The serde representation is the persisted document format: camelCase keys,
//! `type` for the column type, kebab-case relationship kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A `table.column` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    /// Build a reference from table and column names.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Column definition within a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    /// Free-form SQL type, e.g. `VARCHAR(255)`.
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ColumnRef>,
}

impl Column {
    /// Plain, non-nullable column without keys.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: false,
            primary_key: false,
            foreign_key: None,
        }
    }

    /// Mark the column as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attach a foreign key reference.
    #[must_use]
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ColumnRef::new(table, column));
        self
    }
}

/// Table definition. `name` is the de-facto key within a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub columns: Vec<Column>,
}

impl Table {
    /// Table without a description.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            description: None,
            columns,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Description if present and non-empty.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|text| !text.is_empty())
    }
}

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationshipKind {
    /// Wire name, e.g. `many-to-one`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneToOne => "one-to-one",
            Self::OneToMany => "one-to-many",
            Self::ManyToOne => "many-to-one",
            Self::ManyToMany => "many-to-many",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed relationship between two columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: ColumnRef,
    pub to: ColumnRef,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
}

/// Identity used for duplicate detection: the ordered
/// `(from.table, from.column, to.table, to.column)` tuple. The kind is not
/// part of the identity.
pub type RelationshipKey<'a> = (&'a str, &'a str, &'a str, &'a str);

impl Relationship {
    /// Build a relationship between two column references.
    pub fn new(from: ColumnRef, to: ColumnRef, kind: RelationshipKind) -> Self {
        Self { from, to, kind }
    }

    /// Duplicate-detection identity.
    pub fn key(&self) -> RelationshipKey<'_> {
        (
            self.from.table.as_str(),
            self.from.column.as_str(),
            self.to.table.as_str(),
            self.to.column.as_str(),
        )
    }
}

/// Reasons a schema cannot be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SchemaValidationError {
    /// `databaseName` was missing or blank.
    #[error("databaseName must not be empty")]
    BlankDatabaseName,
    /// No tables were supplied.
    #[error("schema must contain at least one table")]
    NoTables,
}

impl SchemaValidationError {
    /// Request field the failure refers to.
    pub const fn field(self) -> &'static str {
        match self {
            Self::BlankDatabaseName => "databaseName",
            Self::NoTables => "tables",
        }
    }
}

/// Complete database schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub database_name: String,
    pub tables: Vec<Table>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Schema {
    /// Check the invariants required of a served schema.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), SchemaValidationError> {
        if self.database_name.trim().is_empty() {
            return Err(SchemaValidationError::BlankDatabaseName);
        }
        if self.tables.is_empty() {
            return Err(SchemaValidationError::NoTables);
        }
        Ok(())
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Total number of columns across all tables.
    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|table| table.columns.len()).sum()
    }
}

/// Incremental update payload: tables and relationships to fold into the
/// current schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaUpdate {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl SchemaUpdate {
    /// True when the update carries nothing to merge.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.relationships.is_empty()
    }
}
