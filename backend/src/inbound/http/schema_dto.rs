//! Transport DTOs for schema payloads.
//!
//! These mirror the domain schema types with OpenAPI metadata attached and
//! convert both ways. Unknown relationship kinds are rejected during
//! deserialisation; `nullable`, `primaryKey` and `relationships` default when
//! omitted.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Column, ColumnRef, Relationship, RelationshipKind, Schema, Table};

/// `table.column` reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct ColumnRefDto {
    #[schema(example = "customers")]
    pub table: String,
    #[schema(example = "id")]
    pub column: String,
}

/// Column definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDto {
    #[schema(example = "customer_id")]
    pub name: String,
    /// Free-form SQL type.
    #[serde(rename = "type")]
    #[schema(example = "INTEGER")]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ColumnRefDto>,
}

/// Table definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct TableDto {
    #[schema(example = "orders")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub columns: Vec<ColumnDto>,
}

/// Relationship cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKindDto {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// Directed relationship between two columns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct RelationshipDto {
    pub from: ColumnRefDto,
    pub to: ColumnRefDto,
    #[serde(rename = "type")]
    pub kind: RelationshipKindDto,
}

/// Complete schema as returned by `GET /api/schema`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSchemaDto {
    #[schema(example = "erp")]
    pub database_name: String,
    pub tables: Vec<TableDto>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDto>,
}

impl From<ColumnRefDto> for ColumnRef {
    fn from(value: ColumnRefDto) -> Self {
        ColumnRef::new(value.table, value.column)
    }
}

impl From<ColumnRef> for ColumnRefDto {
    fn from(value: ColumnRef) -> Self {
        Self {
            table: value.table,
            column: value.column,
        }
    }
}

impl From<ColumnDto> for Column {
    fn from(value: ColumnDto) -> Self {
        Column {
            name: value.name,
            data_type: value.data_type,
            nullable: value.nullable,
            primary_key: value.primary_key,
            foreign_key: value.foreign_key.map(Into::into),
        }
    }
}

impl From<Column> for ColumnDto {
    fn from(value: Column) -> Self {
        Self {
            name: value.name,
            data_type: value.data_type,
            nullable: value.nullable,
            primary_key: value.primary_key,
            foreign_key: value.foreign_key.map(Into::into),
        }
    }
}

impl From<TableDto> for Table {
    fn from(value: TableDto) -> Self {
        Table {
            name: value.name,
            description: value.description,
            columns: value.columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Table> for TableDto {
    fn from(value: Table) -> Self {
        Self {
            name: value.name,
            description: value.description,
            columns: value.columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<RelationshipKindDto> for RelationshipKind {
    fn from(value: RelationshipKindDto) -> Self {
        match value {
            RelationshipKindDto::OneToOne => Self::OneToOne,
            RelationshipKindDto::OneToMany => Self::OneToMany,
            RelationshipKindDto::ManyToOne => Self::ManyToOne,
            RelationshipKindDto::ManyToMany => Self::ManyToMany,
        }
    }
}

impl From<RelationshipKind> for RelationshipKindDto {
    fn from(value: RelationshipKind) -> Self {
        match value {
            RelationshipKind::OneToOne => Self::OneToOne,
            RelationshipKind::OneToMany => Self::OneToMany,
            RelationshipKind::ManyToOne => Self::ManyToOne,
            RelationshipKind::ManyToMany => Self::ManyToMany,
        }
    }
}

impl From<RelationshipDto> for Relationship {
    fn from(value: RelationshipDto) -> Self {
        Relationship::new(value.from.into(), value.to.into(), value.kind.into())
    }
}

impl From<Relationship> for RelationshipDto {
    fn from(value: Relationship) -> Self {
        Self {
            from: value.from.into(),
            to: value.to.into(),
            kind: value.kind.into(),
        }
    }
}

impl From<Schema> for DatabaseSchemaDto {
    fn from(value: Schema) -> Self {
        Self {
            database_name: value.database_name,
            tables: value.tables.into_iter().map(Into::into).collect(),
            relationships: value.relationships.into_iter().map(Into::into).collect(),
        }
    }
}
