//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod schema_repository;
mod sql_generator;

#[cfg(test)]
pub use schema_repository::MockSchemaRepository;
pub use schema_repository::{InMemorySchemaRepository, SchemaRepository, SchemaRepositoryError};
#[cfg(test)]
pub use sql_generator::MockSqlGenerator;
pub use sql_generator::{
    FixtureSqlGenerator, SqlGenerator, SqlGeneratorError, UnconfiguredSqlGenerator,
};
