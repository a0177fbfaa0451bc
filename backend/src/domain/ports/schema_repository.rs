//! Port for durable schema storage.
//!
//! The core needs three operations from persistence: read the stored schema
//! at startup, replace it, and erase it. Adapters decide the medium.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::Schema;

use super::define_port_error;

define_port_error! {
    /// Errors raised by schema repository adapters.
    pub enum SchemaRepositoryError {
        /// Reading or writing the backing medium failed.
        Io { message } => "schema storage I/O failed: {message}",
        /// The stored document could not be encoded or decoded.
        Serialization { message } => "schema document is invalid: {message}",
    }
}

/// Durable storage for the single active schema.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaRepository: Send + Sync {
    /// Read the stored schema, `None` when nothing has been stored.
    async fn load(&self) -> Result<Option<Schema>, SchemaRepositoryError>;

    /// Replace the stored schema. Returns only once the write is durable.
    async fn save(&self, schema: &Schema) -> Result<(), SchemaRepositoryError>;

    /// Erase the stored schema. Erasing an empty store succeeds.
    async fn clear(&self) -> Result<(), SchemaRepositoryError>;
}

/// In-memory repository for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct InMemorySchemaRepository {
    stored: Mutex<Option<Schema>>,
}

impl InMemorySchemaRepository {
    /// Repository pre-populated with `schema`.
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            stored: Mutex::new(Some(schema)),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Schema>>, SchemaRepositoryError> {
        self.stored
            .lock()
            .map_err(|_| SchemaRepositoryError::io("in-memory schema slot poisoned"))
    }
}

#[async_trait]
impl SchemaRepository for InMemorySchemaRepository {
    async fn load(&self) -> Result<Option<Schema>, SchemaRepositoryError> {
        Ok(self.slot()?.clone())
    }

    async fn save(&self, schema: &Schema) -> Result<(), SchemaRepositoryError> {
        *self.slot()? = Some(schema.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SchemaRepositoryError> {
        *self.slot()? = None;
        Ok(())
    }
}
