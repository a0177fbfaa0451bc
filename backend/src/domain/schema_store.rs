//! Holder of the single active schema.
//!
//! The store owns the in-memory copy and keeps it in step with a
//! [`SchemaRepository`]. Mutations are serialised by an async mutex and a new
//! value is only published after the repository has accepted it, so a failed
//! write never leaves memory ahead of storage. Reads take a cheap snapshot
//! and never wait on a write in progress.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::ports::{SchemaRepository, SchemaRepositoryError};
use super::schema::{Schema, SchemaUpdate, SchemaValidationError};
use super::schema_merge::{MergeOutcome, merge_schema};
use super::Error;

/// Message returned whenever an operation needs a schema and none is set.
pub const SCHEMA_NOT_CONFIGURED: &str =
    "database schema not configured; configure it first via POST /api/schema";

/// Process-wide schema holder backed by a repository.
pub struct SchemaStore {
    repository: Arc<dyn SchemaRepository>,
    current: RwLock<Option<Arc<Schema>>>,
    writes: Mutex<()>,
}

impl SchemaStore {
    /// Empty store over `repository`. Call [`SchemaStore::load`] to pick up
    /// a previously stored schema.
    pub fn new(repository: Arc<dyn SchemaRepository>) -> Self {
        Self {
            repository,
            current: RwLock::new(None),
            writes: Mutex::new(()),
        }
    }

    /// Populate the cache from the repository.
    ///
    /// Repository failures and stored schemas that fail validation are
    /// logged and leave the store empty.
    pub async fn load(&self) {
        let _guard = self.writes.lock().await;
        let loaded = match self.repository.load().await {
            Ok(Some(schema)) => match schema.validate() {
                Ok(()) => {
                    info!(
                        database = %schema.database_name,
                        tables = schema.tables.len(),
                        "loaded stored schema"
                    );
                    Some(Arc::new(schema))
                }
                Err(err) => {
                    warn!(error = %err, "discarding invalid stored schema");
                    None
                }
            },
            Ok(None) => {
                info!("no stored schema; waiting for configuration");
                None
            }
            Err(err) => {
                warn!(error = %err, "failed to load stored schema; starting without one");
                None
            }
        };
        self.publish(loaded);
    }

    /// Snapshot of the active schema.
    pub fn get(&self) -> Option<Arc<Schema>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of the active schema or a `not_found` error.
    ///
    /// # Errors
    /// Returns [`super::ErrorCode::NotFound`] when no schema is configured.
    pub fn require(&self) -> Result<Arc<Schema>, Error> {
        self.get().ok_or_else(|| Error::not_found(SCHEMA_NOT_CONFIGURED))
    }

    /// Replace the active schema wholesale.
    ///
    /// # Errors
    /// `invalid_request` when the schema fails validation; `internal_error`
    /// when the repository rejects the write.
    pub async fn set(&self, schema: Schema) -> Result<Arc<Schema>, Error> {
        schema.validate().map_err(validation_error)?;

        let _guard = self.writes.lock().await;
        self.repository.save(&schema).await.map_err(map_repository_error)?;
        let schema = Arc::new(schema);
        self.publish(Some(Arc::clone(&schema)));
        info!(
            database = %schema.database_name,
            tables = schema.tables.len(),
            relationships = schema.relationships.len(),
            "schema configured"
        );
        Ok(schema)
    }

    /// Fold `update` into the active schema.
    ///
    /// # Errors
    /// `invalid_request` when the update is empty; `not_found` when no schema
    /// is configured; `internal_error` when the repository rejects the write.
    pub async fn merge(&self, update: &SchemaUpdate) -> Result<MergeOutcome, Error> {
        if update.is_empty() {
            return Err(Error::invalid_request(
                "provide at least one table or relationship to add",
            )
            .with_details(json!({ "field": "tables", "code": "missing_field" })));
        }

        let _guard = self.writes.lock().await;
        let current = self.require()?;
        let outcome = merge_schema(&current, update);
        self.repository
            .save(&outcome.merged)
            .await
            .map_err(map_repository_error)?;
        self.publish(Some(Arc::new(outcome.merged.clone())));
        info!(
            database = %outcome.merged.database_name,
            added_tables = outcome.added_tables,
            added_relationships = outcome.added_relationships,
            total_tables = outcome.total_tables(),
            "schema updated"
        );
        Ok(outcome)
    }

    /// Remove the active schema from memory and from the repository.
    ///
    /// # Errors
    /// `internal_error` when the repository cannot erase its copy; the cached
    /// schema is kept in that case.
    pub async fn clear(&self) -> Result<(), Error> {
        let _guard = self.writes.lock().await;
        self.repository.clear().await.map_err(map_repository_error)?;
        self.publish(None);
        info!("schema cleared");
        Ok(())
    }

    fn publish(&self, schema: Option<Arc<Schema>>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = schema;
    }
}

fn validation_error(err: SchemaValidationError) -> Error {
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": err.field(), "code": "missing_field" }))
}

fn map_repository_error(err: SchemaRepositoryError) -> Error {
    match err {
        SchemaRepositoryError::Io { message } => {
            Error::internal(format!("schema storage failed: {message}"))
        }
        SchemaRepositoryError::Serialization { message } => {
            Error::internal(format!("schema serialization failed: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{InMemorySchemaRepository, MockSchemaRepository};
    use crate::domain::schema::{Column, ColumnRef, Relationship, RelationshipKind, Table};
    use async_trait::async_trait;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    /// Repository whose writes yield to the scheduler before completing, so
    /// concurrent callers interleave unless the store serialises them.
    #[derive(Default)]
    struct SlowRepository {
        inner: InMemorySchemaRepository,
    }

    #[async_trait]
    impl SchemaRepository for SlowRepository {
        async fn load(&self) -> Result<Option<Schema>, SchemaRepositoryError> {
            self.inner.load().await
        }

        async fn save(&self, schema: &Schema) -> Result<(), SchemaRepositoryError> {
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.inner.save(schema).await
        }

        async fn clear(&self) -> Result<(), SchemaRepositoryError> {
            self.inner.clear().await
        }
    }

    fn schema(name: &str) -> Schema {
        Schema {
            database_name: name.to_owned(),
            tables: vec![Table::new("orders", vec![Column::new("id", "INT").primary_key()])],
            relationships: Vec::new(),
        }
    }

    #[fixture]
    fn repository() -> Arc<InMemorySchemaRepository> {
        Arc::new(InMemorySchemaRepository::default())
    }

    #[rstest]
    #[tokio::test]
    async fn set_persists_and_publishes(repository: Arc<InMemorySchemaRepository>) {
        let store = SchemaStore::new(repository.clone());

        store.set(schema("shop")).await.expect("set schema");

        assert_eq!(store.get().as_deref(), Some(&schema("shop")));
        assert_eq!(
            repository.load().await.expect("load"),
            Some(schema("shop"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn set_rejects_invalid_schema(repository: Arc<InMemorySchemaRepository>) {
        let store = SchemaStore::new(repository);
        let mut invalid = schema("shop");
        invalid.tables.clear();

        let err = store.set(invalid).await.expect_err("no tables");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("field")),
            Some(&json!("tables"))
        );
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_schema() {
        let mut repository = MockSchemaRepository::new();
        let mut calls = 0;
        repository.expect_save().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(())
            } else {
                Err(SchemaRepositoryError::io("disk full"))
            }
        });
        let store = SchemaStore::new(Arc::new(repository));
        store.set(schema("first")).await.expect("first save");

        let err = store.set(schema("second")).await.expect_err("save fails");

        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(
            store.get().map(|s| s.database_name.clone()).as_deref(),
            Some("first")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn merge_requires_configured_schema(repository: Arc<InMemorySchemaRepository>) {
        let store = SchemaStore::new(repository);
        let update = SchemaUpdate {
            tables: vec![Table::new("items", Vec::new())],
            relationships: Vec::new(),
        };

        let err = store.merge(&update).await.expect_err("no schema");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), SCHEMA_NOT_CONFIGURED);
    }

    #[rstest]
    #[tokio::test]
    async fn merge_rejects_empty_update_before_schema_check(
        repository: Arc<InMemorySchemaRepository>,
    ) {
        let store = SchemaStore::new(repository);
        let err = store
            .merge(&SchemaUpdate::default())
            .await
            .expect_err("empty update");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn merge_persists_merged_schema(repository: Arc<InMemorySchemaRepository>) {
        let store = SchemaStore::new(repository.clone());
        store.set(schema("shop")).await.expect("set");
        let update = SchemaUpdate {
            tables: vec![Table::new("customers", vec![Column::new("id", "INT")])],
            relationships: vec![Relationship::new(
                ColumnRef::new("orders", "customer_id"),
                ColumnRef::new("customers", "id"),
                RelationshipKind::ManyToOne,
            )],
        };

        let outcome = store.merge(&update).await.expect("merge");

        assert_eq!(outcome.total_tables(), 2);
        let stored = repository.load().await.expect("load").expect("stored");
        assert_eq!(stored, outcome.merged);
        assert_eq!(store.get().as_deref(), Some(&outcome.merged));
    }

    #[rstest]
    #[tokio::test]
    async fn clear_erases_memory_and_storage(repository: Arc<InMemorySchemaRepository>) {
        let store = SchemaStore::new(repository.clone());
        store.set(schema("shop")).await.expect("set");

        store.clear().await.expect("clear");

        assert!(store.get().is_none());
        assert!(repository.load().await.expect("load").is_none());
    }

    #[tokio::test]
    async fn load_swallows_repository_failures() {
        let mut repository = MockSchemaRepository::new();
        repository
            .expect_load()
            .returning(|| Err(SchemaRepositoryError::serialization("bad json")));
        let store = SchemaStore::new(Arc::new(repository));

        store.load().await;

        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn load_discards_invalid_stored_schema() {
        let mut stored = schema("shop");
        stored.database_name = " ".to_owned();
        let store = SchemaStore::new(Arc::new(InMemorySchemaRepository::with_schema(stored)));

        store.load().await;

        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn load_publishes_stored_schema() {
        let store = SchemaStore::new(Arc::new(InMemorySchemaRepository::with_schema(schema(
            "shop",
        ))));

        store.load().await;

        assert_eq!(store.get().as_deref(), Some(&schema("shop")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_merges_keep_every_table() {
        const WRITERS: usize = 20;
        let repository = Arc::new(SlowRepository::default());
        let store = Arc::new(SchemaStore::new(repository.clone()));
        store.set(schema("shop")).await.expect("set");

        let handles: Vec<_> = (0..WRITERS)
            .map(|n| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let update = SchemaUpdate {
                        tables: vec![Table::new(
                            format!("table_{n}"),
                            vec![Column::new("id", "INT")],
                        )],
                        relationships: Vec::new(),
                    };
                    store.merge(&update).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.expect("merge task").expect("merge");
        }

        let current = store.get().expect("schema configured");
        assert_eq!(current.tables.len(), WRITERS + 1);
        for n in 0..WRITERS {
            assert!(current.table(&format!("table_{n}")).is_some(), "table_{n} lost");
        }
        let stored = repository.load().await.expect("load").expect("stored");
        assert_eq!(&stored, current.as_ref());
    }
}
