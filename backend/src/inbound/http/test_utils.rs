//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use mockable::DefaultClock;

use crate::domain::ports::{InMemorySchemaRepository, SchemaRepository, SqlGenerator};
use crate::domain::{
    Column, ColumnRef, MetricsAggregator, PromptBuilder, PromptRules, Relationship,
    RelationshipKind, Schema, SchemaStore, SqlGenerationService, Table,
};
use crate::inbound::http::error::json_error_handler;
use crate::inbound::http::state::HttpState;

/// Build handler state over an in-memory repository and `generator`.
pub fn test_state(generator: Arc<dyn SqlGenerator>) -> HttpState {
    test_state_with_repository(Arc::new(InMemorySchemaRepository::default()), generator)
}

/// Build handler state over an explicit repository.
pub fn test_state_with_repository(
    repository: Arc<dyn SchemaRepository>,
    generator: Arc<dyn SqlGenerator>,
) -> HttpState {
    let schemas = Arc::new(SchemaStore::new(repository));
    let metrics = Arc::new(MetricsAggregator::default());
    let generation = Arc::new(SqlGenerationService::new(
        Arc::clone(&schemas),
        PromptBuilder::new(PromptRules::default()),
        generator,
        Arc::clone(&metrics),
        Arc::new(DefaultClock),
    ));
    HttpState::new(schemas, generation, metrics)
}

/// App skeleton with state and the JSON error handler registered.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
}

/// Two-table schema used across handler tests.
pub fn sample_schema() -> Schema {
    Schema {
        database_name: "erp".to_owned(),
        tables: vec![
            Table::new(
                "customers",
                vec![Column::new("id", "INTEGER").primary_key(), Column::new("name", "TEXT")],
            )
            .with_description("Clientes"),
            Table::new(
                "orders",
                vec![
                    Column::new("id", "INTEGER").primary_key(),
                    Column::new("customer_id", "INTEGER").references("customers", "id"),
                    Column::new("total", "DECIMAL(10,2)").nullable(),
                ],
            ),
        ],
        relationships: vec![Relationship::new(
            ColumnRef::new("orders", "customer_id"),
            ColumnRef::new("customers", "id"),
            RelationshipKind::ManyToOne,
        )],
    }
}
