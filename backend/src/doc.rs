//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: All HTTP endpoints from the inbound layer (schema, query,
//!   metrics, health)
//! - **Schemas**: Domain type wrappers ([`ErrorSchema`], [`ErrorCodeSchema`],
//!   [`AggregatedMetricsSchema`]) that provide OpenAPI definitions without
//!   coupling domain types to the utoipa framework
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{
    AggregatedMetricsSchema, ErrorCodeSchema, ErrorSchema, QueryOutcomeSchema, SchemaStatsSchema,
};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "NL2SQL API",
        description = "Translate natural-language questions into SQL against a registered \
                       database schema.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::schema::set_schema,
        crate::inbound::http::schema::update_schema,
        crate::inbound::http::schema::get_schema,
        crate::inbound::http::schema::delete_schema,
        crate::inbound::http::schema::list_tables,
        crate::inbound::http::schema::get_schema_stats,
        crate::inbound::http::query::generate_sql,
        crate::inbound::http::metrics::get_metrics,
        crate::inbound::http::metrics::clear_metrics,
        crate::inbound::http::health::welcome,
        crate::inbound::http::health::status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        AggregatedMetricsSchema,
        QueryOutcomeSchema,
        SchemaStatsSchema
    )),
    tags(
        (name = "schema", description = "Register and inspect the database schema"),
        (name = "query", description = "Generate SQL from natural language"),
        (name = "metrics", description = "Rolling generation metrics"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
