//! Domain primitives, services and ports.
//!
//! Purpose: hold the transport-agnostic core of the service. Types document
//! their invariants and serialisation contracts (serde) in their Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable error identifier.
//! - Schema and friends: the relational schema model.
//! - PromptBuilder: renders a schema and question into a model prompt.
//! - merge_schema: incremental schema updates.
//! - MetricsAggregator: rolling window of generation outcomes.
//! - SchemaStore: holder of the active schema.
//! - SqlGenerationService: the natural-language to SQL use case.

pub mod error;
pub mod metrics;
pub mod ports;
pub mod prompt;
pub mod response;
pub mod schema;
pub mod schema_merge;
pub mod schema_store;
pub mod sql_generation;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::metrics::{
    AggregatedMetrics, DEFAULT_METRICS_WINDOW, MetricsAggregator, QueryOutcome,
    RECENT_METRICS_LIMIT,
};
pub use self::prompt::{PromptBuilder, PromptRules, SchemaDescription, SchemaStats, schema_stats};
pub use self::response::{
    DEFAULT_CONFIDENCE, DEFAULT_EXPLANATION, GeneratedSql, ModelResponseError,
    parse_model_response,
};
pub use self::schema::{
    Column, ColumnRef, Relationship, RelationshipKind, Schema, SchemaUpdate,
    SchemaValidationError, Table,
};
pub use self::schema_merge::{MergeOutcome, merge_schema};
pub use self::schema_store::{SCHEMA_NOT_CONFIGURED, SchemaStore};
pub use self::sql_generation::{QueryRequest, QueryResult, SqlGenerationService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use nl2sql::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
