//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

use serde::Serialize;
use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No schema is configured.
    #[schema(rename = "not_found")]
    NotFound,
    /// The language model failed or returned an unusable answer.
    #[schema(rename = "upstream_failure")]
    UpstreamFailure,
    /// A dependency is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "question is required")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::QueryOutcome`].
#[derive(ToSchema)]
#[schema(as = crate::domain::QueryOutcome, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct QueryOutcomeSchema {
    /// RFC 3339 timestamp of the attempt.
    #[schema(example = "2024-05-01T12:00:00Z")]
    timestamp: String,
    /// Model call duration in milliseconds.
    duration: u64,
    /// Characters in the schema description.
    prompt_size: usize,
    schema_tables: usize,
    schema_columns: usize,
    schema_relationships: usize,
    /// Model confidence, zero on failure.
    confidence: f64,
    success: bool,
    /// Failure message.
    error: Option<String>,
}

/// OpenAPI schema for [`crate::domain::AggregatedMetrics`].
#[derive(ToSchema)]
#[schema(as = crate::domain::AggregatedMetrics, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AggregatedMetricsSchema {
    total_requests: usize,
    successful_requests: usize,
    failed_requests: usize,
    average_latency: f64,
    /// Mean over successful requests only.
    average_confidence: f64,
    average_prompt_size: f64,
    average_schema_tables: f64,
    average_schema_columns: f64,
    average_schema_relationships: f64,
    min_latency: u64,
    max_latency: u64,
    min_confidence: f64,
    max_confidence: f64,
    /// Percentage of failed requests.
    #[schema(example = 25.0)]
    error_rate: f64,
    /// Up to 50 most recent outcomes, newest first.
    recent_metrics: Vec<QueryOutcomeSchema>,
}

/// OpenAPI schema for [`crate::domain::SchemaStats`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SchemaStats, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SchemaStatsSchema {
    tables: usize,
    columns: usize,
    relationships: usize,
    /// Characters in the rendered schema description.
    prompt_size: usize,
}

/// Generic acknowledgement body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    #[schema(example = "Schema removido com sucesso")]
    pub message: String,
}

impl MessageResponse {
    /// Successful acknowledgement with `message`.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
