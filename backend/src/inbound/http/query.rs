//! SQL generation HTTP handler.
//!
//! ```text
//! POST /api/query
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::QueryRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require_text};

const QUESTION: FieldName = FieldName::new("question");

/// Natural-language question to translate.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct QueryPayload {
    #[schema(example = "Quais clientes compraram mais de 10 produtos em 2024?")]
    pub question: Option<String>,
    /// Extra information appended to the prompt.
    #[schema(example = "Considere apenas pedidos finalizados")]
    pub context: Option<String>,
}

/// Generated SQL and the model's assessment.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub success: bool,
    #[schema(example = "SELECT c.name FROM customers c")]
    pub sql: String,
    pub explanation: String,
    /// Model confidence in `[0, 1]`.
    #[schema(example = 0.95)]
    pub confidence: f64,
    /// Model call duration, e.g. `"850ms"`.
    #[schema(example = "850ms")]
    pub generated_in: String,
}

/// Translate a question into SQL against the active schema.
#[utoipa::path(
    post,
    path = "/api/query",
    request_body = QueryPayload,
    responses(
        (status = 200, description = "Generated SQL", body = QueryResponse),
        (status = 400, description = "Invalid question or model failure", body = ErrorSchema),
        (status = 404, description = "No schema configured", body = ErrorSchema)
    ),
    tags = ["query"],
    operation_id = "generateSql"
)]
#[post("/api/query")]
pub async fn generate_sql(
    state: web::Data<HttpState>,
    payload: web::Json<QueryPayload>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let question = require_text(payload.question, QUESTION)?;
    let request = QueryRequest {
        question,
        context: payload.context,
    };

    let result = state.generation.generate(&request).await?;
    Ok(HttpResponse::Ok().json(QueryResponse {
        success: true,
        sql: result.sql,
        explanation: result.explanation,
        confidence: result.confidence,
        generated_in: format!("{}ms", result.duration_ms),
    }))
}
