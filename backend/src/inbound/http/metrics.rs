//! Generation metrics HTTP handlers.
//!
//! ```text
//! GET    /api/metrics
//! DELETE /api/metrics
//! ```

use actix_web::{HttpResponse, delete, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::AggregatedMetrics;
use crate::inbound::http::schemas::{AggregatedMetricsSchema, MessageResponse};
use crate::inbound::http::state::HttpState;

/// Aggregates over the rolling window.
#[derive(Debug, Serialize, ToSchema)]
pub struct MetricsResponse {
    pub success: bool,
    #[schema(value_type = AggregatedMetricsSchema)]
    pub metrics: AggregatedMetrics,
}

/// Aggregate the recorded generation outcomes.
#[utoipa::path(
    get,
    path = "/api/metrics",
    responses((status = 200, description = "Aggregated metrics", body = MetricsResponse)),
    tags = ["metrics"],
    operation_id = "getMetrics"
)]
#[get("/api/metrics")]
pub async fn get_metrics(state: web::Data<HttpState>) -> HttpResponse {
    HttpResponse::Ok().json(MetricsResponse {
        success: true,
        metrics: state.metrics.aggregate(),
    })
}

/// Drop every recorded outcome.
#[utoipa::path(
    delete,
    path = "/api/metrics",
    responses((status = 200, description = "Metrics cleared", body = MessageResponse)),
    tags = ["metrics"],
    operation_id = "clearMetrics"
)]
#[delete("/api/metrics")]
pub async fn clear_metrics(state: web::Data<HttpState>) -> HttpResponse {
    state.metrics.clear();
    HttpResponse::Ok().json(MessageResponse::ok("Métricas limpas com sucesso"))
}
