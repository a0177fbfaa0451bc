//! Schema management HTTP handlers.
//!
//! ```text
//! POST   /api/schema
//! PUT    /api/schema
//! GET    /api/schema
//! DELETE /api/schema
//! GET    /api/schema/tables
//! GET    /api/schema/stats
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Schema, SchemaStats, SchemaUpdate, schema_stats};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schema_dto::{DatabaseSchemaDto, RelationshipDto, TableDto};
use crate::inbound::http::schemas::{ErrorSchema, MessageResponse, SchemaStatsSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error};

const DATABASE_NAME: FieldName = FieldName::new("databaseName");
const TABLES: FieldName = FieldName::new("tables");

/// Request payload for replacing the schema.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetSchemaRequest {
    #[schema(example = "erp")]
    pub database_name: Option<String>,
    pub tables: Option<Vec<TableDto>>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDto>,
}

impl SetSchemaRequest {
    fn into_domain(self) -> ApiResult<Schema> {
        let database_name = self
            .database_name
            .ok_or_else(|| missing_field_error(DATABASE_NAME))?;
        let tables = self.tables.ok_or_else(|| missing_field_error(TABLES))?;
        Ok(Schema {
            database_name,
            tables: tables.into_iter().map(Into::into).collect(),
            relationships: self.relationships.into_iter().map(Into::into).collect(),
        })
    }
}

/// Response payload after replacing the schema.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetSchemaResponse {
    pub success: bool,
    #[schema(example = "Schema configurado com sucesso")]
    pub message: String,
    pub database_name: String,
    pub tables_count: usize,
}

/// Request payload for incremental updates.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateSchemaRequest {
    #[serde(default)]
    pub tables: Vec<TableDto>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDto>,
}

impl From<UpdateSchemaRequest> for SchemaUpdate {
    fn from(value: UpdateSchemaRequest) -> Self {
        SchemaUpdate {
            tables: value.tables.into_iter().map(Into::into).collect(),
            relationships: value.relationships.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response payload after an incremental update.
///
/// `addedTables` and `addedRelationships` count the entries in the request;
/// `replacedTables` and `skippedRelationships` say how many of those replaced
/// an existing table or were dropped as duplicates.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSchemaResponse {
    pub success: bool,
    #[schema(example = "Schema atualizado com sucesso")]
    pub message: String,
    pub database_name: String,
    pub total_tables: usize,
    pub total_relationships: usize,
    pub added_tables: usize,
    pub added_relationships: usize,
    pub replaced_tables: usize,
    pub skipped_relationships: usize,
}

/// Response payload carrying the full schema.
#[derive(Debug, Serialize, ToSchema)]
pub struct GetSchemaResponse {
    pub success: bool,
    pub schema: DatabaseSchemaDto,
}

/// Table name and description.
#[derive(Debug, Serialize, ToSchema)]
pub struct TableSummary {
    #[schema(example = "orders")]
    pub name: String,
    /// `null` when the table has no description.
    pub description: Option<String>,
}

/// Response payload listing the tables.
#[derive(Debug, Serialize, ToSchema)]
pub struct TablesResponse {
    pub success: bool,
    pub tables: Vec<TableSummary>,
    pub count: usize,
}

/// Response payload with schema statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct SchemaStatsResponse {
    pub success: bool,
    #[schema(value_type = SchemaStatsSchema)]
    pub stats: SchemaStats,
}

/// Replace the active schema.
#[utoipa::path(
    post,
    path = "/api/schema",
    request_body = SetSchemaRequest,
    responses(
        (status = 200, description = "Schema configured", body = SetSchemaResponse),
        (status = 400, description = "Invalid schema", body = ErrorSchema),
        (status = 500, description = "Schema could not be stored", body = ErrorSchema)
    ),
    tags = ["schema"],
    operation_id = "setSchema"
)]
#[post("/api/schema")]
pub async fn set_schema(
    state: web::Data<HttpState>,
    payload: web::Json<SetSchemaRequest>,
) -> ApiResult<HttpResponse> {
    let schema = payload.into_inner().into_domain()?;
    let schema = state.schemas.set(schema).await?;
    Ok(HttpResponse::Ok().json(SetSchemaResponse {
        success: true,
        message: "Schema configurado com sucesso".to_owned(),
        database_name: schema.database_name.clone(),
        tables_count: schema.tables.len(),
    }))
}

/// Merge tables and relationships into the active schema.
#[utoipa::path(
    put,
    path = "/api/schema",
    request_body = UpdateSchemaRequest,
    responses(
        (status = 200, description = "Schema updated", body = UpdateSchemaResponse),
        (status = 400, description = "Nothing to merge", body = ErrorSchema),
        (status = 404, description = "No schema configured", body = ErrorSchema),
        (status = 500, description = "Schema could not be stored", body = ErrorSchema)
    ),
    tags = ["schema"],
    operation_id = "updateSchema"
)]
#[put("/api/schema")]
pub async fn update_schema(
    state: web::Data<HttpState>,
    payload: web::Json<UpdateSchemaRequest>,
) -> ApiResult<HttpResponse> {
    let update = SchemaUpdate::from(payload.into_inner());
    let outcome = state.schemas.merge(&update).await?;
    Ok(HttpResponse::Ok().json(UpdateSchemaResponse {
        success: true,
        message: "Schema atualizado com sucesso".to_owned(),
        database_name: outcome.merged.database_name.clone(),
        total_tables: outcome.total_tables(),
        total_relationships: outcome.total_relationships(),
        added_tables: outcome.added_tables,
        added_relationships: outcome.added_relationships,
        replaced_tables: outcome.replaced_tables,
        skipped_relationships: outcome.skipped_relationships,
    }))
}

/// Fetch the active schema.
#[utoipa::path(
    get,
    path = "/api/schema",
    responses(
        (status = 200, description = "Active schema", body = GetSchemaResponse),
        (status = 404, description = "No schema configured", body = ErrorSchema)
    ),
    tags = ["schema"],
    operation_id = "getSchema"
)]
#[get("/api/schema")]
pub async fn get_schema(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let schema = state.schemas.require()?;
    Ok(HttpResponse::Ok().json(GetSchemaResponse {
        success: true,
        schema: DatabaseSchemaDto::from(Schema::clone(&schema)),
    }))
}

/// Remove the active schema and its stored copy.
#[utoipa::path(
    delete,
    path = "/api/schema",
    responses(
        (status = 200, description = "Schema removed", body = MessageResponse),
        (status = 500, description = "Stored schema could not be removed", body = ErrorSchema)
    ),
    tags = ["schema"],
    operation_id = "deleteSchema"
)]
#[delete("/api/schema")]
pub async fn delete_schema(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    state.schemas.clear().await?;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Schema removido com sucesso")))
}

/// List table names and descriptions.
#[utoipa::path(
    get,
    path = "/api/schema/tables",
    responses(
        (status = 200, description = "Tables of the active schema", body = TablesResponse),
        (status = 404, description = "No schema configured", body = ErrorSchema)
    ),
    tags = ["schema"],
    operation_id = "listTables"
)]
#[get("/api/schema/tables")]
pub async fn list_tables(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let schema = state.schemas.require()?;
    let tables: Vec<TableSummary> = schema
        .tables
        .iter()
        .map(|table| TableSummary {
            name: table.name.clone(),
            description: table.description().map(str::to_owned),
        })
        .collect();
    Ok(HttpResponse::Ok().json(TablesResponse {
        success: true,
        count: tables.len(),
        tables,
    }))
}

/// Report table, column and relationship counts plus the prompt size.
#[utoipa::path(
    get,
    path = "/api/schema/stats",
    responses(
        (status = 200, description = "Schema statistics", body = SchemaStatsResponse),
        (status = 404, description = "No schema configured", body = ErrorSchema)
    ),
    tags = ["schema"],
    operation_id = "getSchemaStats"
)]
#[get("/api/schema/stats")]
pub async fn get_schema_stats(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let schema = state.schemas.require()?;
    Ok(HttpResponse::Ok().json(SchemaStatsResponse {
        success: true,
        stats: schema_stats(&schema),
    }))
}
