//! Builders for the HTTP state and the adapters behind it.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use nl2sql::domain::ports::{SqlGenerator, UnconfiguredSqlGenerator};
use nl2sql::domain::{MetricsAggregator, PromptBuilder, SchemaStore, SqlGenerationService};
use nl2sql::inbound::http::state::HttpState;
use nl2sql::outbound::gemini::GeminiSqlGenerator;
use nl2sql::outbound::schema_file::FileSchemaRepository;

use super::ServerConfig;

/// Pick the model adapter: Gemini when a key is configured, otherwise a
/// generator that reports the missing key on every request.
fn build_generator(config: &ServerConfig) -> std::io::Result<Arc<dyn SqlGenerator>> {
    match &config.gemini {
        Some(gemini) => {
            info!(model = %gemini.model, "Gemini SQL generation enabled");
            let generator = GeminiSqlGenerator::new(gemini.clone()).map_err(|e| {
                std::io::Error::other(format!("failed to build Gemini client: {e}"))
            })?;
            Ok(Arc::new(generator))
        }
        None => {
            warn!("no Gemini API key configured; SQL generation will fail until one is set");
            Ok(Arc::new(UnconfiguredSqlGenerator))
        }
    }
}

/// Build the HTTP state, loading any previously stored schema.
///
/// # Errors
/// Returns [`std::io::Error`] when the schema repository or model client
/// cannot be constructed.
pub(crate) async fn build_http_state(
    config: &ServerConfig,
) -> std::io::Result<web::Data<HttpState>> {
    let repository = FileSchemaRepository::new(&config.schema_path)
        .map_err(|e| std::io::Error::other(format!("invalid schema path: {e}")))?;
    let schemas = Arc::new(SchemaStore::new(Arc::new(repository)));
    schemas.load().await;

    let metrics = Arc::new(MetricsAggregator::new(config.metrics_window));
    let generation = Arc::new(SqlGenerationService::new(
        Arc::clone(&schemas),
        PromptBuilder::new(config.prompt_rules.clone()),
        build_generator(config)?,
        Arc::clone(&metrics),
        Arc::new(DefaultClock),
    ));

    Ok(web::Data::new(HttpState::new(schemas, generation, metrics)))
}
