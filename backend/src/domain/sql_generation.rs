//! Natural-language to SQL use case.
//!
//! Ties the pieces together: the active schema from [`SchemaStore`], the
//! prompt from [`PromptBuilder`], the model behind [`SqlGenerator`] and the
//! answer validation in [`parse_model_response`]. Every attempt that reaches
//! the model is recorded exactly once in the [`MetricsAggregator`].

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::{error, info, warn};

use super::metrics::{MetricsAggregator, QueryOutcome};
use super::ports::{SqlGenerator, SqlGeneratorError};
use super::prompt::{PromptBuilder, schema_stats};
use super::response::parse_model_response;
use super::schema_store::SchemaStore;
use super::Error;

const QUESTION_PREVIEW_CHARS: usize = 50;

/// Question submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub question: String,
    /// Extra free text inserted into the prompt; empty counts as absent.
    pub context: Option<String>,
}

impl QueryRequest {
    /// Request without additional context.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: None,
        }
    }

    /// Attach additional context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Successful generation.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub sql: String,
    pub explanation: String,
    pub confidence: f64,
    /// Wall time spent on the model call, in milliseconds.
    pub duration_ms: u64,
}

/// Generates SQL for questions against the active schema.
pub struct SqlGenerationService {
    schemas: Arc<SchemaStore>,
    prompts: PromptBuilder,
    generator: Arc<dyn SqlGenerator>,
    metrics: Arc<MetricsAggregator>,
    clock: Arc<dyn Clock>,
}

impl SqlGenerationService {
    /// Assemble the use case from its collaborators.
    pub fn new(
        schemas: Arc<SchemaStore>,
        prompts: PromptBuilder,
        generator: Arc<dyn SqlGenerator>,
        metrics: Arc<MetricsAggregator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            schemas,
            prompts,
            generator,
            metrics,
            clock,
        }
    }

    /// Answer `request` with generated SQL.
    ///
    /// # Errors
    /// - `invalid_request` when the question is blank;
    /// - `not_found` when no schema is configured;
    /// - `upstream_failure` when the model call fails or its answer is
    ///   unusable. A failed outcome is recorded in that case.
    pub async fn generate(&self, request: &QueryRequest) -> Result<QueryResult, Error> {
        if request.question.trim().is_empty() {
            return Err(Error::invalid_request("question is required")
                .with_details(json!({ "field": "question", "code": "missing_field" })));
        }
        let schema = self.schemas.require()?;

        let prompt = self
            .prompts
            .build(&schema, &request.question, request.context.as_deref());
        let stats = schema_stats(&schema);
        info!(
            question = %preview(request.question.trim()),
            prompt_size = stats.prompt_size,
            "generating SQL"
        );

        let started = self.clock.utc();
        let answer = self.generator.generate(&prompt).await;
        let duration = elapsed_ms(started, self.clock.utc());

        let parsed = answer
            .map_err(describe_generator_error)
            .and_then(|raw| parse_model_response(&raw).map_err(|err| err.to_string()));

        match parsed {
            Ok(generated) => {
                self.metrics.record(QueryOutcome::success(
                    started,
                    duration,
                    stats,
                    generated.confidence,
                ));
                info!(
                    duration_ms = duration,
                    confidence = generated.confidence,
                    "SQL generated"
                );
                Ok(QueryResult {
                    sql: generated.sql,
                    explanation: generated.explanation,
                    confidence: generated.confidence,
                    duration_ms: duration,
                })
            }
            Err(message) => {
                self.metrics
                    .record(QueryOutcome::failure(started, duration, stats, &message));
                error!(duration_ms = duration, error = %message, "SQL generation failed");
                Err(Error::upstream_failure(format!(
                    "failed to generate SQL: {message}"
                )))
            }
        }
    }
}

fn describe_generator_error(err: SqlGeneratorError) -> String {
    if matches!(err, SqlGeneratorError::NotConfigured { .. }) {
        warn!("SQL generation requested but no model API key is configured");
    }
    err.to_string()
}

fn elapsed_ms(started: chrono::DateTime<chrono::Utc>, finished: chrono::DateTime<chrono::Utc>) -> u64 {
    u64::try_from((finished - started).num_milliseconds()).unwrap_or(0)
}

fn preview(question: &str) -> String {
    let mut chars = question.chars();
    let head: String = chars.by_ref().take(QUESTION_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
