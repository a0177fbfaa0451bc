//! Port for the generative language model.
//!
//! Adapters send the rendered prompt and hand back the model's raw text.
//! Interpreting that text (JSON decoding, defaults) is done by the domain in
//! [`crate::domain::parse_model_response`].

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by SQL generator adapters.
    pub enum SqlGeneratorError {
        /// The adapter is not configured (e.g. missing API key).
        NotConfigured { message } => "model API key not configured: {message}",
        /// Transport failure or non-success status from the model API.
        Upstream { message } => "model request failed: {message}",
        /// The API answered but the envelope could not be decoded.
        Decode { message } => "model response could not be decoded: {message}",
    }
}

/// Sends prompts to a generative model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    /// Return the model's text answer to `prompt`. An empty string is a
    /// valid transport-level answer; the domain rejects it.
    async fn generate(&self, prompt: &str) -> Result<String, SqlGeneratorError>;
}

/// Generator used when no model credentials are configured. Every call
/// fails with [`SqlGeneratorError::NotConfigured`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredSqlGenerator;

#[async_trait]
impl SqlGenerator for UnconfiguredSqlGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, SqlGeneratorError> {
        Err(SqlGeneratorError::not_configured(
            "set GEMINI_API_KEY to enable SQL generation",
        ))
    }
}

/// Generator answering every prompt with a fixed text.
#[derive(Debug, Clone)]
pub struct FixtureSqlGenerator {
    answer: String,
}

impl FixtureSqlGenerator {
    /// Fixture that always answers `answer`.
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

impl Default for FixtureSqlGenerator {
    fn default() -> Self {
        Self::new(r#"{"sql":"SELECT 1","explanation":"fixture","confidence":0.9}"#)
    }
}

#[async_trait]
impl SqlGenerator for FixtureSqlGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, SqlGeneratorError> {
        Ok(self.answer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_generator_always_fails() {
        let err = UnconfiguredSqlGenerator
            .generate("prompt")
            .await
            .expect_err("no credentials");
        assert!(matches!(err, SqlGeneratorError::NotConfigured { .. }));
    }

    #[tokio::test]
    async fn fixture_generator_echoes_answer() {
        let answer = FixtureSqlGenerator::new("{}").generate("p").await.expect("answer");
        assert_eq!(answer, "{}");
    }
}
