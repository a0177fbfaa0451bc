//! Reqwest-backed Gemini adapter.
//!
//! This adapter owns transport details only: request serialisation, the API
//! key header, timeout and HTTP error mapping, and extraction of the answer
//! text. Interpreting the text is left to the domain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::dto::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use crate::domain::ports::{SqlGenerator, SqlGeneratorError};

/// Base URL of the public Generative Language API.
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

const SYSTEM_INSTRUCTION: &str = "Você é um especialista em SQL. Gere apenas consultas SQL \
válidas baseadas no schema fornecido. Retorne SEMPRE um JSON com os campos: sql, explanation, \
confidence. Retorne a explanation em português.";

const TEMPERATURE: f32 = 0.1;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection settings for [`GeminiSqlGenerator`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL, without the `/v1beta/...` path.
    pub endpoint: String,
    pub timeout: Duration,
}

/// SQL generator calling `models/{model}:generateContent`.
pub struct GeminiSqlGenerator {
    client: Client,
    url: String,
    api_key: String,
}

impl GeminiSqlGenerator {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: GeminiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: generate_content_url(&config.endpoint, &config.model),
            api_key: config.api_key,
        })
    }
}

#[async_trait]
impl SqlGenerator for GeminiSqlGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, SqlGeneratorError> {
        let body = GenerateContentRequest::new(SYSTEM_INSTRUCTION, prompt, TEMPERATURE);
        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        extract_text(bytes.as_ref())
    }
}

fn generate_content_url(endpoint: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        endpoint.trim_end_matches('/'),
        model.trim()
    )
}

fn extract_text(body: &[u8]) -> Result<String, SqlGeneratorError> {
    let decoded: GenerateContentResponse = serde_json::from_slice(body).map_err(|error| {
        SqlGeneratorError::decode(format!("invalid generateContent payload: {error}"))
    })?;
    if let Some(reason) = decoded.block_reason() {
        return Err(SqlGeneratorError::upstream(format!(
            "prompt blocked: {reason}"
        )));
    }
    Ok(decoded.into_text())
}

fn map_transport_error(error: reqwest::Error) -> SqlGeneratorError {
    if error.is_timeout() {
        SqlGeneratorError::upstream(format!("request timed out: {error}"))
    } else {
        SqlGeneratorError::upstream(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SqlGeneratorError {
    let detail = serde_json::from_slice::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body_preview(body));
    let message = if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {detail}", status.as_u16())
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SqlGeneratorError::not_configured(message)
        }
        _ => SqlGeneratorError::upstream(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network request and response helpers.

    use super::*;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case("https://generativelanguage.googleapis.com", "gemini-1.5-flash")]
    #[case("https://generativelanguage.googleapis.com/", " gemini-1.5-flash ")]
    fn builds_generate_content_url(#[case] endpoint: &str, #[case] model: &str) {
        assert_eq!(
            generate_content_url(endpoint, model),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn request_body_carries_instruction_prompt_and_config() {
        let body = serde_json::to_value(GenerateContentRequest::new(
            SYSTEM_INSTRUCTION,
            "PERGUNTA",
            TEMPERATURE,
        ))
        .expect("serialise request");

        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            Value::from(SYSTEM_INSTRUCTION)
        );
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "PERGUNTA");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        let temperature = body["generationConfig"]["temperature"]
            .as_f64()
            .expect("numeric temperature");
        assert!((temperature - 0.1).abs() < 1e-6);
    }

    #[test]
    fn extracts_text_from_first_candidate() {
        let body = json!({
            "candidates": [
                { "content": { "parts": [ { "text": "{\"sql\":" }, { "text": "\"SELECT 1\"}" } ] } },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
        });
        let text = extract_text(body.to_string().as_bytes()).expect("text");
        assert_eq!(text, r#"{"sql":"SELECT 1"}"#);
    }

    #[test]
    fn missing_candidates_yield_empty_text() {
        let text = extract_text(b"{}").expect("text");
        assert!(text.is_empty());
    }

    #[test]
    fn blocked_prompt_is_an_upstream_error() {
        let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let error = extract_text(body.to_string().as_bytes()).expect_err("blocked");
        assert_eq!(error, SqlGeneratorError::upstream("prompt blocked: SAFETY"));
    }

    #[test]
    fn undecodable_payload_is_a_decode_error() {
        let error = extract_text(b"<html>").expect_err("not json");
        assert!(matches!(error, SqlGeneratorError::Decode { .. }));
    }

    #[rstest]
    #[case::unauthorised(StatusCode::FORBIDDEN, true)]
    #[case::unavailable(StatusCode::SERVICE_UNAVAILABLE, false)]
    #[case::bad_request(StatusCode::BAD_REQUEST, false)]
    fn maps_statuses_and_extracts_api_message(
        #[case] status: StatusCode,
        #[case] credential_problem: bool,
    ) {
        let body = json!({ "error": { "code": status.as_u16(), "message": "API key not valid" } });
        let error = map_status_error(status, body.to_string().as_bytes());

        assert_eq!(
            matches!(error, SqlGeneratorError::NotConfigured { .. }),
            credential_problem
        );
        assert!(error.to_string().contains("API key not valid"));
        assert!(error.to_string().contains(&status.as_u16().to_string()));
    }

    #[test]
    fn non_json_error_bodies_are_previewed() {
        let error = map_status_error(StatusCode::BAD_GATEWAY, b"  upstream\n  down  ");
        assert_eq!(error, SqlGeneratorError::upstream("status 502: upstream down"));
    }
}
