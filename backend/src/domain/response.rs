//! Interpretation of the model's raw answer.
//!
//! The model is asked for a JSON object with `sql`, `explanation` and
//! `confidence`. Only `sql` is mandatory; the other two fall back to
//! defaults so a terse but usable answer is still served.

use serde_json::{Map, Value};

/// Explanation used when the model omits one.
pub const DEFAULT_EXPLANATION: &str = "SQL gerado com sucesso";

/// Confidence used when the model omits one or sends a non-number.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Validated model answer.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSql {
    pub sql: String,
    pub explanation: String,
    /// Always within `[0, 1]`.
    pub confidence: f64,
}

/// Reasons a model answer is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelResponseError {
    /// The model returned no text.
    #[error("empty response from model")]
    Empty,
    /// The text is not a JSON object.
    #[error("malformed response from model: {0}")]
    Malformed(String),
    /// The object has no usable `sql` string.
    #[error("model response did not include SQL")]
    MissingSql,
}

/// Parse and validate the model's raw text.
///
/// # Errors
/// See [`ModelResponseError`].
///
/// # Examples
/// ```
/// use nl2sql::domain::parse_model_response;
///
/// let parsed = parse_model_response(r#"{"sql":"SELECT 1"}"#).unwrap();
/// assert_eq!(parsed.sql, "SELECT 1");
/// assert_eq!(parsed.confidence, 0.8);
/// ```
pub fn parse_model_response(raw: &str) -> Result<GeneratedSql, ModelResponseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ModelResponseError::Empty);
    }

    let value: Value =
        serde_json::from_str(raw).map_err(|err| ModelResponseError::Malformed(err.to_string()))?;
    let Value::Object(object) = value else {
        return Err(ModelResponseError::Malformed(
            "expected a JSON object".to_owned(),
        ));
    };

    let sql = non_blank_string(&object, "sql")
        .map(|sql| sql.trim().to_owned())
        .ok_or(ModelResponseError::MissingSql)?;
    let explanation =
        non_blank_string(&object, "explanation").unwrap_or_else(|| DEFAULT_EXPLANATION.to_owned());
    let confidence = object
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
        .map_or(DEFAULT_CONFIDENCE, |value| value.clamp(0.0, 1.0));

    Ok(GeneratedSql {
        sql,
        explanation,
        confidence,
    })
}

fn non_blank_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_owned)
}
