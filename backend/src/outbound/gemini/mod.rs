//! Gemini outbound adapter.
//!
//! Implements the `SqlGenerator` port over the Generative Language REST API.

mod dto;
mod http_generator;

pub use http_generator::{
    DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL, GeminiConfig, GeminiSqlGenerator,
};
