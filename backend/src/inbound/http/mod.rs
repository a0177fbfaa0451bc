//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod metrics;
pub mod query;
pub mod schema;
pub mod schema_dto;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::{ApiResult, json_error_handler};
