//! Natural-language to SQL service library.
//!
//! The crate is laid out hexagonally: [`domain`] holds the core model,
//! services and ports; [`outbound`] implements the ports against the file
//! system and the Gemini API; [`inbound`] exposes the HTTP surface.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
