//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **schema_file**: JSON file storage for the active schema (`cap-std`)
//! - **gemini**: SQL generation through the Gemini REST API (`reqwest`)
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod gemini;
pub mod schema_file;

pub use gemini::{GeminiConfig, GeminiSqlGenerator};
pub use schema_file::FileSchemaRepository;
