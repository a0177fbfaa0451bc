//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::{MetricsAggregator, SchemaStore, SqlGenerationService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub schemas: Arc<SchemaStore>,
    pub generation: Arc<SqlGenerationService>,
    pub metrics: Arc<MetricsAggregator>,
}

impl HttpState {
    /// Construct state from the services shared with the generation use case.
    pub fn new(
        schemas: Arc<SchemaStore>,
        generation: Arc<SqlGenerationService>,
        metrics: Arc<MetricsAggregator>,
    ) -> Self {
        Self {
            schemas,
            generation,
            metrics,
        }
    }
}
