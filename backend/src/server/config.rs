//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use nl2sql::config::AppSettings;
use nl2sql::domain::PromptRules;
use nl2sql::outbound::gemini::GeminiConfig;

/// Resolved runtime configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) schema_path: PathBuf,
    pub(crate) gemini: Option<GeminiConfig>,
    pub(crate) prompt_rules: PromptRules,
    pub(crate) metrics_window: usize,
}

impl ServerConfig {
    /// Resolve settings into concrete values, reading the prompt rules file
    /// when one is configured.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the listen address is invalid or the
    /// prompt rules cannot be loaded.
    pub fn from_settings(settings: &AppSettings) -> std::io::Result<Self> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            schema_path: settings.schema_path.clone(),
            gemini: settings.gemini_config(),
            prompt_rules: settings.prompt_rules()?,
            metrics_window: settings.metrics_window(),
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
