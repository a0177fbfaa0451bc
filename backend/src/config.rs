//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `NL2SQL_*` environment variables and an
//! optional config file, in the usual OrthoConfig precedence. The model
//! credentials additionally honour the bare `GEMINI_API_KEY` and
//! `GEMINI_MODEL` variables.

use std::env;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cap_std::{ambient_authority, fs::Dir};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{DEFAULT_METRICS_WINDOW, PromptRules};
use crate::outbound::gemini::{DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL, GeminiConfig};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_SCHEMA_PATH: &str = "data/schema.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";

/// Settings controlling the HTTP listener, schema storage and model access.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "NL2SQL")]
pub struct AppSettings {
    /// Interface to bind.
    #[ortho_config(default = DEFAULT_HOST.to_owned())]
    pub host: String,
    /// Port to bind.
    #[ortho_config(default = DEFAULT_PORT)]
    pub port: u16,
    /// File holding the persisted schema.
    #[ortho_config(default = PathBuf::from(DEFAULT_SCHEMA_PATH))]
    pub schema_path: PathBuf,
    /// Gemini API key.
    pub gemini_api_key: Option<String>,
    /// Gemini model identifier.
    pub gemini_model: Option<String>,
    /// Base URL of the Gemini API.
    #[ortho_config(default = DEFAULT_GEMINI_ENDPOINT.to_owned())]
    pub gemini_endpoint: String,
    /// Upper bound on a single model request, in seconds.
    #[ortho_config(default = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
    /// Number of generation outcomes kept for metrics.
    #[ortho_config(default = DEFAULT_METRICS_WINDOW)]
    pub metrics_window: usize,
    /// JSON array of business rules replacing the built-in set.
    pub prompt_rules_path: Option<PathBuf>,
}

/// Failure to turn settings into runtime values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid listen address {address}: {source}")]
    Address {
        address: String,
        source: std::net::AddrParseError,
    },
    #[error("failed to read prompt rules from {path}: {source}")]
    RulesIo { path: PathBuf, source: io::Error },
    #[error("prompt rules in {path} must be a JSON array of strings: {source}")]
    RulesFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<SettingsError> for io::Error {
    fn from(err: SettingsError) -> Self {
        io::Error::other(err)
    }
}

impl AppSettings {
    /// Address the server binds to.
    ///
    /// # Errors
    /// Returns [`SettingsError::Address`] when host and port do not form a
    /// socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let (host, port) = (self.host.trim(), self.port);
        let address = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{port}")
        } else {
            format!("{host}:{port}")
        };
        address
            .parse()
            .map_err(|source| SettingsError::Address { address, source })
    }

    /// Configured API key, falling back to `GEMINI_API_KEY`. Blank keys
    /// count as absent.
    pub fn gemini_api_key(&self) -> Option<String> {
        self.gemini_api_key
            .clone()
            .or_else(|| env::var(GEMINI_API_KEY_ENV).ok())
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty())
    }

    /// Configured model, falling back to `GEMINI_MODEL` and then the default.
    pub fn gemini_model(&self) -> String {
        self.gemini_model
            .clone()
            .or_else(|| env::var(GEMINI_MODEL_ENV).ok())
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_owned())
    }

    /// Model request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Metrics window size; zero is raised to one.
    pub fn metrics_window(&self) -> usize {
        self.metrics_window.max(1)
    }

    /// Gemini adapter settings, or `None` when no API key is available.
    pub fn gemini_config(&self) -> Option<GeminiConfig> {
        self.gemini_api_key().map(|api_key| GeminiConfig {
            api_key,
            model: self.gemini_model(),
            endpoint: self.gemini_endpoint.clone(),
            timeout: self.request_timeout(),
        })
    }

    /// Business rules for the prompt: the file's rules when a path is set,
    /// otherwise the built-in set.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the file cannot be read or is not a
    /// JSON array of strings.
    pub fn prompt_rules(&self) -> Result<PromptRules, SettingsError> {
        match &self.prompt_rules_path {
            Some(path) => load_prompt_rules(path),
            None => Ok(PromptRules::default()),
        }
    }
}

fn load_prompt_rules(path: &Path) -> Result<PromptRules, SettingsError> {
    let io_error = |source| SettingsError::RulesIo {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io_error(io::Error::new(io::ErrorKind::InvalidInput, "not a file")))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
    let text = directory.read_to_string(file_name).map_err(io_error)?;
    let rules: Vec<String> =
        serde_json::from_str(&text).map_err(|source| SettingsError::RulesFormat {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(PromptRules::new(rules))
}
