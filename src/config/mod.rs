//! Configuration management.
//!
//! Settings come from a TOML file with `BIBRESOLVE_` environment overrides
//! (nested keys use `__`, e.g. `BIBRESOLVE_SERVER__PORT=8080`).
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [upstream]
//! doi_api_url = "https://doi.org/api/handles"
//! arxiv_api_url = "http://export.arxiv.org/api/query"
//! openlibrary_api_url = "https://openlibrary.org/api/books"
//! trusted_pdf_origin = "https://storage.googleapis.com"
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "BIBRESOLVE";

/// File name looked up in the working directory
const LOCAL_CONFIG_FILE: &str = "bibresolve.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream service locations
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Outbound HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Inbound HTTP endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Base URLs of the services each source talks to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_doi_api_url")]
    pub doi_api_url: String,

    #[serde(default = "default_arxiv_api_url")]
    pub arxiv_api_url: String,

    #[serde(default = "default_openlibrary_api_url")]
    pub openlibrary_api_url: String,

    /// Only URLs starting with this prefix are fetched as hosted PDFs
    #[serde(default = "default_trusted_pdf_origin")]
    pub trusted_pdf_origin: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            doi_api_url: default_doi_api_url(),
            arxiv_api_url: default_arxiv_api_url(),
            openlibrary_api_url: default_openlibrary_api_url(),
            trusted_pdf_origin: default_trusted_pdf_origin(),
        }
    }
}

fn default_doi_api_url() -> String {
    "https://doi.org/api/handles".to_string()
}

fn default_arxiv_api_url() -> String {
    "http://export.arxiv.org/api/query".to_string()
}

fn default_openlibrary_api_url() -> String {
    "https://openlibrary.org/api/books".to_string()
}

fn default_trusted_pdf_origin() -> String {
    "https://storage.googleapis.com".to_string()
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Overrides the default `bibresolve/<version>` user agent
    #[serde(default)]
    pub user_agent: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Serialize to pretty TOML
    pub fn to_toml(&self) -> Result<String, ConfigFileError> {
        toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))
    }

    /// Write the configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

/// `BIBRESOLVE_SERVER__PORT` style overrides
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Load configuration from a file, applying environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    build_config(Some(path), environment())
}

/// Defaults with environment overrides, for when no file exists
pub fn get_config() -> Result<Config, config::ConfigError> {
    build_config(None, environment())
}

fn build_config(
    path: Option<&Path>,
    environment: config::Environment,
) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    builder.add_source(environment).build()?.try_deserialize()
}

/// Find a configuration file in the usual places.
///
/// Looks for `./bibresolve.toml`, then `<config dir>/bibresolve/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    discover_config_file(PathBuf::from(LOCAL_CONFIG_FILE), dirs::config_dir())
}

fn discover_config_file(local: PathBuf, user_config_dir: Option<PathBuf>) -> Option<PathBuf> {
    if local.is_file() {
        return Some(local);
    }

    user_config_dir
        .map(|dir| dir.join("bibresolve").join("config.toml"))
        .filter(|path| path.is_file())
}
