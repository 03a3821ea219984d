// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub ledger: LedgerConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// `info`, `warn` or `error`; below `info` only errors and warnings are written
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

/// Ledger backend selection
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LedgerBackend {
    /// HTTP gateway in front of the peer network
    Gateway,
    /// In-process development ledger
    Memory,
}

/// Ledger connection configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LedgerConfig {
    pub backend: LedgerBackend,
    pub channel: String,
    pub contract: String,
    /// Connection profile JSON describing peers and TLS roots
    pub connection_profile: String,
    /// Directory holding `<role>.id` identity files
    pub wallet_path: String,
    /// REST gateway in front of the peers; required by the gateway backend
    #[serde(default)]
    pub gateway_url: Option<String>,
    /// Forwarded to the gateway with every call
    pub discovery_enabled: bool,
    pub as_localhost: bool,
    /// Per-call timeout for remote requests (none by default)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Released sessions kept per role; 0 connects on every request
    pub max_idle_sessions_per_role: usize,
    /// Identities known to the memory backend
    #[serde(default = "default_memory_identities")]
    pub memory_identities: Vec<String>,
}

fn default_memory_identities() -> Vec<String> {
    ["admin", "user", "auditor"]
        .iter()
        .map(ToString::to_string)
        .collect()
}
