// Configuration module entry point
// Loads layered configuration and owns the shared application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, HttpConfig, LedgerBackend, LedgerConfig};

/// Environment variables override file values, e.g. `ASSET_API__SERVER__PORT=8080`
const ENV_PREFIX: &str = "ASSET_API";

impl Config {
    /// Load configuration from a file path without extension; a missing file
    /// leaves the defaults in place
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "asset-gateway/0.1")?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", 102_400)? // 100KB
            .set_default("ledger.backend", "gateway")?
            .set_default("ledger.channel", "mychannel")?
            .set_default("ledger.contract", "asset-transfer")?
            .set_default("ledger.connection_profile", "../network/connection-org1.json")?
            .set_default("ledger.wallet_path", "wallet")?
            .set_default("ledger.discovery_enabled", true)?
            .set_default("ledger.as_localhost", true)?
            .set_default("ledger.max_idle_sessions_per_role", 0)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
