//! API and ledger configuration
//!
//! All process-wide settings are loaded once at startup and passed at
//! construction time; nothing reads configuration ad hoc per call.

use std::time::Duration;

use serde::Deserialize;

use domain_records::GatewayConfig;

/// HTTP server configuration (env prefix `API`)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Ledger gateway configuration (env prefix `LEDGER`)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Wallet directory holding enrolled identities
    pub wallet_path: String,
    /// Connection profile document
    pub profile_path: String,
    /// Wallet alias to authenticate as
    pub identity: String,
    /// Ledger channel name
    pub channel: String,
    /// Deployed contract name
    pub contract: String,
    /// Bound on identity resolution and session acquisition, in seconds
    pub connect_timeout_secs: u64,
    /// Bound on each submit or query round trip, in seconds
    pub request_timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            wallet_path: "wallet".to_string(),
            profile_path: "connection-org1.json".to_string(),
            identity: "appUser".to_string(),
            channel: "mychannel".to_string(),
            contract: "fabcar".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl LedgerConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("LEDGER"))
            .build()?
            .try_deserialize()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Projects the gateway's slice of this configuration
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new(&self.identity, &self.channel, &self.contract)
            .connect_timeout(self.connect_timeout())
            .request_timeout(self.request_timeout())
    }
}
