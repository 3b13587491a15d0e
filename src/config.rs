use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for PitchDesk
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PitchdeskConfig {
    /// Document storage (relocation target)
    pub storage: StorageConfig,
    /// On-chain wallet verification
    pub wallet: WalletConfig,
    /// Submission notification sink
    pub notify: NotifyConfig,
    /// Terminal record persistence
    pub store: StoreConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Upload endpoint of the document store
    pub upload_url: String,
    /// Bearer token (can be set via env var)
    pub token: Option<String>,
    /// Folder the uploads land in
    pub folder_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// JSON-RPC endpoint of the chain node
    pub rpc_url: String,
    /// Token contract queried with balanceOf
    pub token_address: String,
    /// Fixed token decimals applied before comparison
    pub decimals: u32,
    /// Minimum balance in whole tokens
    pub min_tokens: u64,
    /// Token symbol used in prompts and notices
    pub symbol: String,
    /// Rate limiting towards the RPC node
    pub rate_limit: RateLimitConfig,
    /// Balance cache TTL in seconds
    pub cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests per second limit
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NotifyConfig {
    /// Review channel identifier, when the transport has one
    pub target: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the terminal record file
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of the human format
    pub json_logs: bool,
}

impl Default for PitchdeskConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            wallet: WalletConfig::default(),
            notify: NotifyConfig::default(),
            store: StoreConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_url: "https://files.pitchdesk.example/upload".to_string(),
            token: None, // read from env var
            folder_id: None,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://mainnet.base.org".to_string(),
            token_address: "0x1185cB5122Edad199BdBC0cbd7a0457E448f23c7".to_string(),
            decimals: 18,
            min_tokens: 10,
            symbol: "PITCH".to_string(),
            rate_limit: RateLimitConfig::default(),
            cache_ttl_seconds: 30,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_capacity: 10,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "data/submissions.json".to_string(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl PitchdeskConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. pitchdesk.toml
    /// 3. Environment variables (prefixed with PITCHDESK_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new("pitchdesk.toml").exists() {
            builder = builder.add_source(File::with_name("pitchdesk"));
        }

        builder = builder.add_source(
            Environment::with_prefix("PITCHDESK")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut loaded: PitchdeskConfig = config.try_deserialize()?;

        if loaded.storage.token.is_none() {
            if let Ok(token) = std::env::var("PITCHDESK_STORAGE_TOKEN") {
                loaded.storage.token = Some(token);
            }
        }

        Ok(loaded)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = PitchdeskConfig::default();
        assert_eq!(cfg.wallet.min_tokens, 10);
        assert_eq!(cfg.wallet.decimals, 18);
        assert!(cfg.store.path.ends_with(".json"));
    }
}
