//! Mint client configuration
//!
//! Everything the client needs to know about the outside world:
//! - Which collection contract to mint from
//! - Where the wallet provider listens
//! - Which chain is expected and where minted assets are displayed
//!
//! Loaded once at startup and shared read-only as `Arc<Config>`.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable overriding [`Config::contract_address`].
pub const CONTRACT_ADDRESS_ENV: &str = "MINT_CONTRACT_ADDRESS";

/// Environment variable overriding [`Config::wallet_provider`].
pub const WALLET_PROVIDER_ENV: &str = "MINT_WALLET_PROVIDER";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address of the deployed collection contract (0x-prefixed hex).
    #[serde(default)]
    pub contract_address: String,

    /// JSON-RPC endpoint of the wallet provider (e.g. "http://127.0.0.1:1248").
    /// No endpoint means no provider is present.
    #[serde(default)]
    pub wallet_provider: Option<String>,

    /// WebSocket endpoint used for event subscriptions.
    /// Derived from `wallet_provider` if not set.
    #[serde(default)]
    pub wallet_ws: Option<String>,

    /// Hex chain id the contract is deployed on. Rinkeby by default.
    #[serde(default = "default_expected_chain_id")]
    pub expected_chain_id: String,

    /// Marketplace asset page prefix; links are `{asset_base_url}/{contract}/{token_id}`.
    #[serde(default = "default_asset_base_url")]
    pub asset_base_url: String,

    /// Marketplace page of the whole collection.
    #[serde(default = "default_collection_url")]
    pub collection_url: String,

    /// Block explorer transaction page prefix.
    #[serde(default = "default_explorer_tx_url")]
    pub explorer_tx_url: String,

    /// Social handle shown in the footer.
    #[serde(default = "default_social_handle")]
    pub social_handle: String,

    /// Interval between transaction receipt polls while waiting for a mint to be mined.
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
}

fn default_expected_chain_id() -> String {
    "0x4".to_string()
}

fn default_asset_base_url() -> String {
    "https://testnets.opensea.io/assets".to_string()
}

fn default_collection_url() -> String {
    "https://testnets.opensea.io/collection/squarenft-om7oooqhyo".to_string()
}

fn default_explorer_tx_url() -> String {
    "https://rinkeby.etherscan.io/tx".to_string()
}

fn default_social_handle() -> String {
    "lazeh4ng".to_string()
}

fn default_receipt_poll_ms() -> u64 {
    1_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            contract_address: String::new(),
            wallet_provider: None,
            wallet_ws: None,
            expected_chain_id: default_expected_chain_id(),
            asset_base_url: default_asset_base_url(),
            collection_url: default_collection_url(),
            explorer_tx_url: default_explorer_tx_url(),
            social_handle: default_social_handle(),
            receipt_poll_ms: default_receipt_poll_ms(),
        }
    }
}

impl Config {
    /// Load configuration from disk and apply environment overrides.
    ///
    /// Writes a default config file on first run.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            log::info!("📁 Loading config from: {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            toml::from_str(&contents)?
        } else {
            log::info!("📝 Creating default config");
            let config = Config::default();
            config.save()?;
            config
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        log::info!(
            "✅ Config loaded: contract={}, provider={}",
            if config.contract_address.is_empty() {
                "<unset>"
            } else {
                config.contract_address.as_str()
            },
            config.wallet_provider.as_deref().unwrap_or("<none>")
        );
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;
        log::info!("💾 Config saved to: {}", config_path.display());
        Ok(())
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup(CONTRACT_ADDRESS_ENV).filter(|v| !v.trim().is_empty()) {
            self.contract_address = address.trim().to_string();
        }
        if let Some(endpoint) = lookup(WALLET_PROVIDER_ENV).filter(|v| !v.trim().is_empty()) {
            self.wallet_provider = Some(endpoint.trim().to_string());
        }
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = Self::data_dir()?;
        path.push("config.toml");
        Ok(path)
    }

    /// Get base data directory
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        path.push(".mintgui");
        Ok(path)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.contract()?;

        if let Some(ref endpoint) = self.wallet_provider {
            if !is_http(endpoint) {
                return Err(ConfigError::InvalidEndpoint(endpoint.clone()));
            }
        }
        if let Some(ref ws) = self.wallet_ws {
            if !(ws.starts_with("ws://") || ws.starts_with("wss://")) {
                return Err(ConfigError::InvalidEndpoint(ws.clone()));
            }
        }
        for url in [
            &self.asset_base_url,
            &self.collection_url,
            &self.explorer_tx_url,
        ] {
            if !is_http(url) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if !self.expected_chain_id.starts_with("0x") {
            return Err(ConfigError::InvalidChainId(self.expected_chain_id.clone()));
        }
        Ok(())
    }

    /// Parsed contract address.
    pub fn contract(&self) -> Result<Address, ConfigError> {
        if self.contract_address.is_empty() {
            return Err(ConfigError::MissingContractAddress);
        }
        Address::from_str(&self.contract_address)
            .map_err(|_| ConfigError::InvalidContractAddress(self.contract_address.clone()))
    }

    /// WebSocket URL for subscriptions, explicit or derived from the provider endpoint.
    ///
    /// Wallet providers serve HTTP and WebSocket on the same port, so only the
    /// scheme changes: `http://127.0.0.1:1248` → `ws://127.0.0.1:1248`.
    pub fn subscription_url(&self) -> Option<String> {
        if let Some(ref ws) = self.wallet_ws {
            return Some(ws.clone());
        }
        self.wallet_provider.as_ref().map(|endpoint| {
            endpoint
                .replacen("https://", "wss://", 1)
                .replacen("http://", "ws://", 1)
        })
    }

    /// Marketplace link of a minted token.
    pub fn asset_url(&self, token_id: &U256) -> String {
        format!(
            "{}/{}/{}",
            self.asset_base_url.trim_end_matches('/'),
            self.contract_address,
            token_id
        )
    }

    /// Block explorer link of a transaction.
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/{}", self.explorer_tx_url.trim_end_matches('/'), tx_hash)
    }

    pub fn social_url(&self) -> String {
        format!("https://twitter.com/{}", self.social_handle)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms.max(1))
    }

    /// Whether `chain_id` is the expected network. Hex ids compare case-insensitively.
    pub fn is_expected_chain(&self, chain_id: &str) -> bool {
        normalize_chain_id(chain_id) == normalize_chain_id(&self.expected_chain_id)
    }
}

fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn normalize_chain_id(chain_id: &str) -> String {
    let hex = chain_id.trim().trim_start_matches("0x").trim_start_matches("0X");
    let trimmed = hex.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Home directory not found")]
    NoHomeDir,

    #[error("Contract address not configured (set MINT_CONTRACT_ADDRESS)")]
    MissingContractAddress,

    #[error("Invalid contract address: {0}")]
    InvalidContractAddress(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid URL: {0} (must start with http:// or https://)")]
    InvalidUrl(String),

    #[error("Invalid chain id: {0} (must be 0x-prefixed hex)")]
    InvalidChainId(String),
}
