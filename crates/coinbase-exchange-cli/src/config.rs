/*
[INPUT]:  YAML configuration file and CB_ACCESS_* environment variables
[OUTPUT]: Credentials plus REST and feed configuration
[POS]:    Configuration layer - CLI setup
[UPDATE]: When adding new configuration options
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use coinbase_exchange::{ClientConfig, Credentials, FeedConfig};

pub const ENV_ACCESS_KEY: &str = "CB_ACCESS_KEY";
pub const ENV_ACCESS_SECRET: &str = "CB_ACCESS_SECRET";
pub const ENV_ACCESS_PASSPHRASE: &str = "CB_ACCESS_PASSPHRASE";

/// Top-level CLI configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExchangeConfig {
    /// API credentials; public endpoints work without them
    #[serde(default)]
    pub credentials: Option<CredentialsConfig>,
    /// REST endpoint override
    #[serde(default)]
    pub api_url: Option<String>,
    /// Feed endpoint override
    #[serde(default)]
    pub ws_url: Option<String>,
    /// Default product (e.g., "BTC-USD")
    #[serde(default)]
    pub product_id: Option<String>,
}

/// API key material as issued by the exchange
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialsConfig {
    pub api_key: String,
    /// Base64 encoded
    pub api_secret: String,
    pub passphrase: String,
}

impl ExchangeConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `CB_ACCESS_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source; set variables win over the file
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let key = lookup(ENV_ACCESS_KEY);
        let secret = lookup(ENV_ACCESS_SECRET);
        let passphrase = lookup(ENV_ACCESS_PASSPHRASE);
        if key.is_none() && secret.is_none() && passphrase.is_none() {
            return self;
        }

        let credentials = self.credentials.get_or_insert_with(CredentialsConfig::default);
        if let Some(key) = key {
            credentials.api_key = key;
        }
        if let Some(secret) = secret {
            credentials.api_secret = secret;
        }
        if let Some(passphrase) = passphrase {
            credentials.passphrase = passphrase;
        }
        self
    }

    /// Validated credentials, or anonymous ones when none are configured
    pub fn credentials(&self) -> Result<Credentials> {
        match &self.credentials {
            Some(creds) => Credentials::new(&creds.api_key, &creds.api_secret, &creds.passphrase)
                .context("invalid credentials"),
            None => Ok(Credentials::anonymous()),
        }
    }

    pub fn client_config(&self, sandbox: bool) -> ClientConfig {
        let mut config = if sandbox {
            ClientConfig::sandbox()
        } else {
            ClientConfig::default()
        };
        if let Some(api_url) = &self.api_url {
            config.base_url = api_url.clone();
        }
        if let Some(product_id) = &self.product_id {
            config.default_product = product_id.clone();
        }
        config
    }

    pub fn feed_config(&self, sandbox: bool) -> FeedConfig {
        let mut config = if sandbox {
            FeedConfig::sandbox()
        } else {
            FeedConfig::default()
        };
        if let Some(ws_url) = &self.ws_url {
            config.ws_url = ws_url.clone();
        }
        if let Some(product_id) = &self.product_id {
            config.product_id = product_id.clone();
        }
        config
    }
}
