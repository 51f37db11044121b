//! Configuration for the `revolut` command-line tool.
//!
//! The configuration is a JSON file. Secrets may be given as `$VAR` or `${VAR}`
//! references and are then read from the environment (including `.env`):
//!
//! ```json
//! {
//!   "sandbox": true,
//!   "business": {
//!     "client_id": "pOoEBEmp8CwpBDgf3opC7aPnSe9OaSCC",
//!     "issuer": "example.com",
//!     "refresh_token": "$REVOLUT_REFRESH_TOKEN",
//!     "private_key_path": "privatecert.pem"
//!   },
//!   "merchant": {
//!     "api_key": "$REVOLUT_MERCHANT_API_KEY"
//!   }
//! }
//! ```

use revolut_business::ClientIdentity;
use revolut_core::config::LiteralOrEnv;
use revolut_core::{Environment, SigningError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "revolut.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    sandbox: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    business: Option<BusinessConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    merchant: Option<MerchantConfig>,
}

/// Credentials registered for the Business API certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessConfig {
    pub client_id: String,
    /// Domain given as the redirect URI when the certificate was uploaded.
    pub issuer: String,
    pub refresh_token: LiteralOrEnv<String>,
    pub private_key_path: LiteralOrEnv<PathBuf>,
}

impl BusinessConfig {
    pub fn identity(&self) -> Result<ClientIdentity, SigningError> {
        ClientIdentity::from_pem_file(
            self.client_id.as_str(),
            self.issuer.as_str(),
            self.private_key_path.inner(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantConfig {
    pub api_key: LiteralOrEnv<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("No `{0}` section in config file")]
    MissingSection(&'static str),
}

impl Config {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn environment(&self) -> Environment {
        Environment::from_sandbox(self.sandbox)
    }

    pub fn business(&self) -> Result<&BusinessConfig, ConfigError> {
        self.business
            .as_ref()
            .ok_or(ConfigError::MissingSection("business"))
    }

    pub fn merchant(&self) -> Result<&MerchantConfig, ConfigError> {
        self.merchant
            .as_ref()
            .ok_or(ConfigError::MissingSection("merchant"))
    }
}
