//! Configuration - endpoint, credentials and HTTP settings
//!
//! Loaded from a TOML file. The secret key should come from the
//! `MWS_SECRET_KEY` environment variable (a `.env` file is honoured) rather
//! than the file itself.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::{Error, Result};
use crate::request::MwsRequest;
use crate::signer::SigningContext;

pub const SECRET_KEY_ENV: &str = "MWS_SECRET_KEY";
pub const SIGNATURE_METHOD: &str = "HmacSHA256";
pub const SIGNATURE_VERSION: &str = "2";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub endpoint: EndpointConfig,

    pub credentials: Credentials,

    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// e.g. `mws.amazonservices.com`
    pub host: String,

    /// e.g. `/Orders/2013-09-01`
    pub path: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub access_key_id: String,

    pub seller_id: String,

    /// Only needed when acting on behalf of another seller
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Falls back to `MWS_SECRET_KEY` when absent
    #[serde(default, skip_serializing)]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("seller_id", &self.seller_id)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "** redacted **"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

impl Credentials {
    /// Adds the parameters every MWS call carries besides `Timestamp` and
    /// `Signature`.
    pub fn apply(&self, request: &mut MwsRequest) {
        request.augment([
            ("AWSAccessKeyId", self.access_key_id.as_str()),
            ("SellerId", self.seller_id.as_str()),
            ("SignatureMethod", SIGNATURE_METHOD),
            ("SignatureVersion", SIGNATURE_VERSION),
        ]);
        if let Some(token) = &self.auth_token {
            request.set("MWSAuthToken", token.as_str());
        }
    }

    /// The configured secret, else `MWS_SECRET_KEY`. Empty values count as missing.
    pub fn resolve_secret(&self) -> Result<String> {
        self.secret_key
            .clone()
            .or_else(|| std::env::var(SECRET_KEY_ENV).ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "No secret key: set credentials.secret_key or {}",
                    SECRET_KEY_ENV
                ))
            })
    }
}

impl Config {
    /// Load from TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config {}: {}", path.display(), e)))?;

        content.parse()
    }

    /// Validated signing context for the configured endpoint
    pub fn signing_context(&self) -> Result<SigningContext> {
        let secret = self.credentials.resolve_secret()?;
        SigningContext::new(&self.endpoint.host, &self.endpoint.path, secret)
    }
}

impl std::str::FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }
}
