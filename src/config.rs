//! Configuration loading (config.toml).
//!
//! Format:
//! ```toml
//! endpoint = "https://mls.example.com/RESO/OData"
//! use_replication_endpoint = false
//!
//! [authentication]
//! token_url = "https://mls.example.com/oauth2/token"
//! client_id = "..."
//! client_secret = "..."
//! scope = "api"
//!
//! [localizations]
//! Property = "MIA"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::paths;

/// Configuration for reso-cli.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the RESO Web API service
    pub endpoint: String,
    /// OAuth2 client-credentials settings
    pub authentication: AuthConfig,
    /// Route query execution through the replication endpoint
    #[serde(default)]
    pub use_replication_endpoint: bool,
    /// Resource name → chosen localization key
    #[serde(default)]
    pub localizations: HashMap<String, String>,
}

/// OAuth2 client-credentials settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token endpoint URL
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Optional scope sent with the token request
    #[serde(default)]
    pub scope: Option<String>,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "Config not found at {}.\nCreate it from config.toml.example",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Configured localization choice for a resource, if any.
    pub fn localization_for(&self, resource: &str) -> Option<&str> {
        self.localizations.get(resource).map(String::as_str)
    }
}
