//! OAuth2 client-credentials token management.

use std::time::{Duration, Instant};

use log::debug;
use parking_lot::Mutex;
use serde::Deserialize;

use super::error::{Error, Result};
use crate::config::AuthConfig;

/// Refresh this long before the server-reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

struct CachedToken {
    header_value: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }
}

/// Fetches and caches bearer tokens for the MLS endpoint.
pub struct Authenticator {
    settings: AuthConfig,
    cached: Mutex<Option<CachedToken>>,
}

impl Authenticator {
    pub fn new(settings: AuthConfig) -> Self {
        Self {
            settings,
            cached: Mutex::new(None),
        }
    }

    /// Current `Authorization` header value, fetching a fresh token when the
    /// cached one is missing or about to expire.
    pub fn authorization(&self, http: &reqwest::blocking::Client) -> Result<String> {
        let mut cached = self.cached.lock();

        if let Some(token) = cached.as_ref() {
            if !token.expired() {
                return Ok(token.header_value.clone());
            }
        }

        let token = self.fetch(http)?;
        let header_value = token.header_value.clone();
        *cached = Some(token);
        Ok(header_value)
    }

    fn fetch(&self, http: &reqwest::blocking::Client) -> Result<CachedToken> {
        debug!("requesting access token from {}", self.settings.token_url);

        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
        ];
        if let Some(scope) = &self.settings.scope {
            form.push(("scope", scope.as_str()));
        }

        let response = http.post(&self.settings.token_url).form(&form).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = if body.trim().is_empty() {
                "token request rejected".to_string()
            } else {
                body.trim().to_string()
            };
            return Err(Error::from_status(status.as_u16(), message));
        }

        let body: TokenResponse = response.json()?;
        let expires_at = body
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs).saturating_sub(EXPIRY_MARGIN));

        Ok(CachedToken {
            header_value: format!("{} {}", body.token_type, body.access_token),
            expires_at,
        })
    }
}
