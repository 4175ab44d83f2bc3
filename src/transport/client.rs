//! Blocking RESO Web API client.
//!
//! Owns the HTTP connection, the authenticator, and the on-disk metadata
//! cache. Resource discovery goes through the DataSystem service document;
//! field schemas come from the cached $metadata EDMX.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use super::auth::Authenticator;
use super::error::{Error, Result};
use super::metadata::{self, Property};
use super::query::Query;
use crate::config::AuthConfig;

/// Connection settings for a RESO Web API endpoint.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Base URL of the OData service
    pub endpoint: String,
    /// OAuth2 client-credentials settings
    pub authentication: AuthConfig,
    /// Where the $metadata document is cached on disk
    pub md_file: PathBuf,
    /// Route query execution through `{resource}/replication`
    pub use_replication_endpoint: bool,
}

/// A queryable entity set on the MLS.
#[derive(Debug, Clone)]
pub struct Resource {
    pub name: String,
    /// Absolute URL of the entity set
    pub url: String,
    /// Localization key → absolute URL of the localized entity set
    pub localizations: IndexMap<String, String>,
}

impl Resource {
    /// The localized variant of this resource, if `key` names one.
    pub fn localization(&self, key: &str) -> Option<Resource> {
        self.localizations.get(key).map(|url| Resource {
            name: self.name.clone(),
            url: url.clone(),
            localizations: IndexMap::new(),
        })
    }
}

pub struct Client {
    settings: ClientSettings,
    auth: Authenticator,
    http: reqwest::blocking::Client,
}

impl Client {
    /// Build a client, creating the metadata cache directory if needed.
    pub fn new(settings: ClientSettings) -> Result<Self> {
        if let Some(dir) = settings.md_file.parent() {
            fs::create_dir_all(dir)?;
        }

        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("reso-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()?;
        let auth = Authenticator::new(settings.authentication.clone());

        Ok(Self {
            settings,
            auth,
            http,
        })
    }

    fn endpoint(&self) -> &str {
        self.settings.endpoint.trim_end_matches('/')
    }

    pub(crate) fn use_replication_endpoint(&self) -> bool {
        self.settings.use_replication_endpoint
    }

    /// Authenticated GET returning the raw response.
    fn request(
        &self,
        url: &str,
        accept: &str,
        pairs: &[(String, String)],
    ) -> Result<reqwest::blocking::Response> {
        let authorization = self.auth.authorization(&self.http)?;
        debug!("GET {}", url);

        let mut request = self
            .http
            .get(url)
            .header("Authorization", authorization)
            .header("Accept", accept);
        if !pairs.is_empty() {
            request = request.query(pairs);
        }

        Ok(request.send()?)
    }

    /// Authenticated GET that expects a JSON body.
    pub fn get_json(&self, url: &str, pairs: &[(String, String)]) -> Result<serde_json::Value> {
        let response = self.request(url, "application/json", pairs)?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(Error::from_status(status.as_u16(), odata_message(&body)));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Resource catalog from the DataSystem service document.
    pub fn resources(&self) -> Result<IndexMap<String, Resource>> {
        let url = format!("{}/DataSystem", self.endpoint());
        let body = self.get_json(&url, &[])?;
        parse_datasystem(body, self.endpoint())
    }

    /// Field schema for a resource, from the cached $metadata document.
    pub fn fields(&self, resource_name: &str) -> Result<Vec<Property>> {
        let document = self.metadata_document()?;
        let schema = metadata::parse(&document)?;
        schema.get(resource_name).cloned().ok_or_else(|| {
            Error::Metadata(format!("no entity type '{}' in metadata", resource_name))
        })
    }

    /// A fresh query over `resource`. Transforms are lazy; nothing executes
    /// until `results()` or `count()`.
    pub fn query<'a>(&'a self, resource: &Resource) -> Query<'a> {
        Query::new(self, resource.url.clone())
    }

    /// Raw $metadata XML, read from the on-disk cache or fetched once.
    fn metadata_document(&self) -> Result<String> {
        if self.settings.md_file.exists() {
            debug!("metadata cache hit: {}", self.settings.md_file.display());
            return Ok(fs::read_to_string(&self.settings.md_file)?);
        }

        let url = format!("{}/$metadata", self.endpoint());
        let response = self.request(&url, "application/xml", &[])?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(Error::from_status(status.as_u16(), odata_message(&body)));
        }

        fs::write(&self.settings.md_file, &body)?;
        Ok(body)
    }
}

// -- DataSystem document --

#[derive(Deserialize)]
struct DataSystemDocument {
    #[serde(default, rename = "value")]
    value: Vec<DataSystemEntry>,
    #[serde(default, rename = "Resources")]
    resources: Vec<ResourceEntry>,
}

#[derive(Deserialize)]
struct DataSystemEntry {
    #[serde(default, rename = "Resources")]
    resources: Vec<ResourceEntry>,
}

#[derive(Deserialize)]
struct ResourceEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "ResourcePath")]
    resource_path: Option<String>,
    #[serde(default, rename = "Localizations")]
    localizations: Vec<LocalizationEntry>,
}

#[derive(Deserialize)]
struct LocalizationEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "ResourcePath")]
    resource_path: Option<String>,
}

/// Interpret a DataSystem document (either `{"value":[{"Resources":[..]}]}`
/// or a bare `{"Resources":[..]}`) into the resource catalog.
fn parse_datasystem(
    body: serde_json::Value,
    endpoint: &str,
) -> Result<IndexMap<String, Resource>> {
    let document: DataSystemDocument = serde_json::from_value(body)?;

    let entries = if !document.resources.is_empty() {
        document.resources
    } else {
        document
            .value
            .into_iter()
            .flat_map(|entry| entry.resources)
            .collect()
    };

    let mut resources = IndexMap::new();
    for entry in entries {
        let url = resource_url(endpoint, entry.resource_path.as_deref(), &entry.name);

        let mut localizations = IndexMap::new();
        for localization in entry.localizations {
            let url = resource_url(endpoint, localization.resource_path.as_deref(), &localization.name);
            localizations.insert(localization.name, url);
        }

        resources.insert(
            entry.name.clone(),
            Resource {
                name: entry.name,
                url,
                localizations,
            },
        );
    }

    Ok(resources)
}

fn resource_url(endpoint: &str, path: Option<&str>, name: &str) -> String {
    match path {
        Some(path) => format!("{}/{}", endpoint, path.trim_start_matches('/')),
        None => format!("{}/{}", endpoint, name),
    }
}

/// Extract the OData error message from a response body, falling back to the
/// raw body (truncated) when it is not the standard error envelope.
fn odata_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = json.pointer("/error/message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "request rejected".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
