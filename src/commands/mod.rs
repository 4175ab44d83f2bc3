//! Command handlers. Each handler receives the config and client explicitly;
//! there is no global state.

use anyhow::{anyhow, bail, Result};

use crate::config::Config;
use crate::paths;
use crate::transport::{Client, Resource};

pub mod count;
pub mod fields;
pub mod get;
pub mod resources;
pub mod search;

/// Look up a resource by name, applying the configured localization when the
/// resource requires one.
pub fn resolve_resource(client: &Client, config: &Config, name: &str) -> Result<Resource> {
    let catalog = client.resources()?;
    let Some(resource) = catalog.get(name) else {
        let available = catalog.keys().cloned().collect::<Vec<_>>().join(", ");
        bail!("Resource '{}' not found. Available: {}", name, available);
    };

    if resource.localizations.is_empty() {
        return Ok(resource.clone());
    }

    match config.localization_for(name) {
        Some(key) => resource.localization(key).ok_or_else(|| {
            anyhow!(
                "Localization '{}' not found for resource '{}'. Available: {}",
                key,
                name,
                localization_names(resource)
            )
        }),
        None => bail!(
            "Resource '{}' requires a localization.\nAvailable: {}\nSet in {}:\n  [localizations]\n  {} = \"<choice>\"",
            name,
            localization_names(resource),
            paths::config_path().display(),
            name
        ),
    }
}

fn localization_names(resource: &Resource) -> String {
    resource
        .localizations
        .keys()
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}
