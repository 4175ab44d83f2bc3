use anyhow::Result;
use serde_json::json;

use crate::transport::Client;

/// List every resource, with localization choices where the resource has any.
pub fn execute(client: &Client) -> Result<()> {
    let catalog = client.resources()?;

    let output: Vec<_> = catalog
        .values()
        .map(|resource| {
            let mut entry = json!({ "name": resource.name });
            if !resource.localizations.is_empty() {
                entry["localizations"] =
                    json!(resource.localizations.keys().collect::<Vec<_>>());
            }
            entry
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
