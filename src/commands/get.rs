use anyhow::Result;

use super::resolve_resource;
use crate::config::Config;
use crate::transport::Client;

/// Fetch one record by primary key via a direct resource-URL read, bypassing
/// the query builder.
pub fn execute(
    client: &Client,
    config: &Config,
    resource_name: &str,
    key: &str,
    select: Option<&str>,
) -> Result<()> {
    let resource = resolve_resource(client, config, resource_name)?;

    let url = format!("{}('{}')", resource.url, key);
    let mut pairs = Vec::new();
    if let Some(select) = select {
        pairs.push(("$select".to_string(), select.to_string()));
    }

    let record = client.get_json(&url, &pairs)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
