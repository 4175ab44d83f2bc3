use anyhow::{Context, Result};
use regex::RegexBuilder;

use super::resolve_resource;
use crate::config::Config;
use crate::transport::Client;

/// List field name/type pairs for a resource, optionally filtered by a
/// case-insensitive regex on the name.
pub fn execute(
    client: &Client,
    config: &Config,
    resource_name: &str,
    pattern: Option<&str>,
) -> Result<()> {
    let matcher = pattern
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .with_context(|| format!("Invalid pattern '{}'", p))
        })
        .transpose()?;

    let resource = resolve_resource(client, config, resource_name)?;
    let mut fields = client.fields(&resource.name)?;

    if let Some(matcher) = &matcher {
        fields.retain(|field| matcher.is_match(&field.name));
    }

    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}
