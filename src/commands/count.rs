use anyhow::{bail, Result};

use super::resolve_resource;
use crate::config::Config;
use crate::options::QueryOptions;
use crate::query::build_query;
use crate::transport::Client;

/// Build and execute a count-only query; print compact single-line JSON.
pub fn execute(client: &Client, config: &Config, args: &[String]) -> Result<()> {
    let options = QueryOptions::parse(args)?;
    let Some(resource_name) = options.resource.clone() else {
        bail!("Usage: reso-cli count RESOURCE [options]");
    };

    let resource = resolve_resource(client, config, &resource_name)?;
    let query = build_query(client.query(&resource), &options);

    let total = query.count()?;
    println!("{}", serde_json::json!({ "count": total }));
    Ok(())
}
