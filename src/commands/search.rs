use anyhow::{bail, Result};
use serde_json::json;

use super::resolve_resource;
use crate::config::Config;
use crate::options::QueryOptions;
use crate::query::build_query;
use crate::transport::{Client, Page};

/// Build and execute a query; print count, results, and the pagination link
/// when the server reports one.
pub fn execute(client: &Client, config: &Config, args: &[String]) -> Result<()> {
    let options = QueryOptions::parse(args)?;
    let Some(resource_name) = options.resource.clone() else {
        bail!("Usage: reso-cli search RESOURCE [options]");
    };

    let resource = resolve_resource(client, config, &resource_name)?;
    let query = build_query(client.query(&resource), &options);

    let page = query.results()?;
    println!("{}", serde_json::to_string_pretty(&output_document(page))?);
    Ok(())
}

/// Assemble the printed document. Key order is count, results, then the
/// pagination link; serde_json's preserve_order feature keeps it that way on
/// the wire.
fn output_document(page: Page) -> serde_json::Value {
    let mut output = json!({
        "count": page.records.len(),
        "results": page.records,
    });
    if let Some(next_link) = page.next_link {
        output["next_link"] = json!(next_link);
    }
    output
}
