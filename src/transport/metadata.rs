//! EDMX ($metadata) parsing.
//!
//! The service's $metadata document is an EDMX XML envelope describing entity
//! types and their properties. Only names and EDM data types are extracted;
//! annotations, navigation properties, and enum definitions are ignored.

use indexmap::IndexMap;
use serde::Serialize;

use super::error::{Error, Result};

/// A field on an entity type: name plus EDM data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// Parse an EDMX document into entity-type name → properties.
pub fn parse(xml: &str) -> Result<IndexMap<String, Vec<Property>>> {
    let document = roxmltree::Document::parse(xml)?;
    let mut schema = IndexMap::new();

    for node in document
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "EntityType")
    {
        let Some(name) = node.attribute("Name") else {
            continue;
        };

        let properties = node
            .children()
            .filter(|child| child.is_element() && child.tag_name().name() == "Property")
            .filter_map(|child| {
                let name = child.attribute("Name")?;
                Some(Property {
                    name: name.to_string(),
                    data_type: child.attribute("Type").unwrap_or("Edm.String").to_string(),
                })
            })
            .collect();

        schema.insert(name.to_string(), properties);
    }

    if schema.is_empty() {
        return Err(Error::Metadata("no entity types found".to_string()));
    }

    Ok(schema)
}
