//! RESO Web API transport.
//!
//! Blocking OData client: OAuth2 client-credentials auth, DataSystem resource
//! discovery, disk-cached $metadata schema, and a lazy query builder. Nothing
//! here touches the network until a query executes.

pub mod auth;
pub mod client;
pub mod error;
pub mod metadata;
pub mod query;

pub use client::{Client, ClientSettings, Resource};
pub use error::Error;
pub use metadata::Property;
pub use query::{FilterValue, Page, Query, SortDirection};
