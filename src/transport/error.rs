//! Transport error taxonomy.

use thiserror::Error;

/// Errors surfaced by the transport layer.
#[derive(Debug, Error)]
pub enum Error {
    /// The server rejected our credentials (401/403).
    #[error("access denied ({status}): {message}")]
    AccessDenied { status: u16, message: String },

    /// Any other non-success response.
    #[error("request failed ({status}): {message}")]
    Request { status: u16, message: String },

    /// The $metadata document could not be interpreted.
    #[error("invalid metadata document: {0}")]
    Metadata(String),

    /// A success response missing the expected OData payload shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid metadata XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

impl Error {
    /// Classify a non-success HTTP status.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Error::AccessDenied { status, message },
            _ => Error::Request { status, message },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
