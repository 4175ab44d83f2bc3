//! Filesystem layout for reso-cli.
//!
//! This module defines WHERE data lives. It has no I/O, no validation,
//! no business logic.
//!
//! ```text
//! ~/.config/reso-cli/
//! └── config.toml          # Endpoint, credentials, localizations
//!
//! ~/.cache/reso-cli/
//! └── metadata.xml         # Cached OData $metadata (rebuildable)
//! ```

use std::path::PathBuf;

/// Config directory: `~/.config/reso-cli/`
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reso-cli")
}

/// Config file: `~/.config/reso-cli/config.toml`
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Cache directory for rebuildable data: `~/.cache/reso-cli/`
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reso-cli")
}

/// Cached OData metadata document: `~/.cache/reso-cli/metadata.xml`
pub fn metadata_path() -> PathBuf {
    cache_dir().join("metadata.xml")
}
