pub mod commands;
pub mod config;
pub mod options;
pub mod paths;
pub mod query;
pub mod transport;

// Re-export commonly used types
pub use config::Config;
pub use options::QueryOptions;
pub use transport::Client;
