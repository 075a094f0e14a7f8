//! Configuration for zonequery
//!
//! - `root`: top-level configuration file
//! - `query`: query defaults (timeout, retries, EDNS buffer, concurrency)
//! - `logging`: logging settings
//! - `errors`: configuration errors

pub mod errors;
pub mod logging;
pub mod query;
pub mod root;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use query::QueryConfig;
pub use root::Config;
