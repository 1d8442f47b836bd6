//! Shared types, config, logging, and error definitions for the sports mapper.

pub mod config;
pub mod error;
pub mod log;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, UnresolvedId};
pub use log::{LogSink, TracingSink};
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
