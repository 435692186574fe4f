//! Error types for the fallible edges of the core
//!
//! Only asset and configuration loading can fail. Gameplay conditions such as
//! a full projectile cap or an empty grid cell are ordinary branches.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A level description could not be read
    #[error("failed to read level {path:?}")]
    Level {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A config file could not be read or written
    #[error("failed to access config {path:?}")]
    Config {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A config file was not valid JSON for `SimConfig`
    #[error("malformed config: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
