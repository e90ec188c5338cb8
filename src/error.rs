use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the collaborators around the index.
///
/// The index itself never fails: duplicates are dropped and absent keys are
/// reported as `None`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = core::result::Result<T, Error>;
