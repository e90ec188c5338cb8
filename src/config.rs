//! Settings for the command-line driver.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. The TOML file passed with `--config`, if any
//! 3. Command-line flags (applied by the caller)

use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::experiment::{DEFAULT_SEED, DEFAULT_SIZES};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Knowledge-base file: one `term<TAB>tag<TAB>score` record per line.
    pub data_file: PathBuf,
    /// Query file for the benchmark: one term per line.
    pub query_file: PathBuf,
    /// Where the benchmark writes its CSV table.
    pub results_file: PathBuf,
    /// Subset sizes measured by the benchmark.
    pub sizes: Vec<usize>,
    /// Seed for the benchmark's subset sampling.
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("GenericsKB.txt"),
            query_file: PathBuf::from("GenericsKB-queries.txt"),
            results_file: PathBuf::from("results.csv"),
            sizes: DEFAULT_SIZES.to_vec(),
            seed: DEFAULT_SEED,
        }
    }
}

impl Settings {
    /// Loads settings from an optional TOML file, falling back to defaults for
    /// anything the file leaves out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the file is missing or malformed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        debug!(path = %path.display(), "Loading settings");
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
