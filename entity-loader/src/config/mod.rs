//! Deployment configuration
//!
//! Environments are top-level tables of a TOML file. Only the table named on
//! the command line is deserialized, so an unrelated, half-filled environment
//! never blocks a run against a complete one.

pub mod environment;

pub use environment::{EnvironmentConfig, load_environment};

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "common_config/config.toml";

/// Default working directory for the per-sheet CSV files
pub const DEFAULT_OUTPUT_DIR: &str = "EntityManagementCSV";

/// Header written to `mapping.csv` unless the environment overrides it.
/// The misspelt first column is what the mapping endpoint expects.
pub const DEFAULT_MAPPING_HEADER: [&str; 2] = ["parentEntiyId", "childEntityId"];

/// Everything a run needs, resolved once from CLI arguments and the config file
/// and then shared read-only with every pipeline stage.
#[derive(Clone)]
pub struct RunConfig {
    pub environment_name: String,
    pub environment: EnvironmentConfig,
    pub workbook: PathBuf,
    pub output_dir: PathBuf,
    pub timeout: Option<Duration>,
    pub mapping_header: [String; 2],
}

impl RunConfig {
    pub fn new(
        environment_name: impl Into<String>,
        environment: EnvironmentConfig,
        workbook: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        timeout_override: Option<u64>,
    ) -> Self {
        let timeout = timeout_override
            .or(environment.timeout_secs)
            .map(Duration::from_secs);

        let mapping_header = environment
            .mapping_header
            .clone()
            .unwrap_or_else(|| DEFAULT_MAPPING_HEADER.map(String::from));

        Self {
            environment_name: environment_name.into(),
            environment,
            workbook: workbook.into(),
            output_dir: output_dir.into(),
            timeout,
            mapping_header,
        }
    }

    /// Path of the generated parent/child mapping file
    pub fn mapping_csv_path(&self) -> PathBuf {
        self.output_dir.join("mapping.csv")
    }

    pub fn workbook(&self) -> &Path {
        &self.workbook
    }
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("environment_name", &self.environment_name)
            .field("workbook", &self.workbook)
            .field("output_dir", &self.output_dir)
            .field("timeout", &self.timeout)
            .field("mapping_header", &self.mapping_header)
            .finish_non_exhaustive()
    }
}
