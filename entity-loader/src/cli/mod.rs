//! Command-line interface

pub mod handler;

use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

use crate::config::{DEFAULT_CONFIG_PATH, DEFAULT_OUTPUT_DIR};

#[derive(Parser, Debug)]
#[command(
    name = "entity-loader",
    version,
    about = "Load entity types, entities, mappings and user roles from a spreadsheet"
)]
pub struct Cli {
    /// Entity management workbook (.xlsx)
    #[arg(long = "EntityFile", value_name = "PATH", value_parser = parse_entity_file)]
    pub entity_file: PathBuf,

    /// Environment section of the configuration file to run against
    #[arg(long = "env", value_name = "NAME")]
    pub env: String,

    /// Configuration file holding the environment sections
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Directory the per-sheet CSV files are written to
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Request timeout in seconds (overrides timeout_secs from the environment)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Accept only paths ending in `.xlsx` (any case)
fn parse_entity_file(value: &str) -> Result<PathBuf, String> {
    let path = Path::new(value);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Ok(path.to_path_buf()),
        _ => Err(format!("File must have a .xlsx extension: {}", value)),
    }
}
