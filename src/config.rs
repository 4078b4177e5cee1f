use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::Parser;

pub const DEFAULT_DATA_PATH: &str = "data/crime_data_merged.csv";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8050;

/// Command-line options, each with an environment fallback.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Crime table to load (.csv, .json or .parquet)
    #[arg(short, long, value_name = "FILE", env = "CRIME_DASHBOARD_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Interface to listen on
    #[arg(long, env = "CRIME_DASHBOARD_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "CRIME_DASHBOARD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// HTTP worker threads
    #[arg(short, long, default_value_t = 1)]
    pub workers: usize,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.port != 0, "port must be non-zero");
        ensure!(self.workers >= 1, "at least one worker is required");
        ensure!(!self.host.trim().is_empty(), "host must not be empty");
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
