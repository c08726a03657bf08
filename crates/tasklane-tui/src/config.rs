use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

#[derive(Debug, Parser)]
#[command(name = "tasklane", about = "Terminal client for a tasklane todo server")]
pub struct Config {
    /// Base URL of the API server
    #[arg(long, env = "TASKLANE_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Where the session token is kept. Defaults to ~/.tasklane
    #[arg(long, env = "TASKLANE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log file. Defaults to <data-dir>/tasklane.log
    #[arg(long, env = "TASKLANE_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Route to open on startup
    #[arg(long, default_value = "/")]
    pub route: String,
}

impl Config {
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".tasklane"),
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir().join("tasklane.log"))
    }
}
