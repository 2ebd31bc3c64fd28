use crate::storage::DEFAULT_DATA_FILE;
use clap::Parser;
use std::{path::PathBuf, time::Duration};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Todo list, stopwatch and notes in one terminal app")]
pub struct Args {
    /// JSON file holding todos and notes
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// trace, debug, info, warn or error
    #[arg(long, default_value = "info", value_parser = parse_level)]
    pub log_level: String,

    /// Directory for log files
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Timer refresh period in milliseconds
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_millis: u64,
}

impl Args {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

pub fn parse_level(level: &str) -> Result<String, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace".to_string()),
        "debug" => Ok("debug".to_string()),
        "info" => Ok("info".to_string()),
        "warn" | "warning" => Ok("warn".to_string()),
        "error" => Ok("error".to_string()),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}
