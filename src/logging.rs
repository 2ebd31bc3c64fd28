//! File logging bootstrap.
//!
//! The terminal belongs to the UI, so log records go to a rotating file.

use crate::error::{DaybookError, Result};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use std::path::Path;

const LOG_FILE_BASENAME: &str = "daybook";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

/// Starts the file logger. Keep the returned handle alive for as long as
/// records should be written.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<LoggerHandle> {
    std::fs::create_dir_all(log_dir)?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| DaybookError::Logging(format!("invalid log level `{level}`: {err}")))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| DaybookError::Logging(format!("failed to start logger: {err}")))?;

    info!(
        "event=app_start status=ok platform={} version={} level={} log_dir={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir.display()
    );
    Ok(handle)
}
