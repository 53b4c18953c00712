//! Logger setup
//!
//! Filter spec comes from `KAIRO_LOG`, then `RUST_LOG`, then `warn`. Plain
//! commands log to stderr. The TUI owns the terminal, so it logs to a
//! rotating file in the data directory instead.

use std::path::Path;

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
    detailed_format,
};

pub const LOG_FILE_BASENAME: &str = "kairo";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 5;

const DEFAULT_SPEC: &str = "warn";

/// Where log records go
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

/// Pick the first non-blank spec
fn resolve_spec(kairo_log: Option<String>, rust_log: Option<String>) -> String {
    kairo_log
        .filter(|value| !value.trim().is_empty())
        .or_else(|| rust_log.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_SPEC.to_string())
}

/// Start the global logger; keep the handle alive until exit
pub fn init_logging(target: LogTarget<'_>) -> Result<LoggerHandle, FlexiLoggerError> {
    let spec = resolve_spec(
        std::env::var("KAIRO_LOG").ok(),
        std::env::var("RUST_LOG").ok(),
    );
    let logger = Logger::try_with_str(&spec)?;

    let handle = match target {
        LogTarget::Stderr => logger.log_to_stderr().start()?,
        LogTarget::File(dir) => {
            std::fs::create_dir_all(dir)?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir)
                        .basename(LOG_FILE_BASENAME)
                        .suffix(LOG_FILE_SUFFIX),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .format_for_files(detailed_format)
                .rotate(
                    Criterion::Size(LOG_ROTATE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(LOG_ROTATE_KEEP_FILES),
                )
                .start()?
        }
    };

    log::debug!("logger initialized spec={}", spec);
    Ok(handle)
}
