//! File logging for the `focus` binary.
//!
//! The library only talks to the `log` facade; this module wires the facade
//! to rotating files under `<data>/logs/`. Initialization happens at most
//! once per process and a failure never stops the program.

use std::path::{Path, PathBuf};

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use once_cell::sync::OnceCell;

/// Overrides the configured level, e.g. `FOCUSSPACE_LOG=debug`
pub const LOG_ENV: &str = "FOCUSSPACE_LOG";

const LOG_FILE_BASENAME: &str = "focus";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 2 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    _logger: LoggerHandle,
}

pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

/// Start file logging at `spec` (a flexi_logger spec such as `"info"` or
/// `"focusspace=debug"`). Repeated calls after a success are no-ops.
pub fn init_logging(spec: &str, data_dir: &Path) -> Result<(), String> {
    if LOGGING_STATE.get().is_some() {
        return Ok(());
    }
    let dir = log_dir(data_dir);
    LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, String> {
        std::fs::create_dir_all(&dir).map_err(|err| {
            format!("failed to create log directory `{}`: {err}", dir.display())
        })?;
        let logger = Logger::try_with_str(spec)
            .map_err(|err| format!("invalid log level `{spec}`: {err}"))?
            .log_to_file(
                FileSpec::default()
                    .directory(dir.as_path())
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::Direct)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))?;

        log::info!(
            "event=start version={} log_dir={}",
            env!("CARGO_PKG_VERSION"),
            dir.display()
        );
        Ok(LoggingState {
            _logger: logger,
        })
    })?;
    Ok(())
}

/// The level spec to use: the environment override when set, otherwise the
/// configured one.
pub fn effective_spec(configured: &str, env_override: Option<String>) -> String {
    env_override
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| configured.trim().to_string())
}
