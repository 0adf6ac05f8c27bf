use std::fs::{self, File, OpenOptions};
use std::io::{self, Error, ErrorKind};
use std::path::Path;

use slog::Drain;
use slog_scope::GlobalLoggerGuard;

use super::log_format::BorgFormat;

/// init_logger installs a global logger writing to `path`.
///
/// Logging stays enabled as long as the returned guard is alive.
pub fn init_logger<P: AsRef<Path>>(path: P) -> io::Result<GlobalLoggerGuard> {
    let file = open_log_file(path)?;

    let decorator = slog_term::PlainDecorator::new(file);
    let drain = BorgFormat::new(decorator).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    let logger = slog::Logger::root(drain, slog::o!());

    let guard = slog_scope::set_global_logger(logger);

    info!("logger ready");
    Ok(guard)
}

/// init_term_logger installs a global logger writing to stderr.
/// Used in stdio mode, where stdout carries messages.
pub fn init_term_logger() -> GlobalLoggerGuard {
    let decorator = slog_term::PlainDecorator::new(io::stderr());
    let drain = BorgFormat::new(decorator).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog_scope::set_global_logger(slog::Logger::root(drain, slog::o!()))
}

/// Opens log file with append mode. Creates a new log file if it doesn't exist.
fn open_log_file<P: AsRef<Path>>(path: P) -> io::Result<File> {
    let path = path.as_ref();
    let parent = path.parent().ok_or_else(|| {
        Error::new(
            ErrorKind::Other,
            "Unable to get parent directory of log file",
        )
    })?;
    if !parent.as_os_str().is_empty() && !parent.is_dir() {
        fs::create_dir_all(parent)?
    }
    OpenOptions::new().append(true).create(true).open(path)
}
