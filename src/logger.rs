// This module defines a super simple logger that works with the `log` crate.
// We don't need anything fancy; just basic log levels and the ability to
// print to stderr. We therefore avoid bringing in extra dependencies just
// for this functionality.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use log::Log;

use crate::style::Theme;

/// The simplest possible logger that logs to stderr.
///
/// This logger does no filtering. Instead, it relies on the `log` crates
/// filtering via its global max_level setting.
#[derive(Debug)]
pub struct Logger;

impl Logger {
    /// Initialize a logger that logs to stderr as the global logger. If
    /// there was a problem setting the logger, then an error is returned.
    pub fn init() -> Result<(), log::SetLoggerError> {
        static LOGGER: Logger = Logger;
        log::set_logger(&LOGGER)
    }
}

impl Log for Logger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        // We set the log level via log::set_max_level, so we don't need to
        // implement filtering here.
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        // Everything in this tool is civil-date arithmetic, so there is no
        // time zone lying around to localize with. Log timestamps are
        // plain instants.
        let now = jiff::Timestamp::now();
        match (record.file(), record.line()) {
            (Some(file), Some(line)) => {
                eprintln!(
                    "{}|{}|{}:{}: {}",
                    Theme::stderr().highlight(now),
                    record.level(),
                    relative(file),
                    line,
                    record.args()
                );
            }
            (Some(file), None) => {
                eprintln!(
                    "{}|{}|{}: {}",
                    now,
                    record.level(),
                    relative(file),
                    record.args()
                );
            }
            _ => {
                eprintln!("{}|{}: {}", now, record.level(), record.args());
            }
        }
    }

    fn flush(&self) {
        // We use eprintln! which is flushed on every call.
    }
}

fn relative<'p>(path: &'p str) -> &'p str {
    let Some(cwd) = cwd() else { return path };
    let Ok(relative) = Path::new(path).strip_prefix(cwd) else { return path };
    let Some(relative) = relative.to_str() else { return path };
    relative
}

fn cwd() -> Option<&'static Path> {
    static CWD: LazyLock<Option<PathBuf>> =
        LazyLock::new(|| std::env::current_dir().ok());
    CWD.as_deref()
}
