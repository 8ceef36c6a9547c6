#![deny(missing_docs)]

//! Defines the output format of traces, events, and spans produced
//! while fetching schemas, for binaries that embed `schema-fetch`.

use std::io;

use tracing_subscriber::fmt;

pub use tracing_core::Level;

/// possible log levels
pub const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// The error returned when a global subscriber has already been installed
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// How much context each log line carries
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// Message only, no timestamps or targets
    #[default]
    Compact,
    /// Timestamps and targets
    Verbose,
    /// Timestamps, targets and thread ids
    VeryVerbose,
}

impl LogFormat {
    /// Picks a format appropriate for `level`: the chattier the level, the more context
    pub fn for_level(level: Level) -> LogFormat {
        if level >= Level::TRACE {
            LogFormat::VeryVerbose
        } else if level >= Level::DEBUG {
            LogFormat::Verbose
        } else {
            LogFormat::Compact
        }
    }
}

/// Initializes a global tracing subscriber that formats
/// all logs produced by an application that calls init,
/// and all logs produced by libraries consumed by that application.
///
/// By default, no logs are printed. Calling this more than once is a no-op.
pub fn init(level: Option<Level>) {
    if let Some(level) = level {
        let _ = try_init(level, LogFormat::for_level(level));
    }
}

/// Installs a global subscriber writing to stderr at `level` with `format`
pub fn try_init(level: Level, format: LogFormat) -> Result<(), InitError> {
    match format {
        LogFormat::Compact => {
            let format = fmt::format().without_time().with_target(false).compact();
            fmt()
                .with_max_level(level)
                .event_format(format)
                .with_writer(io::stderr)
                .try_init()
        }
        LogFormat::Verbose => fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .try_init(),
        LogFormat::VeryVerbose => fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .with_thread_ids(true)
            .try_init(),
    }
}
