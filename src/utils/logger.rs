//! # Logging Setup
//!
//! Installs the global `slog` logger and bridges the `log` facade into it,
//! so library code can use the `log` macros throughout. Sink selection is
//! feature-driven: `termlog` for terminal output, `journald`/`syslog` for
//! system sinks; without any sink feature records are discarded.

use slog::{Drain, Logger, o};
use slog_scope::GlobalLoggerGuard;

use super::error::Result;

/// Install the global logger and return its guard. The guard must stay
/// alive for the duration of the program.
pub fn setup_logging() -> Result<GlobalLoggerGuard> {
    let guard = slog_scope::set_global_logger(default_root_logger()?);

    // Route the `log` crate macros into slog.
    slog_stdlog::init()?;

    Ok(guard)
}

#[allow(unreachable_code)]
fn default_root_logger() -> Result<Logger> {
    #[cfg(feature = "termlog")]
    {
        return Ok(term_logger());
    }

    #[cfg(all(feature = "journald", target_os = "linux"))]
    {
        return Ok(journald_logger());
    }

    #[cfg(feature = "syslog")]
    {
        return Ok(syslog_logger()?);
    }

    Ok(Logger::root(slog::Discard, o!()))
}

#[cfg(feature = "termlog")]
fn term_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, o!())
}

#[cfg(all(feature = "journald", target_os = "linux"))]
fn journald_logger() -> Logger {
    let drain = slog_journald::JournaldDrain.ignore_res();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, o!())
}

#[cfg(feature = "syslog")]
fn syslog_logger() -> Result<Logger> {
    let drain = slog_syslog::unix_3164(slog_syslog::Facility::LOG_USER)
        .map_err(|e| super::error::Error::new(&format!("Failed to open syslog: {}", e)))?
        .fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Ok(Logger::root(drain, o!()))
}
