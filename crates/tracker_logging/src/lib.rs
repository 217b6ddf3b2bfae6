#![deny(missing_docs)]
//! Shared logging utilities for the tracker workspace.
//!
//! This crate provides the `tracker_*` logging macros used by the poller core,
//! the IO engine and the terminal host, plus a minimal test initializer for
//! the global logger.
//!
//! All macros forward to the `log` facade, so the sink is whatever the host
//! installed (the terminal host uses `simplelog`).

/// Log target used for messages that belong to the diagnostic channel of the
/// progress poller (endpoint errors, transport failures, dropped responses).
pub const POLL_TARGET: &str = "tracker::poll";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! tracker_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Logs a warning on the poller diagnostic channel for a specific job.
///
/// The job id is always the first field so log lines can be grepped per job.
#[macro_export]
macro_rules! tracker_poll_warn {
    ($job_id:expr, $($arg:tt)*) => {{
        log::warn!(target: $crate::POLL_TARGET, "job={} {}", $job_id, format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
