//! Logging setup for erbeds.
//!
//! Logs go to stderr through `tracing-subscriber`. By default only events
//! from this crate are shown; at trace verbosity the HTTP client's own
//! events are let through too, which shows connection reuse and timeouts
//! against the upstream APIs.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Info and above.
    #[default]
    Normal,
    /// Debug and above, including every upstream request.
    Verbose,
    /// Everything, plus `reqwest` internals.
    Trace,
}

impl Verbosity {
    /// Maximum level shown for this crate.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directives used when `RUST_LOG` is not set.
    #[must_use]
    pub fn default_directives(&self) -> String {
        let own = format!("erbeds={}", self.to_level_filter());
        match self {
            Self::Trace => format!("{own},reqwest=debug"),
            _ => own,
        }
    }

    fn shows_targets(self) -> bool {
        matches!(self, Self::Verbose | Self::Trace)
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `verbosity`, e.g.
/// `RUST_LOG=erbeds::enrich=debug` to follow only the geocoding pass.
/// Calling this more than once is harmless; later calls are ignored.
///
/// # Examples
///
/// ```no_run
/// use erbeds::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directives()));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity.shows_targets()),
        )
        .try_init();
}

/// Initialize logging for tests; warnings and errors only.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
