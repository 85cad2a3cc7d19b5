//! # Sitelog - fluent logging that knows where it was called from
//!
//! Every record carries the declaring type, method, file and line of the
//! statement that produced it, found by walking the stack rather than by
//! macros capturing `file!()`/`line!()`.
//!
//! ## Quick Start
//!
//! ```rust
//! use sitelog::prelude::*;
//!
//! fn main() -> LogResult<()> {
//!     let _guard = sitelog::init_test()?;
//!
//!     let logger = FluentLogger::for_enclosing_type();
//!     logger.at_info().log("server starting");
//!     logger
//!         .at_warn()
//!         .with_stack_trace(StackSize::Small)
//!         .log("slow start");
//!
//!     sitelog::info("free functions resolve their caller too");
//!     Ok(())
//! }
//! ```
//!
//! Call-site lookup itself lives in [`sitelog_caller`]; this crate adds the
//! fluent front end, sinks and `tracing` integration.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod builder;
mod config;
mod error;
mod format;
mod logger;
mod record;
mod sink;

// Public API
pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{CallerConfig, Config, DisplayConfig, Format, Level};
pub use error::{LogError, LogResult};
pub use logger::{
    DEFAULT_LOGGER_NAME, ENTRY_POINT_FRAMES, FluentLogger, LogContext, debug, error, global, info, log,
    set_global, trace, warn,
};
pub use record::LogRecord;
pub use sink::{LogSink, MemorySink, TracingSink};

pub use sitelog_caller::{self, CallerFinder, LogSite, Marker, StackFrame, StackSize, StrategyKind};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        FluentLogger, Level, LogContext, LogResult, LogSite, StackSize, auto_init, init, init_with,
    };
}

// ============================================================================
// Initialization Functions
// ============================================================================

/// Auto-detect and initialize the best logging configuration
///
/// Environment configuration wins when `SITELOG_LOG` or `RUST_LOG` is set;
/// otherwise debug builds get [`Config::development`] and release builds
/// [`Config::production`].
pub fn auto_init() -> LogResult<LoggerGuard> {
    if std::env::var_os("SITELOG_LOG").is_some() || std::env::var_os("RUST_LOG").is_some() {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Initialize with default configuration
pub fn init() -> LogResult<LoggerGuard> {
    init_with(Config::default())
}

/// Initialize with custom configuration
pub fn init_with(config: Config) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}

/// Initialize for tests, tolerating an already installed subscriber
pub fn init_test() -> LogResult<LoggerGuard> {
    if tracing::dispatcher::has_been_set() {
        return Ok(LoggerGuard::noop());
    }
    match init_with(Config::test()) {
        // Another test thread won the race.
        Err(LogError::Init(_)) => Ok(LoggerGuard::noop()),
        other => other,
    }
}
