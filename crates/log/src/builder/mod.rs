//! Logger builder implementation
//!
//! Installs a `tracing` subscriber for the configured format and a
//! process-wide [`FluentLogger`] whose call-site resolution follows the
//! `caller` section of the configuration.

mod format;

use std::sync::Arc;

use sitelog_caller::{CallerFinder, StrategyKind};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{CallerConfig, Config};
use crate::error::{LogError, LogResult};
use crate::logger::{self, DEFAULT_LOGGER_NAME, FluentLogger};

/// Install `Registry + filter + fmt` as the global subscriber.
macro_rules! init_subscriber {
    ($filter:expr, $fmt_layer:expr) => {
        Registry::default()
            .with($filter)
            .with($fmt_layer)
            .try_init()
            .map_err(|e| LogError::Init(e.to_string()))
    };
}

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Guard that keeps the installed logger reachable
///
/// Holds the process-wide [`FluentLogger`] created by
/// [`LoggerBuilder::build`].
#[derive(Debug)]
#[must_use = "dropping the guard immediately discards the installed logger handle"]
pub struct LoggerGuard {
    logger: Option<Arc<FluentLogger>>,
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Build and initialize the logger
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The configuration is inconsistent
    /// - Filter string cannot be parsed
    /// - A global subscriber is already installed
    pub fn build(self) -> LogResult<LoggerGuard> {
        self.config.validate()?;

        let filter = EnvFilter::try_new(&self.config.level)
            .map_err(|e| LogError::filter(&self.config.level, e))?;

        let output = format::output_layer(self.config.format, &self.config.display, std::io::stderr);
        init_subscriber!(filter, output)?;

        let logger = Arc::new(global_logger(&self.config.caller));
        logger::install(Arc::clone(&logger));

        Ok(LoggerGuard {
            logger: Some(logger),
        })
    }
}

/// Process-wide logger for `caller`, probing strategies eagerly so a total
/// failure shows up at start-up rather than on the first statement.
fn global_logger(caller: &CallerConfig) -> FluentLogger {
    let finder = finder_for(&caller.strategies);

    if caller.enabled {
        match finder.selector().select() {
            Ok(strategy) => {
                tracing::debug!(strategy = %strategy.kind(), "call-site resolution ready");
            }
            Err(err) => {
                tracing::warn!(error = %err, "call-site resolution unavailable, records carry no site");
            }
        }
    }

    FluentLogger::new(DEFAULT_LOGGER_NAME)
        .with_finder(finder)
        .with_site_resolution(caller.enabled)
}

/// The shared finder for the default order, a dedicated one otherwise.
fn finder_for(strategies: &[StrategyKind]) -> CallerFinder {
    if strategies == StrategyKind::PRIORITY {
        CallerFinder::global()
    } else {
        CallerFinder::with_strategies(strategies.iter().copied())
    }
}

impl LoggerGuard {
    pub(crate) fn noop() -> Self {
        Self { logger: None }
    }

    /// The installed logger, `None` when initialisation was skipped.
    pub fn logger(&self) -> Option<&FluentLogger> {
        self.logger.as_deref()
    }
}
