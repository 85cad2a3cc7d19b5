//! Public entry point used by logging front ends

use std::sync::Arc;

use crate::error::CallerError;
use crate::frame::StackFrame;
use crate::getter::StackGetter;
use crate::marker::Marker;
use crate::runtime::Runtime;
use crate::selector::StrategySelector;
use crate::site::{LogSite, StackSize};
use crate::strategy::StrategyKind;

/// Resolves the application frame that issued a log call.
///
/// Every frame the finder itself adds sits between the strategy and the
/// marker, on the library side of the boundary, so callers pass only the
/// skip count of their own outer wrapper layers.
#[derive(Debug, Clone)]
pub struct CallerFinder {
    selector: Arc<StrategySelector>,
}

impl Default for CallerFinder {
    fn default() -> Self {
        Self::global()
    }
}

impl CallerFinder {
    /// Finder backed by the process-wide selector.
    pub fn global() -> Self {
        Self {
            selector: StrategySelector::global(),
        }
    }

    /// Finder backed by a specific selector.
    pub fn new(selector: Arc<StrategySelector>) -> Self {
        Self { selector }
    }

    /// Finder with its own selector over `strategies` on the current runtime.
    pub fn with_strategies(strategies: impl IntoIterator<Item = StrategyKind>) -> Self {
        Self::new(Arc::new(StrategySelector::new(Runtime::current(), strategies)))
    }

    /// The selector this finder resolves through.
    pub fn selector(&self) -> &StrategySelector {
        &self.selector
    }

    /// The `skip`-th frame past the outermost `marker` frame.
    pub fn find_caller_of(&self, marker: &Marker, skip: usize) -> Result<StackFrame, CallerError> {
        let getter = self.selector.select()?;
        Ok(getter.caller_of(marker, skip)?)
    }

    /// The caller frame plus outer frames, bounded by `size`.
    pub fn stack_for_caller_of(
        &self,
        marker: &Marker,
        skip: usize,
        size: StackSize,
    ) -> Result<Vec<StackFrame>, CallerError> {
        if size == StackSize::None {
            return Ok(Vec::new());
        }
        let getter = self.selector.select()?;
        Ok(getter.stack_for_caller_of(marker, skip, size.max_depth())?)
    }

    /// Log site of the caller, [`LogSite::Invalid`] when it cannot be resolved.
    pub fn find_log_site(&self, marker: &Marker, skip: usize) -> LogSite {
        match self.find_caller_of(marker, skip) {
            Ok(frame) => LogSite::Resolved(frame),
            Err(err) => {
                tracing::trace!(%marker, skip, error = %err, "log site unavailable");
                LogSite::Invalid
            }
        }
    }

    /// Declaring type of the code calling into `marker`, used to name
    /// loggers after their enclosing type or module.
    pub fn find_logging_type(&self, marker: &Marker) -> Result<String, CallerError> {
        self.find_caller_of(marker, 0)
            .map(|frame| frame.declaring_type().to_owned())
    }
}

/// [`CallerFinder::find_caller_of`] on the process-wide finder.
pub fn find_caller_of(marker: &Marker, skip: usize) -> Result<StackFrame, CallerError> {
    CallerFinder::global().find_caller_of(marker, skip)
}
