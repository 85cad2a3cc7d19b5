//! Fluent logger and per-statement log context
//!
//! `logger.at_info().with_stack_trace(StackSize::Small).log("message")`
//! resolves the call site of `log` and hands a [`LogRecord`] to the sink.
//! [`LogContext`] is the library boundary: every frame of the logging
//! machinery runs inside one of its methods, so the first frame past it is
//! the statement that logged.

use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use sitelog_caller::{CallerFinder, LogSite, Marker, StackFrame, StackSize};

use crate::config::Level;
use crate::error::LogResult;
use crate::record::LogRecord;
use crate::sink::{LogSink, TracingSink};

/// Name of the process-wide logger and the fallback for unnamed loggers.
pub const DEFAULT_LOGGER_NAME: &str = "sitelog";

/// Wrapper frames each free-function entry point ([`info`], [`log`], ...)
/// adds between the statement and the log context.
pub const ENTRY_POINT_FRAMES: usize = 1;

static GLOBAL: LazyLock<RwLock<Arc<FluentLogger>>> =
    LazyLock::new(|| RwLock::new(Arc::new(FluentLogger::new(DEFAULT_LOGGER_NAME))));

/// A named logger that resolves call sites.
#[derive(Clone)]
pub struct FluentLogger {
    name: String,
    level: Level,
    sink: Arc<dyn LogSink>,
    finder: CallerFinder,
    resolve_sites: bool,
}

impl fmt::Debug for FluentLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluentLogger")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("sink", &self.sink)
            .field("resolve_sites", &self.resolve_sites)
            .finish_non_exhaustive()
    }
}

impl FluentLogger {
    /// Logger forwarding to `tracing` through the process-wide finder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Level::Trace,
            sink: Arc::new(TracingSink),
            finder: CallerFinder::global(),
            resolve_sites: true,
        }
    }

    /// Logger named after the type (or module) that calls this constructor.
    ///
    /// Falls back to [`DEFAULT_LOGGER_NAME`] when the caller cannot be
    /// identified.
    #[inline(never)]
    pub fn for_enclosing_type() -> Self {
        match Self::try_for_enclosing_type() {
            Ok(logger) => logger,
            Err(err) => {
                tracing::debug!(error = %err, "unnamed logger, using default name");
                Self::new(DEFAULT_LOGGER_NAME)
            }
        }
    }

    /// Like [`FluentLogger::for_enclosing_type`], reporting failures.
    #[inline(never)]
    pub fn try_for_enclosing_type() -> LogResult<Self> {
        let finder = CallerFinder::global();
        let name = finder.find_logging_type(&Marker::of::<Self>())?;
        Ok(Self::new(name))
    }

    /// Minimum level this logger passes on.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Destination for records.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Finder used to resolve call sites.
    pub fn with_finder(mut self, finder: CallerFinder) -> Self {
        self.finder = finder;
        self
    }

    /// Turn call-site resolution on or off. When off, records carry an
    /// invalid site unless one is injected.
    pub fn with_site_resolution(mut self, enabled: bool) -> Self {
        self.resolve_sites = enabled;
        self
    }

    /// Logger name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Finder used to resolve call sites.
    pub fn finder(&self) -> &CallerFinder {
        &self.finder
    }

    /// Whether a statement at `level` would produce a record.
    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.level && self.sink.enabled(level)
    }

    /// Start a statement at `level`.
    pub fn at(&self, level: Level) -> LogContext<'_> {
        LogContext {
            logger: self,
            level,
            enabled: self.is_enabled(level),
            stack_size: StackSize::None,
            injected_site: None,
        }
    }

    /// Start a statement at [`Level::Trace`].
    pub fn at_trace(&self) -> LogContext<'_> {
        self.at(Level::Trace)
    }

    /// Start a statement at [`Level::Debug`].
    pub fn at_debug(&self) -> LogContext<'_> {
        self.at(Level::Debug)
    }

    /// Start a statement at [`Level::Info`].
    pub fn at_info(&self) -> LogContext<'_> {
        self.at(Level::Info)
    }

    /// Start a statement at [`Level::Warn`].
    pub fn at_warn(&self) -> LogContext<'_> {
        self.at(Level::Warn)
    }

    /// Start a statement at [`Level::Error`].
    pub fn at_error(&self) -> LogContext<'_> {
        self.at(Level::Error)
    }
}

/// One log statement being built.
///
/// Disabled statements keep accepting calls but never touch the stack.
#[derive(Debug)]
#[must_use = "a log context does nothing until `log` is called"]
pub struct LogContext<'a> {
    logger: &'a FluentLogger,
    level: Level,
    enabled: bool,
    stack_size: StackSize,
    injected_site: Option<LogSite>,
}

impl LogContext<'_> {
    /// Whether this statement will produce a record.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Attach the caller's stack, bounded by `size`.
    pub fn with_stack_trace(mut self, size: StackSize) -> Self {
        self.stack_size = size;
        self
    }

    /// Use a known site instead of analysing the stack.
    pub fn with_injected_log_site(mut self, site: LogSite) -> Self {
        self.injected_site = Some(site);
        self
    }

    /// Emit `message`.
    #[inline(never)]
    pub fn log(self, message: impl Into<String>) {
        if self.enabled {
            self.emit(message.into(), 0);
        }
    }

    /// Emit a lazily built message; `message` only runs when enabled.
    #[inline(never)]
    pub fn log_with(self, message: impl FnOnce() -> String) {
        if self.enabled {
            let message = message();
            self.emit(message, 0);
        }
    }

    /// Resolve the site (past `skip` extra wrapper frames) and hand the
    /// record to the sink.
    #[inline(never)]
    pub(crate) fn emit(self, message: String, skip: usize) {
        if !self.enabled {
            return;
        }
        let marker = Marker::of::<Self>();
        let finder = &self.logger.finder;

        let stack: Vec<StackFrame> = if self.stack_size == StackSize::None {
            Vec::new()
        } else {
            match finder.stack_for_caller_of(&marker, skip, self.stack_size) {
                Ok(frames) => frames,
                Err(err) => {
                    tracing::trace!(error = %err, "stack trace unavailable");
                    Vec::new()
                }
            }
        };

        // A captured stack starts at the statement, so it doubles as the site.
        let site = match self.injected_site {
            Some(site) => site,
            None if !self.logger.resolve_sites => LogSite::Invalid,
            None if self.stack_size == StackSize::None => finder.find_log_site(&marker, skip),
            None => stack.first().cloned().map_or(LogSite::Invalid, LogSite::Resolved),
        };

        let record = LogRecord::new(self.level, &self.logger.name, message, site, stack);
        self.logger.sink.emit(record);
    }
}

/// The process-wide logger used by the free-function entry points.
pub fn global() -> Arc<FluentLogger> {
    GLOBAL.read().clone()
}

/// Replace the process-wide logger, returning the previous one.
pub fn set_global(logger: FluentLogger) -> Arc<FluentLogger> {
    install(Arc::new(logger))
}

pub(crate) fn install(logger: Arc<FluentLogger>) -> Arc<FluentLogger> {
    std::mem::replace(&mut *GLOBAL.write(), logger)
}

/// Log `message` at `level` through the process-wide logger.
#[inline(never)]
pub fn log(level: Level, message: impl Into<String>) {
    global().at(level).emit(message.into(), ENTRY_POINT_FRAMES);
}

macro_rules! entry_point {
    ($(#[$doc:meta])* $name:ident => $level:expr) => {
        $(#[$doc])*
        #[inline(never)]
        pub fn $name(message: impl Into<String>) {
            global().at($level).emit(message.into(), ENTRY_POINT_FRAMES);
        }
    };
}

entry_point!(
    /// Log at [`Level::Trace`] through the process-wide logger.
    trace => Level::Trace
);
entry_point!(
    /// Log at [`Level::Debug`] through the process-wide logger.
    debug => Level::Debug
);
entry_point!(
    /// Log at [`Level::Info`] through the process-wide logger.
    info => Level::Info
);
entry_point!(
    /// Log at [`Level::Warn`] through the process-wide logger.
    warn => Level::Warn
);
entry_point!(
    /// Log at [`Level::Error`] through the process-wide logger.
    error => Level::Error
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use pretty_assertions::assert_eq;
    use sitelog_caller::{Runtime, RustcVersion, StrategyKind, StrategySelector};

    fn memory_logger() -> (FluentLogger, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let logger = FluentLogger::new("test").with_sink(sink.clone());
        (logger, sink)
    }

    fn fresh_finder() -> CallerFinder {
        CallerFinder::with_strategies(StrategyKind::PRIORITY)
    }

    #[test]
    fn resolves_the_statement_site() {
        let (logger, sink) = memory_logger();

        let ((), line) = (logger.at_info().log("hello"), line!());

        let records = sink.take();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.level, Level::Info);
        assert_eq!(record.logger, "test");
        assert_eq!(record.message, "hello");
        assert_eq!(
            record.site,
            LogSite::Resolved(StackFrame::new(
                "sitelog::logger::tests",
                "resolves_the_statement_site",
                Some("logger.rs"),
                Some(line),
            ))
        );
        assert!(record.stack.is_empty());
    }

    #[test]
    fn disabled_level_never_walks_the_stack() {
        let (logger, sink) = memory_logger();
        let finder = fresh_finder();
        let logger = logger.with_level(Level::Warn).with_finder(finder.clone());

        let context = logger.at_info().with_stack_trace(StackSize::Full);
        assert!(!context.is_enabled());
        context.log("ignored");
        logger.at_debug().log_with(|| unreachable!("message built for a disabled level"));

        assert!(sink.is_empty());
        assert_eq!(finder.selector().probe_attempts(), 0);
    }

    #[test]
    fn injected_site_skips_resolution() {
        let (logger, sink) = memory_logger();
        let finder = fresh_finder();
        let logger = logger.with_finder(finder.clone());
        let site = LogSite::injected("app::Job", "run", 7, Some("job.rs"));

        logger.at_warn().with_injected_log_site(site.clone()).log("known");

        assert_eq!(sink.take()[0].site, site);
        assert_eq!(finder.selector().probe_attempts(), 0);
    }

    #[test]
    fn stack_trace_starts_at_the_statement() {
        let (logger, sink) = memory_logger();

        logger.at_error().with_stack_trace(StackSize::Small).log_with(|| "boom".to_owned());

        let record = sink.take().remove(0);
        assert!(!record.stack.is_empty() && record.stack.len() <= 10);
        assert_eq!(record.stack[0].method_name(), "stack_trace_starts_at_the_statement");
        assert_eq!(record.site, LogSite::Resolved(record.stack[0].clone()));
    }

    #[test]
    fn stack_trace_without_site_resolution() {
        let (logger, sink) = memory_logger();
        let logger = logger.with_site_resolution(false);

        logger.at_warn().with_stack_trace(StackSize::Small).log("stack only");

        let record = sink.take().remove(0);
        assert_eq!(record.site, LogSite::Invalid);
        assert_eq!(record.stack[0].method_name(), "stack_trace_without_site_resolution");
    }

    #[test]
    fn resolution_failure_still_emits() {
        let runtime = Runtime::new(Some(RustcVersion::new(2, 0, 0)), "linux", "x86_64");
        let selector = StrategySelector::new(runtime, [StrategyKind::StackWalk]);
        let (logger, sink) = memory_logger();
        let logger = logger.with_finder(CallerFinder::new(Arc::new(selector)));

        logger.at_info().with_stack_trace(StackSize::Medium).log("still here");

        let record = sink.take().remove(0);
        assert_eq!(record.message, "still here");
        assert_eq!(record.site, LogSite::Invalid);
        assert!(record.stack.is_empty());
    }

    #[test]
    fn site_resolution_can_be_disabled() {
        let (logger, sink) = memory_logger();
        let logger = logger.with_site_resolution(false);

        logger.at_info().log("no site");

        assert_eq!(sink.take()[0].site, LogSite::Invalid);
    }

    #[test]
    fn logger_named_after_enclosing_module() {
        let logger = FluentLogger::for_enclosing_type();
        assert_eq!(logger.name(), "sitelog::logger::tests");
    }

    struct Service {
        logger: FluentLogger,
    }

    impl Service {
        fn new() -> Self {
            Self {
                logger: FluentLogger::for_enclosing_type(),
            }
        }
    }

    #[test]
    fn logger_named_after_enclosing_type() {
        assert_eq!(Service::new().logger.name(), "sitelog::logger::tests::Service");
    }
}
