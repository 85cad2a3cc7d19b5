//! Destinations for resolved log records

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use sitelog_caller::StackFrame;

use crate::config::Level;
use crate::record::LogRecord;

/// Receives records from a [`FluentLogger`](crate::FluentLogger).
pub trait LogSink: Send + Sync + fmt::Debug {
    /// Whether a record at `level` would be kept.
    ///
    /// Checked before the call site is resolved, so a disabled level costs
    /// no stack walk.
    fn enabled(&self, level: Level) -> bool {
        let _ = level;
        true
    }

    /// Consume one record.
    fn emit(&self, record: LogRecord);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn enabled(&self, level: Level) -> bool {
        (**self).enabled(level)
    }

    fn emit(&self, record: LogRecord) {
        (**self).emit(record);
    }
}

/// `tracing` target of every event emitted by [`TracingSink`].
pub(crate) const RECORD_TARGET: &str = "sitelog";

/// Forwards records to `tracing` as events with target `sitelog`.
///
/// The resolved site is attached as `caller.*` fields and the optional stack
/// as a `stack` field, so any installed subscriber renders them. An invalid
/// site leaves every `caller.*` field out.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! emit_event {
    ($level:expr, $record:expr, $stack:expr) => {
        tracing::event!(
            target: RECORD_TARGET,
            $level,
            logger = %$record.logger,
            caller.declaring_type = $record.site.type_name(),
            caller.method = $record.site.method_name(),
            caller.file = $record.site.file_name(),
            caller.line = $record.site.frame().and_then(StackFrame::line_number),
            stack = $stack,
            "{}",
            $record.message
        )
    };
}

impl LogSink for TracingSink {
    fn enabled(&self, level: Level) -> bool {
        match level {
            Level::Trace => tracing::enabled!(target: RECORD_TARGET, tracing::Level::TRACE),
            Level::Debug => tracing::enabled!(target: RECORD_TARGET, tracing::Level::DEBUG),
            Level::Info => tracing::enabled!(target: RECORD_TARGET, tracing::Level::INFO),
            Level::Warn => tracing::enabled!(target: RECORD_TARGET, tracing::Level::WARN),
            Level::Error => tracing::enabled!(target: RECORD_TARGET, tracing::Level::ERROR),
        }
    }

    fn emit(&self, record: LogRecord) {
        let trace = record.stack_trace();
        let stack = trace.as_deref();
        match record.level {
            Level::Trace => emit_event!(tracing::Level::TRACE, record, stack),
            Level::Debug => emit_event!(tracing::Level::DEBUG, record, stack),
            Level::Info => emit_event!(tracing::Level::INFO, record, stack),
            Level::Warn => emit_event!(tracing::Level::WARN, record, stack),
            Level::Error => emit_event!(tracing::Level::ERROR, record, stack),
        }
    }
}

/// Buffers records in memory, mainly for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Drain the buffer.
    pub fn take(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    /// Number of buffered records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: LogRecord) {
        self.records.lock().push(record);
    }
}
