//! The unit handed to sinks

use std::fmt;

use sitelog_caller::{LogSite, StackFrame};
use time::OffsetDateTime;

use crate::config::Level;

/// A single log statement after call-site resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Severity.
    pub level: Level,
    /// Name of the emitting logger.
    pub logger: String,
    /// Rendered message.
    pub message: String,
    /// Where the statement lives.
    pub site: LogSite,
    /// Caller frame and outer frames, empty unless requested.
    pub stack: Vec<StackFrame>,
    /// When the statement ran (UTC).
    pub timestamp: OffsetDateTime,
}

impl LogRecord {
    pub(crate) fn new(level: Level, logger: &str, message: String, site: LogSite, stack: Vec<StackFrame>) -> Self {
        Self {
            level,
            logger: logger.to_owned(),
            message,
            site,
            stack,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// The stack rendered one frame per line, as attached to events.
    pub fn stack_trace(&self) -> Option<String> {
        if self.stack.is_empty() {
            return None;
        }
        let lines: Vec<String> = self.stack.iter().map(|frame| format!("at {frame}")).collect();
        Some(lines.join("\n"))
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}] {}", self.level, self.logger, self.site, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame(method: &str, line: u32) -> StackFrame {
        StackFrame::new("app::Service", method, Some("service.rs"), Some(line))
    }

    #[test]
    fn renders_site_and_message() {
        let record = LogRecord::new(
            Level::Info,
            "app::Service",
            "ready".to_owned(),
            LogSite::Resolved(frame("start", 42)),
            Vec::new(),
        );
        assert_eq!(record.to_string(), "info app::Service [app::Service::start(service.rs:42)] ready");
        assert_eq!(record.stack_trace(), None);
    }

    #[test]
    fn stack_trace_lists_frames_outward() {
        let record = LogRecord::new(
            Level::Warn,
            "app",
            "slow".to_owned(),
            LogSite::Invalid,
            vec![frame("poll", 10), frame("run", 3)],
        );
        assert_eq!(
            record.stack_trace().unwrap(),
            "at app::Service::poll(service.rs:10)\nat app::Service::run(service.rs:3)"
        );
    }
}
