//! Log-site value type and stack-trace sizing

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::StackFrame;

/// Where a log statement lives.
///
/// Usually resolved from the call stack; a front end may inject a site it
/// already knows, which suppresses stack analysis. When analysis fails the
/// site is [`LogSite::Invalid`] and the record is emitted without location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "frame", rename_all = "lowercase")]
pub enum LogSite {
    /// Found by walking the stack.
    Resolved(StackFrame),
    /// Supplied by the caller.
    Injected(StackFrame),
    /// No location could be determined.
    Invalid,
}

impl LogSite {
    /// Line number used when the real one is unknown.
    pub const UNKNOWN_LINE: u32 = 0;

    /// Site injected from known constants.
    pub fn injected(
        type_name: impl Into<String>,
        method_name: impl Into<String>,
        line_number: u32,
        file_name: Option<&str>,
    ) -> Self {
        let line = (line_number != Self::UNKNOWN_LINE).then_some(line_number);
        Self::Injected(StackFrame::new(type_name, method_name, file_name, line))
    }

    /// The frame behind this site, if any.
    pub fn frame(&self) -> Option<&StackFrame> {
        match self {
            Self::Resolved(frame) | Self::Injected(frame) => Some(frame),
            Self::Invalid => None,
        }
    }

    /// Whether a location is known.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// Declaring type of the log statement.
    pub fn type_name(&self) -> Option<&str> {
        self.frame().map(StackFrame::declaring_type)
    }

    /// Method containing the log statement.
    pub fn method_name(&self) -> Option<&str> {
        self.frame().map(StackFrame::method_name)
    }

    /// Source file base name.
    pub fn file_name(&self) -> Option<&str> {
        self.frame().and_then(StackFrame::file_name)
    }

    /// Line number, or [`LogSite::UNKNOWN_LINE`].
    pub fn line_number(&self) -> u32 {
        self.frame()
            .and_then(StackFrame::line_number)
            .unwrap_or(Self::UNKNOWN_LINE)
    }
}

impl fmt::Display for LogSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frame() {
            Some(frame) => fmt::Display::fmt(frame, f),
            None => f.write_str("<invalid log site>"),
        }
    }
}

/// How many frames to attach when a log statement asks for a stack trace.
///
/// `None < Small <= Medium <= Large <= Full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackSize {
    /// No trace; makes `with_stack_trace` a no-op.
    #[default]
    None,
    /// Up to 10 frames.
    Small,
    /// Up to 20 frames.
    Medium,
    /// Up to 50 frames.
    Large,
    /// Every frame up to the stack root.
    Full,
}

impl StackSize {
    /// Frame limit, `None` meaning unbounded.
    pub const fn max_depth(self) -> Option<usize> {
        match self {
            Self::None => Some(0),
            Self::Small => Some(10),
            Self::Medium => Some(20),
            Self::Large => Some(50),
            Self::Full => None,
        }
    }
}
