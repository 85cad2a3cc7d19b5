//! Interchangeable ways of obtaining stack frames
//!
//! Each strategy is a tagged variant of [`Strategy`], identified by a
//! [`StrategyKind`] that knows which runtimes the variant supports and how to
//! construct it. Selection between them lives in [`crate::selector`].

mod capture;
mod std_trace;
mod walk;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, StackError};
use crate::frame::StackFrame;
use crate::getter::StackGetter;
use crate::marker::Marker;
use crate::runtime::Runtime;

pub use capture::BacktraceCapture;
pub use std_trace::StdTrace;
pub use walk::{SUPPORTED_MAJOR, SUPPORTED_OS, StackWalk};

/// Tag naming one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Early-terminating walk, gated on the runtime.
    StackWalk,
    /// Full capture through the `backtrace` crate.
    BacktraceCapture,
    /// Full capture through `std::backtrace`, parsed from its rendering.
    StdTrace,
}

impl StrategyKind {
    /// Default probing order, fastest first.
    pub const PRIORITY: [Self; 3] = [Self::StackWalk, Self::BacktraceCapture, Self::StdTrace];

    /// Stable name, as used in configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StackWalk => "stack-walk",
            Self::BacktraceCapture => "backtrace-capture",
            Self::StdTrace => "std-trace",
        }
    }

    /// Whether this strategy declares support for `runtime`.
    pub fn supports(self, runtime: &Runtime) -> bool {
        match self {
            Self::StackWalk => StackWalk::supports(runtime),
            Self::BacktraceCapture | Self::StdTrace => true,
        }
    }

    /// Construct the strategy for `runtime`.
    ///
    /// Only the support check runs here; no stack is walked.
    pub fn construct(self, runtime: &Runtime) -> Result<Strategy, ProbeError> {
        match self {
            Self::StackWalk => StackWalk::new(runtime).map(Strategy::StackWalk),
            Self::BacktraceCapture => Ok(Strategy::BacktraceCapture(BacktraceCapture)),
            Self::StdTrace => Ok(Strategy::StdTrace(StdTrace)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown call-site strategy `{0}` (expected stack-walk, backtrace-capture or std-trace)")]
pub struct ParseStrategyError(String);

impl FromStr for StrategyKind {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "stack-walk" | "walk" => Ok(Self::StackWalk),
            "backtrace-capture" | "capture" => Ok(Self::BacktraceCapture),
            "std-trace" | "std" => Ok(Self::StdTrace),
            _ => Err(ParseStrategyError(s.to_owned())),
        }
    }
}

/// A constructed strategy.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// See [`StackWalk`].
    StackWalk(StackWalk),
    /// See [`BacktraceCapture`].
    BacktraceCapture(BacktraceCapture),
    /// See [`StdTrace`].
    StdTrace(StdTrace),
}

impl Strategy {
    /// Tag of this strategy.
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::StackWalk(_) => StrategyKind::StackWalk,
            Self::BacktraceCapture(_) => StrategyKind::BacktraceCapture,
            Self::StdTrace(_) => StrategyKind::StdTrace,
        }
    }
}

impl StackGetter for Strategy {
    fn stack_for_caller_of(
        &self,
        marker: &Marker,
        skip: usize,
        max_depth: Option<usize>,
    ) -> Result<Vec<StackFrame>, StackError> {
        match self {
            Self::StackWalk(walk) => walk.stack_for_caller_of(marker, skip, max_depth),
            Self::BacktraceCapture(capture) => capture.stack_for_caller_of(marker, skip, max_depth),
            Self::StdTrace(std_trace) => std_trace.stack_for_caller_of(marker, skip, max_depth),
        }
    }
}
