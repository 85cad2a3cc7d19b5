//! Error types for call-site resolution
//!
//! Three layers, matching how far a failure is allowed to travel:
//! [`StackError`] is returned by a single stack walk, [`ProbeError`] stays
//! inside strategy selection, and [`CallerError`] is what the facade hands to
//! the logging front end.

use std::fmt;

use crate::runtime::Runtime;
use crate::strategy::StrategyKind;

/// Failure of a single caller lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    /// The marker never appeared on the walked stack.
    #[error("{marker} does not appear on the current call stack")]
    MarkerNotFound {
        /// Display form of the marker that was searched for.
        marker: String,
    },

    /// Fewer caller frames exist past the marker than were requested.
    #[error(
        "insufficient stack depth past {marker}: frame {requested} requested, {available} available"
    )]
    InsufficientDepth {
        /// Display form of the marker.
        marker: String,
        /// Zero-based index of the requested frame past the marker.
        requested: usize,
        /// Number of frames that exist past the marker.
        available: usize,
    },

    /// The runtime refused to capture a stack trace.
    #[error("stack capture unsupported: {0}")]
    CaptureUnsupported(String),
}

impl StackError {
    /// Convenience constructor for [`StackError::MarkerNotFound`].
    pub fn marker_not_found(marker: impl fmt::Display) -> Self {
        Self::MarkerNotFound {
            marker: marker.to_string(),
        }
    }

    /// Returns `true` for [`StackError::InsufficientDepth`].
    #[must_use]
    pub fn is_insufficient_depth(&self) -> bool {
        matches!(self, Self::InsufficientDepth { .. })
    }
}

/// Why a strategy could not be selected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The strategy declares no support for the active runtime.
    #[error("{strategy} does not support runtime {runtime}")]
    IncompatibleRuntime {
        /// Strategy that refused construction.
        strategy: StrategyKind,
        /// Runtime it was asked to run on.
        runtime: Runtime,
    },

    /// The strategy was constructed but its self test failed.
    #[error("{strategy} failed its self test: {source}")]
    SelfTest {
        /// Strategy under test.
        strategy: StrategyKind,
        /// Underlying lookup failure.
        source: StackError,
    },

    /// The self test resolved a frame, but the wrong one.
    #[error("{strategy} resolved `{found}` during its self test, expected a frame in `{expected}`")]
    WrongFrame {
        /// Strategy under test.
        strategy: StrategyKind,
        /// Declaring type the probe expected.
        expected: String,
        /// Frame actually returned.
        found: String,
    },
}

/// No strategy survived probing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Every candidate failed; the failures are listed in priority order.
    #[error("no call-site strategy is usable: {}", describe(.0))]
    NoStrategy(Vec<ProbeError>),
}

fn describe(failures: &[ProbeError]) -> String {
    if failures.is_empty() {
        return "no candidates configured".to_owned();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error returned by [`CallerFinder`](crate::CallerFinder).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallerError {
    /// The lookup itself failed.
    #[error(transparent)]
    Stack(#[from] StackError),

    /// Strategy selection failed at first use.
    #[error(transparent)]
    Unavailable(#[from] SelectionError),
}
