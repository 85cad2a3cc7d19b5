//! Frame-by-frame stack walk
//!
//! Unwinds the live stack with [`backtrace::trace`] and symbolises each frame
//! as it is visited. No trace object is materialised and the walk stops as soon
//! as the requested caller frames are known, so a typical log call resolves
//! only a handful of frames.

use crate::error::{ProbeError, StackError};
use crate::frame::StackFrame;
use crate::getter::{CallerScan, StackGetter};
use crate::marker::Marker;
use crate::runtime::Runtime;
use crate::strategy::StrategyKind;

/// Operating systems whose unwinder `backtrace::trace` drives reliably.
pub const SUPPORTED_OS: &[&str] = &[
    "linux", "android", "macos", "ios", "windows", "freebsd", "netbsd", "openbsd", "illumos",
    "solaris",
];

/// Toolchain major version the walk is validated against.
pub const SUPPORTED_MAJOR: u32 = 1;

/// Lazy, early-terminating stack walk.
#[derive(Debug, Clone, Copy)]
pub struct StackWalk {
    _gated: (),
}

impl StackWalk {
    /// Whether the walk may run on `runtime`.
    pub fn supports(runtime: &Runtime) -> bool {
        runtime.major_version() == Some(SUPPORTED_MAJOR) && SUPPORTED_OS.contains(&runtime.os.as_str())
    }

    /// Construct the walk, refusing runtimes it was not validated on.
    pub fn new(runtime: &Runtime) -> Result<Self, ProbeError> {
        if !Self::supports(runtime) {
            return Err(ProbeError::IncompatibleRuntime {
                strategy: StrategyKind::StackWalk,
                runtime: runtime.clone(),
            });
        }
        Ok(Self { _gated: () })
    }
}

impl StackGetter for StackWalk {
    fn stack_for_caller_of(
        &self,
        marker: &Marker,
        skip: usize,
        max_depth: Option<usize>,
    ) -> Result<Vec<StackFrame>, StackError> {
        let mut scan = CallerScan::new(marker, skip, max_depth);

        backtrace::trace(|frame| {
            backtrace::resolve_frame(frame, |symbol| {
                if scan.is_complete() {
                    return;
                }
                let Some(name) = symbol.name() else {
                    return;
                };
                let name = format!("{name:#}");
                let file = symbol.filename().and_then(|path| path.to_str());
                if let Some(resolved) = StackFrame::from_symbol(&name, file, symbol.lineno()) {
                    scan.push(resolved);
                }
            });
            !scan.is_complete()
        });

        scan.finish()
    }
}
