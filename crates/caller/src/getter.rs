//! The stack-getter capability and the marker scan every strategy shares

use crate::error::StackError;
use crate::frame::StackFrame;
use crate::marker::Marker;

/// Capability to resolve the frame that called into a marked library.
///
/// Implementations differ only in how they obtain raw frames; the marker and
/// skip semantics live in [`CallerScan`] so every implementation returns the
/// same frames for the same call stack.
pub trait StackGetter: Send + Sync {
    /// Resolve the caller frame and up to `max_depth - 1` frames above it.
    ///
    /// `skip` frames past the caller are dropped first. `max_depth = None`
    /// returns the whole remainder of the stack; `Some(0)` is treated as `Some(1)`.
    fn stack_for_caller_of(
        &self,
        marker: &Marker,
        skip: usize,
        max_depth: Option<usize>,
    ) -> Result<Vec<StackFrame>, StackError>;

    /// Resolve the `skip`-th frame past the outermost marker frame.
    fn caller_of(&self, marker: &Marker, skip: usize) -> Result<StackFrame, StackError> {
        self.stack_for_caller_of(marker, skip, Some(1))?
            .into_iter()
            .next()
            .ok_or_else(|| StackError::InsufficientDepth {
                marker: marker.to_string(),
                requested: skip,
                available: 0,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// No marker frame seen yet (strategy internals, facade glue).
    Searching,
    /// Inside the run of marker frames.
    InMarker,
    /// Past the run; counting caller-side frames.
    PastMarker,
}

/// Incremental caller lookup over frames fed innermost first.
///
/// The boundary is the end of the first run of marker frames met while
/// walking outward, so recursion inside the library (a marker method calling
/// another) stays on the library side. Marker frames found further out, as
/// happens with a log statement nested inside another one's argument
/// formatting, are never returned.
#[derive(Debug)]
pub(crate) struct CallerScan<'a> {
    marker: &'a Marker,
    skip: usize,
    keep: usize,
    state: ScanState,
    past_marker: usize,
    retained: Vec<StackFrame>,
}

impl<'a> CallerScan<'a> {
    pub(crate) fn new(marker: &'a Marker, skip: usize, max_depth: Option<usize>) -> Self {
        let depth = max_depth.map_or(usize::MAX, |d| d.max(1));
        let keep = skip.saturating_add(depth);
        Self {
            marker,
            skip,
            keep,
            state: ScanState::Searching,
            past_marker: 0,
            retained: Vec::with_capacity(keep.min(64)),
        }
    }

    /// Feed the next frame outward. Returns `false` once enough caller frames
    /// have been collected and the walk can stop.
    pub(crate) fn push(&mut self, frame: StackFrame) -> bool {
        let is_marker = self.marker.matches(&frame);
        match self.state {
            ScanState::Searching | ScanState::InMarker if is_marker => {
                self.state = ScanState::InMarker;
            }
            ScanState::Searching => {}
            ScanState::InMarker | ScanState::PastMarker => {
                self.state = ScanState::PastMarker;
                if !is_marker {
                    self.past_marker += 1;
                    self.retained.push(frame);
                }
            }
        }
        !self.is_complete()
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.state == ScanState::PastMarker && self.retained.len() >= self.keep
    }

    pub(crate) fn finish(mut self) -> Result<Vec<StackFrame>, StackError> {
        if self.state == ScanState::Searching {
            return Err(StackError::marker_not_found(self.marker));
        }
        if self.past_marker <= self.skip {
            return Err(StackError::InsufficientDepth {
                marker: self.marker.to_string(),
                requested: self.skip,
                available: self.past_marker,
            });
        }
        Ok(self.retained.split_off(self.skip))
    }
}
