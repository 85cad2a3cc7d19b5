//! Trace capture through [`std::backtrace::Backtrace`]
//!
//! std exposes captured frames only through `Display`, so the rendered trace
//! is parsed back into frames:
//!
//! ```text
//!   12: app::service::helper_b
//!              at ./src/service.rs:41:9
//!       app::service::inlined_into_helper_b
//!              at ./src/service.rs:12:5
//!   13: <unknown>
//! ```

use std::backtrace::{Backtrace, BacktraceStatus};

use crate::error::StackError;
use crate::frame::StackFrame;
use crate::getter::{CallerScan, StackGetter};
use crate::marker::Marker;

/// Force-captures a std backtrace and parses its short rendering.
///
/// Needs nothing beyond the standard library, which makes it the last resort
/// in the default priority order.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdTrace;

impl StackGetter for StdTrace {
    fn stack_for_caller_of(
        &self,
        marker: &Marker,
        skip: usize,
        max_depth: Option<usize>,
    ) -> Result<Vec<StackFrame>, StackError> {
        let trace = Backtrace::force_capture();
        if trace.status() != BacktraceStatus::Captured {
            return Err(StackError::CaptureUnsupported(format!("{:?}", trace.status())));
        }

        let rendered = trace.to_string();
        let mut scan = CallerScan::new(marker, skip, max_depth);
        for entry in parse_trace(&rendered) {
            let Some(frame) = entry.into_frame() else {
                continue;
            };
            if !scan.push(frame) {
                break;
            }
        }
        scan.finish()
    }
}

/// One `N: symbol` entry with its optional `at` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TraceEntry<'a> {
    pub(crate) symbol: &'a str,
    pub(crate) file: Option<&'a str>,
    pub(crate) line: Option<u32>,
}

impl TraceEntry<'_> {
    fn into_frame(self) -> Option<StackFrame> {
        if self.symbol == "<unknown>" {
            return None;
        }
        StackFrame::from_symbol(self.symbol, self.file, self.line)
    }
}

pub(crate) fn parse_trace(rendered: &str) -> Vec<TraceEntry<'_>> {
    let mut entries: Vec<TraceEntry<'_>> = Vec::new();
    for raw in rendered.lines() {
        let line = raw.trim();
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(last) = entries.last_mut()
                && last.file.is_none()
            {
                let (file, line) = parse_location(location);
                last.file = Some(file);
                last.line = line;
            }
            continue;
        }
        let symbol = match line.split_once(": ") {
            Some((index, symbol)) if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) => symbol,
            // Unnumbered lines after the first entry are inlined symbols
            // sharing the previous physical frame.
            _ if !line.is_empty() && !entries.is_empty() => line,
            _ => continue,
        };
        entries.push(TraceEntry {
            symbol: symbol.trim(),
            file: None,
            line: None,
        });
    }
    entries
}

/// Split `path:line:column` (column optional) from the right, so drive
/// letters and colons inside the path survive.
fn parse_location(location: &str) -> (&str, Option<u32>) {
    let mut parts = location.rsplitn(3, ':');
    let last = parts.next();
    let middle = parts.next();
    let rest = parts.next();

    match (rest, middle, last) {
        (Some(path), Some(line), Some(column))
            if line.parse::<u32>().is_ok() && column.parse::<u32>().is_ok() =>
        {
            (path, line.parse().ok())
        }
        _ => match location.rsplit_once(':') {
            Some((path, line)) if line.parse::<u32>().is_ok() => (path, line.parse().ok()),
            _ => (location, None),
        },
    }
}
