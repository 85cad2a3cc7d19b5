//! Full trace capture through [`backtrace::Backtrace`]

use crate::error::StackError;
use crate::frame::StackFrame;
use crate::getter::{CallerScan, StackGetter};
use crate::marker::Marker;

/// Captures and symbolises the complete stack, then indexes into it.
///
/// Available wherever `backtrace` builds. Pays for the whole trace even when
/// only the first caller frame is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceCapture;

impl StackGetter for BacktraceCapture {
    fn stack_for_caller_of(
        &self,
        marker: &Marker,
        skip: usize,
        max_depth: Option<usize>,
    ) -> Result<Vec<StackFrame>, StackError> {
        let trace = backtrace::Backtrace::new();
        let mut scan = CallerScan::new(marker, skip, max_depth);

        let symbols = trace.frames().iter().flat_map(backtrace::BacktraceFrame::symbols);
        for symbol in symbols {
            let Some(name) = symbol.name() else {
                continue;
            };
            let name = format!("{name:#}");
            let file = symbol.filename().and_then(|path| path.to_str());
            let Some(frame) = StackFrame::from_symbol(&name, file, symbol.lineno()) else {
                continue;
            };
            if !scan.push(frame) {
                break;
            }
        }

        scan.finish()
    }
}
