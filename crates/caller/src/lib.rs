//! # Sitelog Caller
//!
//! Finds, at log-call time, the first stack frame that belongs to the code
//! calling into a logging library, so records can carry their source location
//! without the caller passing it.
//!
//! ```rust
//! use sitelog_caller::{CallerFinder, Marker};
//!
//! struct Logger;
//!
//! impl Logger {
//!     #[inline(never)]
//!     fn log(&self) -> String {
//!         CallerFinder::global()
//!             .find_caller_of(&Marker::of::<Logger>(), 0)
//!             .map(|frame| frame.method_name().to_owned())
//!             .unwrap_or_default()
//!     }
//! }
//!
//! # fn main() {
//! let caller = Logger.log();
//! # let _ = caller;
//! # }
//! ```
//!
//! ## Layout
//!
//! - [`StackFrame`] / [`Marker`]: the resolved frame and the library boundary.
//! - [`StackGetter`]: the capability every strategy provides.
//! - [`strategy`]: [`StackWalk`], [`BacktraceCapture`] and [`StdTrace`].
//! - [`StrategySelector`]: one-time, priority-ordered probing with fallback.
//! - [`CallerFinder`]: the facade front ends call.

#![warn(missing_docs, rust_2018_idioms)]

mod error;
mod finder;
mod frame;
mod getter;
mod marker;
mod runtime;
mod selector;
mod site;
pub mod strategy;

pub use error::{CallerError, ProbeError, SelectionError, StackError};
pub use finder::{CallerFinder, find_caller_of};
pub use frame::StackFrame;
pub use getter::StackGetter;
pub use marker::Marker;
pub use runtime::{ParseVersionError, Runtime, RustcVersion};
pub use selector::{StrategySelector, probe};
pub use site::{LogSite, StackSize};
pub use strategy::{BacktraceCapture, StackWalk, StdTrace, Strategy, StrategyKind};
