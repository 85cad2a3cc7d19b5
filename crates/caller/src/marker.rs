//! Search boundary between library frames and caller frames

use std::borrow::Cow;
use std::fmt;

use crate::frame::{StackFrame, normalize_path};

/// Identifies the frames that belong to the logging library.
///
/// Every frame whose declaring type matches the marker is treated as library
/// code; the caller is the first frame past the outermost marker frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Frames declared by exactly this type (inherent methods, trait impls and
    /// closures inside them).
    Type(Cow<'static, str>),
    /// Frames declared anywhere in this module or below it.
    Module(Cow<'static, str>),
}

impl Marker {
    /// Marker for the frames of type `T`.
    ///
    /// Generic parameters are ignored: `Marker::of::<Wrapper<u8>>()` matches
    /// every instantiation of `Wrapper`.
    pub fn of<T: ?Sized>() -> Self {
        let name = std::any::type_name::<T>();
        if name.contains(['<', '{']) {
            Self::Type(Cow::Owned(normalize_path(name)))
        } else {
            Self::Type(Cow::Borrowed(name))
        }
    }

    /// Marker for a whole module, typically `Marker::module(module_path!())`.
    pub fn module(path: impl Into<Cow<'static, str>>) -> Self {
        Self::Module(path.into())
    }

    /// The type or module path this marker matches.
    pub fn path(&self) -> &str {
        match self {
            Self::Type(path) | Self::Module(path) => path,
        }
    }

    /// Whether `frame` belongs to the library side of this boundary.
    pub fn matches(&self, frame: &StackFrame) -> bool {
        let declaring = frame.declaring_type();
        match self {
            Self::Type(path) => declaring == path.as_ref(),
            Self::Module(path) => {
                declaring == path.as_ref()
                    || declaring
                        .strip_prefix(path.as_ref())
                        .is_some_and(|rest| rest.starts_with("::"))
            }
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(path) => write!(f, "type `{path}`"),
            Self::Module(path) => write!(f, "module `{path}`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    #[allow(dead_code)]
    struct Wrapper<T>(T);

    fn frame(declaring: &str) -> StackFrame {
        StackFrame::new(declaring, "call", None, None)
    }

    #[test]
    fn type_marker_matches_exact_declaring_type() {
        let marker = Marker::of::<Plain>();
        assert_eq!(marker.path(), "sitelog_caller::marker::tests::Plain");
        assert!(marker.matches(&frame("sitelog_caller::marker::tests::Plain")));
        assert!(!marker.matches(&frame("sitelog_caller::marker::tests::PlainOther")));
        assert!(!marker.matches(&frame("sitelog_caller::marker::tests")));
    }

    #[test]
    fn type_marker_ignores_generic_arguments() {
        let marker = Marker::of::<Wrapper<String>>();
        assert_eq!(marker.path(), "sitelog_caller::marker::tests::Wrapper");
    }

    #[test]
    fn module_marker_matches_descendants_only() {
        let marker = Marker::module("app::log");
        assert!(marker.matches(&frame("app::log")));
        assert!(marker.matches(&frame("app::log::Context")));
        assert!(!marker.matches(&frame("app::logger")));
        assert!(!marker.matches(&frame("app")));
    }

    #[test]
    fn display_names_the_boundary() {
        assert_eq!(Marker::module("app::log").to_string(), "module `app::log`");
    }
}
