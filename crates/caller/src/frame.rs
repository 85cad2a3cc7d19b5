//! Stack frame value type and symbol-name decomposition

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One resolved entry of the call stack.
///
/// Frames are produced by a [`StackGetter`](crate::StackGetter) and are
/// immutable afterwards. Equality is structural, which is what the
/// strategy-equivalence tests rely on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "FrameParts")]
pub struct StackFrame {
    declaring_type: String,
    method_name: String,
    file_name: Option<String>,
    line_number: Option<u32>,
}

/// Wire form of a [`StackFrame`]; decoded frames go through [`StackFrame::new`].
#[derive(Deserialize)]
struct FrameParts {
    declaring_type: String,
    method_name: String,
    file_name: Option<String>,
    line_number: Option<u32>,
}

impl From<FrameParts> for StackFrame {
    fn from(parts: FrameParts) -> Self {
        Self::new(
            parts.declaring_type,
            parts.method_name,
            parts.file_name.as_deref(),
            parts.line_number,
        )
    }
}

impl StackFrame {
    /// Create a frame from its parts.
    ///
    /// `file_name` is reduced to its base name so that frames coming from
    /// different symbolisers (absolute paths, `./`-relative paths) compare equal.
    pub fn new(
        declaring_type: impl Into<String>,
        method_name: impl Into<String>,
        file_name: Option<&str>,
        line_number: Option<u32>,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            method_name: method_name.into(),
            file_name: file_name.map(base_name),
            line_number,
        }
    }

    /// Build a frame from a demangled symbol name and optional source location.
    ///
    /// Returns `None` when the symbol name cannot be decomposed.
    pub(crate) fn from_symbol(symbol: &str, file: Option<&str>, line: Option<u32>) -> Option<Self> {
        let (declaring_type, method_name) = split_symbol(symbol)?;
        Some(Self {
            declaring_type,
            method_name,
            file_name: file.map(base_name),
            line_number: line,
        })
    }

    /// Path of the type (or module, for free functions) declaring the method.
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Name of the method or function.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Base name of the source file, if the symboliser knew it.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Source line, if the symboliser knew it.
    pub fn line_number(&self) -> Option<u32> {
        self.line_number
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.declaring_type.is_empty() {
            write!(f, "{}", self.method_name)?;
        } else {
            write!(f, "{}::{}", self.declaring_type, self.method_name)?;
        }
        match (&self.file_name, self.line_number) {
            (Some(file), Some(line)) => write!(f, "({file}:{line})"),
            (Some(file), None) => write!(f, "({file})"),
            _ => f.write_str("(Unknown Source)"),
        }
    }
}

fn base_name(path: &str) -> String {
    // Windows paths may show up on any host in cross-compiled symbol tables.
    let unix = Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path);
    unix.rsplit('\\').next().unwrap_or(unix).to_owned()
}

/// Split a demangled symbol into `(declaring type, method)`.
///
/// Closure and shim segments, generic arguments and the trait half of a
/// qualified path are dropped:
///
/// - `app::Service::run::{{closure}}` becomes `("app::Service", "run")`
/// - `<app::Service as core::fmt::Debug>::fmt` becomes `("app::Service", "fmt")`
/// - `app::Cache<K,V>::get` becomes `("app::Cache", "get")`
pub(crate) fn split_symbol(symbol: &str) -> Option<(String, String)> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    let rest = if let Some(close) = symbol.strip_prefix('<').and_then(closing_angle) {
        // `close` indexes the `>` within `symbol[1..]`.
        let inner = &symbol[1..=close];
        let self_type = split_top_level(inner, " as ")
            .into_iter()
            .next()
            .unwrap_or(inner);
        segments.extend(path_segments(self_type.trim_start_matches(['&', '*'])));
        symbol[close + 2..].trim_start_matches("::")
    } else {
        symbol
    };
    segments.extend(path_segments(rest));

    let method = segments.pop()?;
    Some((segments.join("::"), method))
}

/// Normalise a type path (as produced by `std::any::type_name`) the same way
/// frame declaring types are normalised.
pub(crate) fn normalize_path(path: &str) -> String {
    path_segments(path).join("::")
}

fn path_segments(path: &str) -> Vec<String> {
    split_top_level(path, "::")
        .into_iter()
        .filter_map(clean_segment)
        .collect()
}

fn clean_segment(segment: &str) -> Option<String> {
    let mut out = String::with_capacity(segment.len());
    let mut angle = 0usize;
    let mut brace = 0usize;
    for ch in segment.chars() {
        match ch {
            '<' => angle += 1,
            '>' => angle = angle.saturating_sub(1),
            '{' => brace += 1,
            '}' => brace = brace.saturating_sub(1),
            _ if angle == 0 && brace == 0 => out.push(ch),
            _ => {}
        }
    }
    let trimmed = out.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Byte index of the `>` that closes an already consumed `<`.
fn closing_angle(after_open: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, byte) in after_open.bytes().enumerate() {
        match byte {
            b'<' => depth += 1,
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split `text` on `sep`, ignoring separators nested inside `<...>`.
fn split_top_level<'a>(text: &'a str, sep: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let bytes = text.as_bytes();
    let mut idx = 0usize;
    while idx < bytes.len() {
        match bytes[idx] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            _ if depth == 0 && bytes[idx..].starts_with(sep.as_bytes()) => {
                parts.push(&text[start..idx]);
                idx += sep.len();
                start = idx;
                continue;
            }
            _ => {}
        }
        idx += 1;
    }
    parts.push(&text[start..]);
    parts
}
