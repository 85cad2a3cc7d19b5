//! Runtime identification used to gate strategies

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Version of the toolchain the crate was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RustcVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl RustcVersion {
    /// Create a version from its parts.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for RustcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A version string that is not `major.minor[.patch]`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid rustc version `{0}`")]
pub struct ParseVersionError(String);

impl FromStr for RustcVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let core = s.trim().split(['-', '+']).next().unwrap_or_default();
        let mut parts = core.split('.').map(str::parse::<u32>);
        let invalid = || ParseVersionError(s.to_owned());

        let major = parts.next().and_then(Result::ok).ok_or_else(invalid)?;
        let minor = parts.next().and_then(Result::ok).ok_or_else(invalid)?;
        let patch = match parts.next() {
            Some(Ok(patch)) => patch,
            Some(Err(_)) => return Err(invalid()),
            None => 0,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::new(major, minor, patch))
    }
}

/// The runtime a strategy is asked to run on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Runtime {
    /// Toolchain version, `None` when the build script could not determine it.
    pub rustc: Option<RustcVersion>,
    /// Target operating system (`std::env::consts::OS`).
    pub os: String,
    /// Target architecture (`std::env::consts::ARCH`).
    pub arch: String,
}

impl Runtime {
    /// Probe the runtime this process is running on.
    pub fn current() -> Self {
        Self {
            rustc: option_env!("SITELOG_RUSTC_VERSION").and_then(|v| v.parse().ok()),
            os: std::env::consts::OS.to_owned(),
            arch: std::env::consts::ARCH.to_owned(),
        }
    }

    /// A runtime description with explicit values.
    pub fn new(rustc: Option<RustcVersion>, os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            rustc,
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Major toolchain version, if known.
    pub fn major_version(&self) -> Option<u32> {
        self.rustc.map(|v| v.major)
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rustc {
            Some(version) => write!(f, "rustc {version}")?,
            None => f.write_str("rustc <unknown>")?,
        }
        write!(f, " ({}/{})", self.os, self.arch)
    }
}
