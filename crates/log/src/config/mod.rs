//! Configuration types

mod presets;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sitelog_caller::StrategyKind;

use crate::error::{LogError, LogResult};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Level filter (e.g., "info", "debug,hyper=warn")
    pub level: String,

    /// Output format
    pub format: Format,

    /// Display configuration
    pub display: DisplayConfig,

    /// Call-site resolution
    pub caller: CallerConfig,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable with colors and indentation
    Pretty,
    /// Compact single-line output
    Compact,
    /// Structured JSON output
    Json,
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Trace level
    Trace,
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warn level
    Warn,
    /// Error level
    Error,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show timestamps
    pub time: bool,
    /// Show source location of native `tracing` events
    pub source: bool,
    /// Show target module
    pub target: bool,
    /// Show thread IDs
    pub thread_ids: bool,
    /// Show thread names
    pub thread_names: bool,
    /// Use ANSI colors
    pub colors: bool,
    /// Flatten JSON events
    pub flatten: bool,
}

/// Call-site resolution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallerConfig {
    /// Resolve log sites at all; when off every record has an invalid site
    pub enabled: bool,
    /// Strategies to probe, in priority order
    pub strategies: Vec<StrategyKind>,
}

// ============================================================================
// Implementations
// ============================================================================

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Compact,
            display: DisplayConfig::default(),
            caller: CallerConfig::default(),
        }
    }
}

impl Config {
    /// Check the configuration for contradictions before installing it.
    pub fn validate(&self) -> LogResult<()> {
        if self.level.trim().is_empty() {
            return Err(LogError::Config("level filter is empty".to_string()));
        }
        if self.caller.enabled && self.caller.strategies.is_empty() {
            return Err(LogError::Config(
                "call-site resolution is enabled but no strategies are listed".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time: true,
            source: cfg!(debug_assertions),
            target: true,
            thread_ids: false,
            thread_names: false,
            colors: std::io::IsTerminal::is_terminal(&std::io::stderr()),
            flatten: true,
        }
    }
}

impl Default for CallerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategies: StrategyKind::PRIORITY.to_vec(),
        }
    }
}

impl Level {
    /// Every level, least severe first.
    pub const ALL: [Self; 5] = [Self::Trace, Self::Debug, Self::Info, Self::Warn, Self::Error];

    /// Lower-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LogError::Config(format!("unknown level '{s}'")))
    }
}

impl From<Level> for tracing::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => Self::TRACE,
            Level::Debug => Self::DEBUG,
            Level::Info => Self::INFO,
            Level::Warn => Self::WARN,
            Level::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_probes_every_strategy() {
        let config = Config::default();
        assert!(config.caller.enabled);
        assert_eq!(config.caller.strategies, StrategyKind::PRIORITY.to_vec());
        config.validate().unwrap();
    }

    #[test]
    fn enabled_caller_without_strategies_is_rejected() {
        let mut config = Config::default();
        config.caller.strategies.clear();
        assert!(matches!(config.validate(), Err(LogError::Config(_))));

        config.caller.enabled = false;
        config.validate().unwrap();
    }

    #[test]
    fn deserializes_partial_json() {
        let config: Config = serde_json::from_str(
            r#"{"level":"debug","format":"json","caller":{"strategies":["std-trace"]}}"#,
        )
        .unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, Format::Json);
        assert!(config.caller.enabled);
        assert_eq!(config.caller.strategies, vec![StrategyKind::StdTrace]);
    }

    #[test]
    fn levels_parse_and_order() {
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warn);
        assert!("loud".parse::<Level>().is_err());
        assert!(Level::Trace < Level::Error);
        assert_eq!(tracing::Level::from(Level::Info), tracing::Level::INFO);
    }
}
