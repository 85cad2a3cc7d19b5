//! Configuration presets for common scenarios

use sitelog_caller::StrategyKind;

use super::{Config, DisplayConfig, Format};

fn flag(value: &str) -> bool {
    value != "0" && !value.eq_ignore_ascii_case("false")
}

impl Config {
    /// Create configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup
    ///
    /// Reads `SITELOG_LOG` (falling back to `RUST_LOG`), `SITELOG_LOG_FORMAT`,
    /// `SITELOG_LOG_TIME`, `SITELOG_LOG_SOURCE`, `SITELOG_LOG_COLORS`,
    /// `SITELOG_CALLER` and `SITELOG_CALLER_STRATEGIES` (comma separated).
    #[must_use]
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = lookup("SITELOG_LOG").or_else(|| lookup("RUST_LOG")) {
            config.level = level;
        }

        if let Some(format) = lookup("SITELOG_LOG_FORMAT") {
            config.format = match format.to_lowercase().as_str() {
                "pretty" => Format::Pretty,
                "json" => Format::Json,
                _ => Format::Compact,
            };
        }

        config.display.parse_env(&lookup);

        if let Some(enabled) = lookup("SITELOG_CALLER") {
            config.caller.enabled = flag(&enabled);
        }

        if let Some(list) = lookup("SITELOG_CALLER_STRATEGIES") {
            let strategies: Vec<StrategyKind> = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .filter_map(|name| name.parse().ok())
                .collect();
            // Unknown names are dropped; an unusable list keeps the default.
            if !strategies.is_empty() {
                config.caller.strategies = strategies;
            }
        }

        config
    }

    /// Development configuration (pretty, debug level)
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: Format::Pretty,
            display: DisplayConfig {
                colors: true,
                source: true,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Production configuration (JSON, info level)
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Json,
            display: DisplayConfig {
                colors: false,
                source: false,
                flatten: true,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Test configuration (trace level, no colors or time)
    #[must_use]
    pub fn test() -> Self {
        Self {
            level: "trace".to_string(),
            format: Format::Compact,
            display: DisplayConfig {
                colors: false,
                time: false,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }
}

impl DisplayConfig {
    fn parse_env(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SITELOG_LOG_TIME") {
            self.time = flag(&v);
        }
        if let Some(v) = lookup("SITELOG_LOG_SOURCE") {
            self.source = flag(&v);
        }
        if let Some(v) = lookup("SITELOG_LOG_COLORS") {
            self.colors = flag(&v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_is_default() {
        assert_eq!(Config::from_env_with(env(&[])), Config::default());
    }

    #[test]
    fn sitelog_log_wins_over_rust_log() {
        let config = Config::from_env_with(env(&[("SITELOG_LOG", "debug"), ("RUST_LOG", "warn")]));
        assert_eq!(config.level, "debug");

        let config = Config::from_env_with(env(&[("RUST_LOG", "warn")]));
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn format_and_display_flags() {
        let config = Config::from_env_with(env(&[
            ("SITELOG_LOG_FORMAT", "JSON"),
            ("SITELOG_LOG_SOURCE", "false"),
            ("SITELOG_LOG_TIME", "0"),
            ("SITELOG_LOG_COLORS", "1"),
        ]));
        assert_eq!(config.format, Format::Json);
        assert!(!config.display.source);
        assert!(!config.display.time);
        assert!(config.display.colors);
    }

    #[test]
    fn caller_strategies_from_list() {
        let config = Config::from_env_with(env(&[("SITELOG_CALLER_STRATEGIES", "std, bogus ,capture")]));
        assert_eq!(
            config.caller.strategies,
            vec![StrategyKind::StdTrace, StrategyKind::BacktraceCapture]
        );

        let config = Config::from_env_with(env(&[("SITELOG_CALLER_STRATEGIES", "bogus")]));
        assert_eq!(config.caller.strategies, StrategyKind::PRIORITY.to_vec());
    }

    #[test]
    fn caller_can_be_switched_off() {
        let config = Config::from_env_with(env(&[("SITELOG_CALLER", "false")]));
        assert!(!config.caller.enabled);
    }

    #[test]
    fn presets() {
        assert_eq!(Config::development().format, Format::Pretty);
        assert_eq!(Config::production().format, Format::Json);
        assert!(!Config::production().display.colors);
        assert_eq!(Config::test().level, "trace");
        assert!(!Config::test().display.time);
    }
}
