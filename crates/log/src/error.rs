//! Error handling for sitelog
//!
//! Logging itself never fails: call-site problems degrade to an invalid log
//! site. These errors cover setting the logger up.

use sitelog_caller::CallerError;

/// Result alias for sitelog setup operations.
pub type LogResult<T> = Result<T, LogError>;

/// Errors raised while configuring or installing logging.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The level filter did not parse.
    #[error("invalid filter '{filter}': {reason}")]
    Filter {
        /// Filter directive as configured.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// The configuration is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// A global subscriber was already installed.
    #[error("logging already initialised: {0}")]
    Init(String),

    /// The code creating a logger could not be identified.
    #[error("cannot name logger after its enclosing type: {0}")]
    Caller(#[from] CallerError),
}

impl LogError {
    pub(crate) fn filter(filter: impl Into<String>, reason: impl ToString) -> Self {
        Self::Filter {
            filter: filter.into(),
            reason: reason.to_string(),
        }
    }
}
