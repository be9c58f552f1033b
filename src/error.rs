//! Application error type and exit codes

use thiserror::Error;

use crate::config::ConfigError;
use crate::ports::ExchangeError;

/// Everything that can end an invocation early
#[derive(Debug, Error)]
pub enum CliError {
    #[error(
        "missing credentials: set {} (for example in a .env file)",
        .vars.join(" and ")
    )]
    MissingCredentials { vars: Vec<&'static str> },

    #[error("invalid --{field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("failed to {action}: {source}")]
    Exchange {
        action: &'static str,
        #[source]
        source: ExchangeError,
    },

    #[error("cancelled by user")]
    UserCancelled,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        CliError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Wrap a port failure with the action that was attempted
    pub fn exchange(action: &'static str) -> impl FnOnce(ExchangeError) -> Self {
        move |source| CliError::Exchange { action, source }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Exchange { .. } | CliError::Io(_) | CliError::Output(_) => 1,
            CliError::Validation { .. } | CliError::Config(_) => 2,
            CliError::MissingCredentials { .. } => 3,
            CliError::UserCancelled => 4,
        }
    }
}
