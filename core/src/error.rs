//! Error types and handling for stylegen core

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for stylegen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for stylegen core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generation tool invocation errors
    #[error("{0}")]
    Generate(#[from] GenerateError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

/// Which way a single generation call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerateErrorKind {
    /// The executable could not be started at all
    LaunchFailure,
    /// The process outlived the caller's deadline and was killed
    Timeout,
    /// The process ran to completion with a non-zero status
    NonZeroExit,
}

impl GenerateErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerateErrorKind::LaunchFailure => "launch_failure",
            GenerateErrorKind::Timeout => "timeout",
            GenerateErrorKind::NonZeroExit => "nonzero_exit",
        }
    }
}

impl fmt::Display for GenerateErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure of one `generate` call.
///
/// Callers branch on [`GenerateError::kind`]; the remaining fields carry the
/// diagnostic context needed to understand the failure without re-running it.
/// `Display` renders a multi-line report: the headline message, then the
/// command line (only when echoing was enabled in the configuration), then the
/// captured standard error (only when it was non-empty).
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateError {
    pub kind: GenerateErrorKind,
    pub message: String,
    /// Full command line joined by spaces, present when echo is enabled
    pub command: Option<String>,
    /// Trimmed standard error, present when the child wrote any
    pub stderr: Option<String>,
    pub exit_code: Option<i32>,
    pub timeout: Option<Duration>,
}

impl GenerateError {
    pub fn launch_failure(message: impl Into<String>) -> Self {
        Self::new(GenerateErrorKind::LaunchFailure, message)
    }

    pub fn timeout(timeout: Duration) -> Self {
        let mut err = Self::new(
            GenerateErrorKind::Timeout,
            format!(
                "mlx_lm.generate timed out after {:.3}s",
                timeout.as_secs_f64()
            ),
        );
        err.timeout = Some(timeout);
        err
    }

    pub fn nonzero_exit(exit_code: i32) -> Self {
        let mut err = Self::new(
            GenerateErrorKind::NonZeroExit,
            format!("mlx_lm.generate exited with code {}", exit_code),
        );
        err.exit_code = Some(exit_code);
        err
    }

    fn new(kind: GenerateErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            command: None,
            stderr: None,
            exit_code: None,
            timeout: None,
        }
    }

    /// Attach the command line
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Attach captured stderr; blank output is dropped
    pub fn with_stderr(mut self, stderr: &str) -> Self {
        let trimmed = stderr.trim();
        self.stderr = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn kind(&self) -> GenerateErrorKind {
        self.kind
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == GenerateErrorKind::Timeout
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(command) = &self.command {
            write!(f, "\ncommand: {}", command)?;
        }
        if let Some(stderr) = &self.stderr {
            write!(f, "\nstderr:\n{}", stderr)?;
        }
        Ok(())
    }
}

impl std::error::Error for GenerateError {}
