//! Error handling for the elevation dispatcher
//!
//! Structured error types for dispatch and execution, enabling proper
//! error propagation to callers and completion callbacks.

use std::fmt;
use std::io;
use std::result;

/// Result type for dispatcher operations
pub type ElevResult<T> = result::Result<T, ElevError>;

/// Error types for dispatcher operations
#[derive(Debug, Clone)]
pub enum ElevError {
    /// Spawning the shell process failed
    Io(IoError),
    /// The helper ran but execution failed (non-zero exit, timeout, output overflow)
    Exec(ExecError),
    /// Deployment configuration could not be resolved
    Config(ConfigError),
    /// Invalid request shape (e.g. empty command text)
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct IoError {
    pub operation: String,
    pub path: Option<String>,
    pub kind: io::ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ExecError {
    pub command_line: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ElevError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElevError::Io(err) => write!(f, "I/O error in {}: {}", err.operation, err.message),
            ElevError::Exec(err) => match err.exit_code {
                Some(code) => write!(f, "Execution failed (exit code {}): {}", code, err.message),
                None => write!(f, "Execution failed: {}", err.message),
            },
            ElevError::Config(err) => {
                write!(f, "Configuration error at {}: {}", err.path, err.message)
            }
            ElevError::Invalid(msg) => write!(f, "Invalid request: {msg}"),
        }
    }
}

impl std::error::Error for ElevError {}

impl From<io::Error> for ElevError {
    fn from(err: io::Error) -> Self {
        ElevError::Io(IoError {
            operation: "unknown".to_string(),
            path: None,
            kind: err.kind(),
            message: err.to_string(),
        })
    }
}

// Helper functions for creating specific error types
impl ElevError {
    pub fn io_error(operation: &str, path: Option<&str>, err: io::Error) -> Self {
        ElevError::Io(IoError {
            operation: operation.to_string(),
            path: path.map(|s| s.to_string()),
            kind: err.kind(),
            message: err.to_string(),
        })
    }

    pub fn exec_error(
        command_line: &str,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        message: &str,
    ) -> Self {
        ElevError::Exec(ExecError {
            command_line: command_line.to_string(),
            exit_code,
            stdout,
            stderr,
            message: message.to_string(),
        })
    }

    pub fn config_error(path: &str, message: &str) -> Self {
        ElevError::Config(ConfigError {
            path: path.to_string(),
            message: message.to_string(),
        })
    }

    pub fn invalid(message: &str) -> Self {
        ElevError::Invalid(message.to_string())
    }

    /// Exit code of the failed execution, if this is an execution error
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ElevError::Exec(err) => err.exit_code,
            _ => None,
        }
    }

    /// Captured standard error text, if this is an execution error
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ElevError::Exec(err) => Some(err.stderr.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_error_display_includes_exit_code() {
        let err = ElevError::exec_error(
            "\"sudo.exe\" whoami",
            Some(5),
            String::new(),
            "access denied".to_string(),
            "helper exited with status 5",
        );
        let text = err.to_string();
        assert!(text.contains("exit code 5"));
        assert_eq!(err.exit_code(), Some(5));
        assert_eq!(err.stderr(), Some("access denied"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let err: ElevError = io.into();
        match err {
            ElevError::Io(inner) => assert_eq!(inner.kind, io::ErrorKind::NotFound),
            other => panic!("unexpected variant: {other}"),
        }
    }

    #[test]
    fn test_invalid_has_no_execution_details() {
        let err = ElevError::invalid("command text is empty");
        assert_eq!(err.exit_code(), None);
        assert_eq!(err.stderr(), None);
    }
}
