//! Error types for building and launching protoc invocations.

use std::fmt;
use thiserror::Error;

/// Result type for invocation operations.
pub type InvocationResult<T> = Result<T, InvocationError>;

/// Errors that can occur while configuring or launching protoc.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// A setting or the assembled configuration violates an invariant.
    #[error("Invalid protoc configuration: {message}")]
    Configuration { message: String },

    /// Failed to create or write the temporary argument file.
    #[error("Error creating file with protoc arguments: {0}")]
    ArgumentFile(#[source] std::io::Error),

    /// Protoc could not be started.
    #[error("Unable to invoke protoc after {attempts} attempt(s): {source}")]
    Launch {
        attempts: u32,
        #[source]
        source: LaunchError,
    },

    /// The pause between launch attempts was interrupted.
    #[error("protoc invocation was cancelled while waiting to retry")]
    Cancelled,
}

impl InvocationError {
    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns a stable error code for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            InvocationError::Configuration { .. } => "PROTOC_001",
            InvocationError::ArgumentFile(_) => "PROTOC_002",
            InvocationError::Launch { .. } => "PROTOC_003",
            InvocationError::Cancelled => "PROTOC_004",
        }
    }

    /// Returns the error category for grouping related errors.
    pub fn category(&self) -> &'static str {
        match self {
            InvocationError::Configuration { .. } => "configuration",
            InvocationError::ArgumentFile(_) => "argument_file",
            InvocationError::Launch { .. } => "launch",
            InvocationError::Cancelled => "cancelled",
        }
    }

    /// Returns true if this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, InvocationError::Configuration { .. })
    }
}

/// A failure to start the external process.
///
/// Runners attach the underlying OS error as the `source` when one exists.
/// The default retry classifier treats a cause-bearing failure as transient.
#[derive(Debug)]
pub struct LaunchError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl LaunchError {
    /// Creates a launch failure with no underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a launch failure wrapping an underlying cause.
    pub fn with_cause(
        message: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    /// Returns the failure message without the cause.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if an underlying cause is attached.
    pub fn has_cause(&self) -> bool {
        self.source.is_some()
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(cause) => write!(f, "{}: {}", self.message, cause),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = InvocationError::configuration("No proto files specified");
        assert!(err.to_string().contains("No proto files specified"));
        assert!(err.is_configuration());

        let err = InvocationError::Launch {
            attempts: 3,
            source: LaunchError::new("spawn refused"),
        };
        assert!(err.to_string().contains("3 attempt(s)"));
        assert!(err.to_string().contains("spawn refused"));
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            InvocationError::configuration("x"),
            InvocationError::ArgumentFile(std::io::Error::other("disk full")),
            InvocationError::Launch {
                attempts: 1,
                source: LaunchError::new("x"),
            },
            InvocationError::Cancelled,
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.dedup();
        assert_eq!(codes.len(), 4);
        assert_eq!(errors[3].category(), "cancelled");
    }

    #[test]
    fn test_launch_error_cause() {
        let bare = LaunchError::new("no cause");
        assert!(!bare.has_cause());
        assert!(bare.source().is_none());
        assert_eq!(bare.to_string(), "no cause");

        let io = std::io::Error::new(std::io::ErrorKind::Other, "Text file busy");
        let wrapped = LaunchError::with_cause("failed to start", io);
        assert!(wrapped.has_cause());
        assert!(wrapped.source().is_some());
        assert_eq!(wrapped.message(), "failed to start");
        assert!(wrapped.to_string().contains("Text file busy"));
    }
}
