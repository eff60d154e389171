//! Error types for the logger system

use std::io;
use std::path::Path;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Panic message used when the process-wide logger is looked up before
/// `init_logger` succeeded.
pub const UNINITIALIZED_ACCESS: &str = "logger not initialized, call init_logger first";

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A second initialization carried a different configuration
    #[error("Configuration conflict: {message}")]
    ConfigurationConflict { message: String },

    /// Directory or file could not be created or opened for a sink
    #[error("Filesystem error while {operation} '{path}': {source}")]
    Filesystem {
        operation: String,
        path: String,
        #[source]
        source: io::Error,
    },

    /// Buffered data could not be flushed to its destination
    #[error("Failed to flush sink '{sink}': {source}")]
    Flush {
        sink: String,
        #[source]
        source: io::Error,
    },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    Rotation { path: String, message: String },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// YAML configuration could not be parsed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl LoggerError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a configuration conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        LoggerError::ConfigurationConflict {
            message: message.into(),
        }
    }

    /// Create a filesystem error for `path`
    pub fn filesystem(operation: impl Into<String>, path: &Path, source: io::Error) -> Self {
        LoggerError::Filesystem {
            operation: operation.into(),
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a flush error
    pub fn flush(sink: impl Into<String>, source: io::Error) -> Self {
        LoggerError::Flush {
            sink: sink.into(),
            source,
        }
    }

    /// Create a file rotation error
    pub fn rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Rotation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for errors raised while building a logger from its configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidConfiguration { .. }
                | LoggerError::ConfigurationConflict { .. }
                | LoggerError::Yaml(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("level", "unknown level 'verbose'");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.is_configuration());

        let err = LoggerError::rotation("/var/log/app.log", "Disk full");
        assert!(matches!(err, LoggerError::Rotation { .. }));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::config("level", "unknown level 'verbose'");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for level: unknown level 'verbose'"
        );

        let err = LoggerError::rotation("/var/log/app.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );
    }

    #[test]
    fn test_filesystem_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::filesystem("creating log directory", Path::new("/root/logs"), io_err);

        assert!(matches!(err, LoggerError::Filesystem { .. }));
        assert!(err.to_string().contains("creating log directory"));
        assert!(err.to_string().contains("/root/logs"));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_flush_error_keeps_source() {
        use std::error::Error;

        let io_err = io::Error::new(io::ErrorKind::Other, "disk gone");
        let err = LoggerError::flush("logs/app.log", io_err);
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Failed to flush sink 'logs/app.log': disk gone");
    }
}
