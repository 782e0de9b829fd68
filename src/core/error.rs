//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A named encoder was registered twice
    #[error("{kind} {name:?} already registered")]
    DuplicateEncoder { kind: &'static str, name: String },

    /// A named encoder was requested but never registered
    #[error("unknown {kind}: {name:?}")]
    UnknownEncoder { kind: &'static str, name: String },

    /// An entry could not be encoded
    #[error("Encoding error ({encoder}): {message}")]
    EncodingError { encoder: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate registration error for an encoder family
    pub fn duplicate_encoder(kind: &'static str, name: impl Into<String>) -> Self {
        LoggerError::DuplicateEncoder {
            kind,
            name: name.into(),
        }
    }

    /// Create an unknown name error for an encoder family
    pub fn unknown_encoder(kind: &'static str, name: impl Into<String>) -> Self {
        LoggerError::UnknownEncoder {
            kind,
            name: name.into(),
        }
    }

    /// Create an encoding error
    pub fn encoding(encoder: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::EncodingError {
            encoder: encoder.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("Config", "Invalid sampler");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::duplicate_encoder("TimeEncoder", "iso8601");
        assert!(matches!(err, LoggerError::DuplicateEncoder { .. }));

        let err = LoggerError::unknown_encoder("Encoder", "yaml");
        assert!(matches!(err, LoggerError::UnknownEncoder { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::duplicate_encoder("LevelEncoder", "upper");
        assert_eq!(err.to_string(), "LevelEncoder \"upper\" already registered");

        let err = LoggerError::unknown_encoder("Encoder", "yaml");
        assert_eq!(err.to_string(), "unknown Encoder: \"yaml\"");

        let err = LoggerError::encoding("json", "non-finite float");
        assert_eq!(err.to_string(), "Encoding error (json): non-finite float");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("writing log file", "cannot write to file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log file"));
        assert!(err.to_string().contains("cannot write to file"));
    }
}
