//! Error types for the object mapping core

use thiserror::Error;

/// Core error type for mapping and lifecycle operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Unsupported operation '{operation}' on {resource}: {reason}")]
    Unsupported {
        resource: String,
        operation: String,
        reason: String,
    },

    #[error("Data format error: {message}")]
    DataFormat { message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl Error {
    /// Create a validation error naming the offending field
    pub fn validation<S1: Into<String>, S2: Into<String>>(field: S1, message: S2) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported-operation error for a resource type
    pub fn unsupported<S1, S2, S3>(resource: S1, operation: S2, reason: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::Unsupported {
            resource: resource.into(),
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a data-format error for an uninterpretable wire response
    pub fn data_format<S: Into<String>>(message: S) -> Self {
        Self::DataFormat {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Check if this error is an unsupported-operation error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported { .. })
    }

    /// Check if this error is a data-format error
    pub fn is_data_format(&self) -> bool {
        matches!(self, Error::DataFormat { .. })
    }

    /// Check if this error surfaced from the transport collaborator
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Get the error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "validation",
            Error::Unsupported { .. } => "unsupported",
            Error::DataFormat { .. } => "data_format",
            Error::Transport(_) => "transport",
            Error::Io(_) => "io",
            Error::Config { .. } => "config",
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let validation_err = Error::validation("title", "Field is required");
        assert!(validation_err.is_validation());
        assert!(!validation_err.is_unsupported());
        assert_eq!(validation_err.category(), "validation");

        let unsupported_err = Error::unsupported("TicketType", "create", "read-only resource");
        assert!(unsupported_err.is_unsupported());
        assert_eq!(unsupported_err.category(), "unsupported");

        let data_err = Error::data_format("unknown custom field type 99");
        assert!(data_err.is_data_format());
        assert_eq!(data_err.category(), "data_format");
    }

    #[test]
    fn test_unsupported_is_distinct_from_transport() {
        let unsupported = Error::unsupported("CustomField", "delete", "scoped to a parent group");
        let transport = Error::transport("connection reset");
        assert!(unsupported.is_unsupported());
        assert!(!unsupported.is_transport());
        assert!(transport.is_transport());
        assert_ne!(unsupported.category(), transport.category());
    }

    #[test]
    fn test_error_display_carries_context() {
        let err = Error::validation("email", "Field is required on create");
        let rendered = format!("{}", err);
        assert!(rendered.contains("email"));
        assert!(rendered.contains("required on create"));

        let err = Error::unsupported("TicketAttachment", "update", "attachments are immutable");
        let rendered = format!("{}", err);
        assert!(rendered.contains("TicketAttachment"));
        assert!(rendered.contains("update"));
    }

    #[test]
    fn test_error_from_anyhow() {
        let upstream = anyhow::anyhow!("HTTP 500");
        let core_err: Error = upstream.into();
        assert!(core_err.is_transport());
        assert_eq!(core_err.category(), "transport");
    }
}
