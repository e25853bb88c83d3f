//! Connector error types.
//!
//! Validation failures are detected before any remote side effect; remote
//! failures are surfaced with the operation and class that was executing.

use thiserror::Error;

use crate::types::{EntityClass, OperationKind};

/// Error that can occur during connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Registry misconfiguration. Fatal, detected at startup only.
    #[error("schema error for class '{class}': {message}")]
    Schema { class: String, message: String },

    /// A submitted parameter is not allowed for this operation.
    #[error("parameter '{parameter}' is prohibited for {operation} on {class}")]
    ProhibitedParameter {
        class: EntityClass,
        operation: OperationKind,
        parameter: String,
    },

    /// A mandatory parameter is absent.
    #[error("mandatory parameter '{parameter}' missing for {operation} on {class}")]
    MissingMandatoryParameter {
        class: EntityClass,
        operation: OperationKind,
        parameter: String,
    },

    /// Session open or reuse failed. Not retried internally.
    #[error("connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote directory operation itself failed.
    #[error("remote operation '{command}' failed for {operation} on {class}: {message}")]
    Remote {
        class: EntityClass,
        operation: OperationKind,
        command: String,
        message: String,
    },

    /// Connector configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// The serialized parameter payload could not be interpreted.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The class does not support the requested operation.
    #[error("operation {operation} is not supported on {class}")]
    UnsupportedOperation {
        class: EntityClass,
        operation: OperationKind,
    },
}

impl ConnectorError {
    /// Create a schema error.
    pub fn schema(class: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectorError::Schema {
            class: class.into(),
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        ConnectorError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source.
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        ConnectorError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ConnectorError::InvalidInput {
            message: message.into(),
        }
    }

    /// Whether this error was raised by input validation, before any remote
    /// side effect occurred.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ConnectorError::ProhibitedParameter { .. }
                | ConnectorError::MissingMandatoryParameter { .. }
                | ConnectorError::InvalidInput { .. }
                | ConnectorError::UnsupportedOperation { .. }
        )
    }

    /// Error code for classification by the orchestrator.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            ConnectorError::Schema { .. } => "SCHEMA_ERROR",
            ConnectorError::ProhibitedParameter { .. } => "PROHIBITED_PARAMETER",
            ConnectorError::MissingMandatoryParameter { .. } => "MISSING_MANDATORY_PARAMETER",
            ConnectorError::Connection { .. } => "CONNECTION_ERROR",
            ConnectorError::Remote { .. } => "REMOTE_OPERATION_ERROR",
            ConnectorError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            ConnectorError::InvalidInput { .. } => "INVALID_INPUT",
            ConnectorError::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
