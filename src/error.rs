use thiserror::Error;

/// Unified error type for release-train operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Host request failed during {operation}: {message}")]
    Host { operation: String, message: String },

    #[error("Not found on host: {0}")]
    NotFound(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in release-train
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a host request error for the named operation
    pub fn host(operation: impl Into<String>, msg: impl Into<String>) -> Self {
        ReleaseError::Host {
            operation: operation.into(),
            message: msg.into(),
        }
    }

    /// Create a not-found error for a path or ref
    pub fn not_found(what: impl Into<String>) -> Self {
        ReleaseError::NotFound(what.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ReleaseError::NotFound(_))
    }
}
