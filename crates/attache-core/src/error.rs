use thiserror::Error;

/// Top-level error type for the Attache system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define their
/// own error types and implement `From<SubsystemError> for AttacheError` so
/// that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttacheError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Memory store error: {0}")]
    Memory(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Trigger error: {0}")]
    Trigger(String),

    #[error("Conversation error: {0}")]
    Conversation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for AttacheError {
    fn from(err: toml::de::Error) -> Self {
        AttacheError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AttacheError {
    fn from(err: toml::ser::Error) -> Self {
        AttacheError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AttacheError {
    fn from(err: serde_json::Error) -> Self {
        AttacheError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Attache operations.
pub type Result<T> = std::result::Result<T, AttacheError>;
