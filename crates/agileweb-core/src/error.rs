//! Error types for AgileWeb

/// Result type alias using AgileWeb's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for AgileWeb operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Detector construction or execution errors
    #[error("detector error: {0}")]
    Detector(String),

    /// Input rejected by validation
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new detector error
    pub fn detector(msg: impl Into<String>) -> Self {
        Self::Detector(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
