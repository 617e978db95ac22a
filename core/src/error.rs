use thiserror::Error;

#[derive(Debug, Error)]
pub enum CruditeError {
    /// The mapping or the call does not provide what the operation needs
    /// (no key column, two identity keys, unknown property, bad id shape).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An expression shape the where-compiler cannot render
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// A multi-result reader was read out of order or past its end
    #[error("Reader misuse: {0}")]
    ReaderMisuse(String),

    /// Error with transaction lifecycle
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// A row value could not be converted into a field type
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Error reported by a connection backend
    #[error("Execution error: {0}")]
    Execution(String),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

impl CruditeError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedExpression(msg.into())
    }
}

/// Result type for mapping operations
pub type Result<T> = std::result::Result<T, CruditeError>;
