use thiserror::Error;

/// Transformer error with rich context and automatic error trait implementations
///
/// Design: Uses thiserror for ergonomic error handling with context.
/// Each variant carries meaningful context to help with debugging.
#[derive(Error, Debug)]
pub enum TransformError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid KPI catalog: {0}")]
    Catalog(String),

    // Identifier hardening: business names become SQL identifiers
    #[error("Unsafe SQL identifier: {0:?}")]
    InvalidIdentifier(String),

    // Connection errors - fatal once retries are exhausted
    #[error("Failed to connect to {target} after {attempts} attempts: {message}")]
    ConnectionFailed { target: String, attempts: usize, message: String },

    #[error("Schema synthesis failed for {table}: {message}")]
    Schema { table: String, message: String },

    // Database errors - auto-convert from mysql_async::Error
    #[error("Database error: {0}")]
    Database(#[from] mysql_async::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic wrapper for other errors - auto-convert from anyhow::Error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TransformError {
    /// Helper to create configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Helper to create catalog validation error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog(message.into())
    }

    /// Helper to create invalid identifier error
    pub fn invalid_identifier(name: impl Into<String>) -> Self {
        Self::InvalidIdentifier(name.into())
    }

    /// Helper to create connection failed error
    pub fn connection_failed(
        target: impl Into<String>,
        attempts: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::ConnectionFailed { target: target.into(), attempts, message: message.into() }
    }

    /// Helper to create schema error
    pub fn schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema { table: table.into(), message: message.into() }
    }
}

pub type TransformResult<T> = Result<T, TransformError>;
