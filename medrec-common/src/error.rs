//! Common error types for medrec

use thiserror::Error;

use crate::validation::ValidationError;

/// Common result type for medrec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Arithmetic precondition broken on a derived-field computation.
///
/// Only reachable when a record bypassed schema validation (for example a
/// hand-edited store file with `height: 0`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("height must be positive and finite to compute BMI, got {0}")]
    NonPositiveHeight(f64),

    #[error("BMI is not a finite number (height {height}, weight {weight})")]
    NonFiniteBmi { height: f64, weight: f64 },
}

/// Common error types across medrec services
#[derive(Error, Debug)]
pub enum Error {
    /// One or more schema constraints violated (all violations listed)
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Requested record (or the backing store itself) does not exist
    #[error("{0}")]
    NotFound(String),

    /// Record identifier already taken
    #[error("{0}")]
    Conflict(String),

    /// Backing store content is not well-formed
    #[error("Corrupt patient store: {0}")]
    Corruption(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Derived-field computation on an invalid record
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prediction model missing or ill-formed
    #[error("Model error: {0}")]
    Model(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Machine-checkable error category, stable across message wording changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Corruption,
    Io,
    Database,
    Domain,
    Config,
    Model,
    InvalidInput,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Corruption => "corruption",
            ErrorKind::Io => "io",
            ErrorKind::Database => "database",
            ErrorKind::Domain => "domain",
            ErrorKind::Config => "config",
            ErrorKind::Model => "model",
            ErrorKind::InvalidInput => "invalid_input",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::Corruption(_) => ErrorKind::Corruption,
            Error::Io(_) => ErrorKind::Io,
            #[cfg(feature = "sqlx")]
            Error::Database(_) => ErrorKind::Database,
            Error::Domain(_) => ErrorKind::Domain,
            Error::Config(_) => ErrorKind::Config,
            Error::Model(_) => ErrorKind::Model,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    /// Record-level not-found error with the message clients see
    pub fn patient_not_found(id: &str) -> Self {
        Error::NotFound(format!("Patient {} not found", id))
    }
}
