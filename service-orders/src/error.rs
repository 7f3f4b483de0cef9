//! Error types for the service order application
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to a UI layer as plain messages.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] printpdf::Error),

    /// A store constraint rejected the write. The violated constraint is
    /// only logged; callers see the operation that failed.
    #[error("Integrity error while trying to {0}")]
    Integrity(&'static str),

    #[error("Invalid value for {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Report error: {0}")]
    Report(String),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Convert a store error raised by `operation`, folding constraint
    /// violations into [`AppError::Integrity`].
    pub fn from_store(err: sqlx::Error, operation: &'static str) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if !matches!(db_err.kind(), sqlx::error::ErrorKind::Other) =>
            {
                tracing::warn!("Integrity error while trying to {}: {}", operation, db_err);
                Self::Integrity(operation)
            }
            _ => Self::Database(err),
        }
    }

    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
